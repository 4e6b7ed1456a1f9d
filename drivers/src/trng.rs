/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    Software interface to the TinyQV True Random Number Generator (TRNG)
    peripheral: reset, entropy-cell trigger, calibration and random word
    retrieval.

--*/

use alloc::vec::Vec;

use crate::{wait, Control, RegisterPort, Status, TrngReg};
use tqv_trng_error::{Phase, TrngError, TrngResult};

/// Cycles within which a requested random word is nominally available.
pub const READ_WORD_CYCLES: u64 = 32;

/// Poll budget for each read request.
pub const READ_TIMEOUT_CYCLES: u64 = 2 * READ_WORD_CYCLES;

/// Entropy cells implemented by the reference peripheral.
pub const DEFAULT_ENTROPY_CELLS: u32 = 24;

/// Parameters of a full control sequence. `Default` is the reference
/// sequence.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SequenceConfig {
    /// Cells to enable, written to ENTROPY_SELECT_1 and TRIGGER.
    pub entropy_cell_mask: u32,

    /// Number of implemented cells; bounds the ENTROPY_SELECT_2 complement.
    pub entropy_cell_count: u32,

    /// Overrides the value written to ENTROPY_SELECT_2.
    pub entropy_select_2: Option<u32>,

    /// Selects the short ring generator base instead of the long one.
    pub select_short_base: bool,

    /// Calibration timer target. The poll budget is twice this.
    pub calibration_cycles: u32,

    /// Cycles RESET stays asserted.
    pub reset_hold_cycles: u64,

    /// Cycles to wait after latching the cell selection.
    pub trigger_settle_cycles: u64,

    /// Random words fetched after the first one.
    pub read_count: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            entropy_cell_mask: 0x1,
            entropy_cell_count: DEFAULT_ENTROPY_CELLS,
            entropy_select_2: None,
            select_short_base: false,
            calibration_cycles: 1 << 11,
            reset_hold_cycles: 1000,
            trigger_settle_cycles: 10,
            read_count: 5,
        }
    }
}

impl SequenceConfig {
    /// Value written to ENTROPY_SELECT_2: the explicit override, or the cell
    /// mask inverted over the implemented cells.
    pub fn complement_mask(&self) -> u32 {
        if let Some(mask) = self.entropy_select_2 {
            return mask;
        }
        let cells = match self.entropy_cell_count {
            n if n >= 32 => u32::MAX,
            n => (1u32 << n) - 1,
        };
        !self.entropy_cell_mask & cells
    }

    /// Words a successful sequence produces.
    pub fn word_count(&self) -> usize {
        self.read_count as usize + 1
    }
}

/// Where the driver is in the control sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SequenceState {
    Idle,
    Reset,
    EntropyTrigger,
    Calibration,
    ReadRequest(u32),
    Done,
    Failed(Phase),
}

/// A unique handle to the TRNG peripheral behind `P`.
pub struct Trng<P: RegisterPort> {
    port: P,
    state: SequenceState,
}

impl<P: RegisterPort> Trng<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: SequenceState::Idle,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    /// Reads the current CONTROL register.
    pub fn control(&mut self) -> Control {
        Control::from_bits_truncate(self.port.read(TrngReg::Control))
    }

    /// Reads the current STATUS register.
    pub fn status(&mut self) -> Status {
        Status::from_bits_truncate(self.port.read(TrngReg::Status))
    }

    /// Runs the complete control sequence and returns the random words it
    /// fetched, `1 + config.read_count` of them.
    ///
    /// # Errors
    ///
    /// * `TrngError::Verification` - CALIBRATION_CYCLES did not read back
    /// * `TrngError::Timeout` - calibration or a read request did not finish
    ///   within its budget
    ///
    /// The first error aborts the sequence; nothing is retried.
    pub fn run_sequence(&mut self, config: &SequenceConfig) -> TrngResult<Vec<u32>> {
        let result = self.run_sequence_inner(config);
        match &result {
            Ok(words) => {
                self.state = SequenceState::Done;
                log::info!("TRNG sequence completed with {} words", words.len());
            }
            Err(err) => {
                self.state = SequenceState::Failed(err.phase());
                log::error!("TRNG sequence failed: {err}");
            }
        }
        result
    }

    fn run_sequence_inner(&mut self, config: &SequenceConfig) -> TrngResult<Vec<u32>> {
        self.reset(config.reset_hold_cycles);
        self.trigger_entropy(config);
        self.calibrate(config.calibration_cycles)?;

        let mut words = Vec::with_capacity(config.word_count());
        for iteration in 0..=config.read_count {
            let word = self.read_word(iteration)?;
            log::info!("TRNG random data {iteration}: {word:#010x}");
            words.push(word);
        }
        Ok(words)
    }

    /// Holds RESET with the core enabled for `hold_cycles`, then releases it.
    /// The duration is fixed; there is no status to poll.
    pub fn reset(&mut self, hold_cycles: u64) {
        self.state = SequenceState::Reset;
        self.port
            .write(TrngReg::Control, (Control::RESET | Control::CORE_ENABLE).bits());
        self.port.advance_cycles(hold_cycles);
        self.port.write(TrngReg::Control, Control::CORE_ENABLE.bits());

        let control = self.control();
        let status = self.status();
        log::info!(
            "TRNG control after reset: {:#x}, status: {:#x}",
            control.bits(),
            status.bits()
        );
    }

    /// Selects and latches the entropy cells, waits the settle window, and
    /// optionally switches to the short ring generator base.
    pub fn trigger_entropy(&mut self, config: &SequenceConfig) {
        self.state = SequenceState::EntropyTrigger;
        let mask = config.entropy_cell_mask;
        self.port.write(TrngReg::EntropySelect1, mask);
        self.port
            .write(TrngReg::EntropySelect2, config.complement_mask());
        self.port.write(TrngReg::Trigger, mask);
        self.port.advance_cycles(config.trigger_settle_cycles);
        log::info!("Triggered entropy cells: {mask:#x}");

        if config.select_short_base {
            let control = self.control() | Control::SELECT_BASE_SHORT;
            self.port.write(TrngReg::Control, control.bits());
            log::info!("Selected ring generator base short");
        } else {
            log::info!("Using default ring generator base long");
        }
    }

    /// Programs the calibration target, starts calibration and waits for
    /// READY. Returns the cycles spent waiting.
    ///
    /// # Errors
    ///
    /// * `TrngError::Verification` - the target did not read back
    /// * `TrngError::Timeout` - READY not seen within `2 * cycles`
    pub fn calibrate(&mut self, cycles: u32) -> TrngResult<u64> {
        self.state = SequenceState::Calibration;
        self.port.write(TrngReg::CalibrationCycles, cycles);
        let read_back = self.port.read(TrngReg::CalibrationCycles);
        if read_back != cycles {
            return Err(TrngError::Verification {
                reg: TrngReg::CalibrationCycles.name(),
                written: cycles,
                read: read_back,
            });
        }
        log::info!("Set calibration cycles: {cycles} - read back: {read_back}");

        let control = self.control() | Control::CALIBRATION;
        self.port.write(TrngReg::Control, control.bits());

        let budget = u64::from(cycles).saturating_mul(2);
        let waited = wait::until_status_ready(&mut self.port, budget, Phase::Calibration, None)?;
        log::info!("TRNG ready after {waited} calibration cycles");
        Ok(waited)
    }

    /// Requests one random word and waits for it. `iteration` only tags
    /// errors and logs.
    ///
    /// READ_REQUEST is deasserted before returning, on success and on
    /// timeout, so the next request starts from a clean handshake.
    ///
    /// # Errors
    ///
    /// * `TrngError::Timeout` - READY not seen within
    ///   [`READ_TIMEOUT_CYCLES`]
    pub fn read_word(&mut self, iteration: u32) -> TrngResult<u32> {
        self.state = SequenceState::ReadRequest(iteration);
        let control = self.control() | Control::READ_REQUEST;
        self.port.write(TrngReg::Control, control.bits());

        let waited = wait::until_status_ready(
            &mut self.port,
            READ_TIMEOUT_CYCLES,
            Phase::ReadRequest,
            Some(iteration),
        );
        let word = match waited {
            Ok(waited) => {
                log::debug!("TRNG read request {iteration} completed after {waited} cycles");
                Ok(self.port.read(TrngReg::RandomNumber))
            }
            Err(err) => Err(err),
        };

        let control = self.control() - Control::READ_REQUEST;
        self.port.write(TrngReg::Control, control.bits());
        word
    }
}
