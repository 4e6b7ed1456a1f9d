/*++

Licensed under the Apache-2.0 license.

File Name:

    trng.rs

Abstract:

    File contains the emulated TinyQV TRNG peripheral.

--*/

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smlang::statemachine;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::register_bitfields;
use tqv_emu_bus::{
    ActionHandle, Bus, BusError, Clock, ReadOnlyRegister, ReadWriteRegister, Register, Timer,
    WriteOnlyRegister,
};
use tqv_emu_types::{RvAddr, RvData, RvSize};

register_bitfields! [
    u32,

    /// Control Register Fields
    Control [
        RESET OFFSET(0) NUMBITS(1) [],
        CORE_ENABLE OFFSET(1) NUMBITS(1) [],
        SELECT_BASE_SHORT OFFSET(2) NUMBITS(1) [],
        CALIBRATION OFFSET(3) NUMBITS(1) [],
        READ_REQUEST OFFSET(4) NUMBITS(1) [],
    ],

    /// Status Register Fields
    Status [
        READY OFFSET(0) NUMBITS(1) [],
    ],
];

/// Bits of CONTROL backed by flops. The rest read as zero.
const CONTROL_IMPLEMENTED: u32 = 0x1f;

/// Size of the register window in bytes.
pub const TRNG_WINDOW_SIZE: u32 = 0x40;

const CONTROL_OFFSET: RvAddr = 0x00;
const STATUS_OFFSET: RvAddr = 0x04;
const CALIBRATION_CYCLES_OFFSET: RvAddr = 0x08;
const ENTROPY_SELECT_1_OFFSET: RvAddr = 0x0c;
const ENTROPY_SELECT_2_OFFSET: RvAddr = 0x10;
const TRIGGER_OFFSET: RvAddr = 0x14;
const RANDOM_NUMBER_OFFSET: RvAddr = 0x1c;

statemachine! {
    derive_states: [Clone, Copy, Debug],
    transitions: {
        *Idle + StartCalibration = Calibrating,
        Calibrating + StartCalibration = Calibrating,
        Calibrated + StartCalibration = Calibrating,
        WordReady + StartCalibration = Calibrating,

        Calibrating + Complete = Calibrated,
        Generating + Complete = WordReady,

        Calibrated + RequestWord = Generating,
        Generating + ReleaseRequest = Calibrated,
        WordReady + ReleaseRequest = Calibrated,

        Idle + Reset = Idle,
        Calibrating + Reset = Idle,
        Calibrated + Reset = Idle,
        Generating + Reset = Idle,
        WordReady + Reset = Idle,
    }
}

/// State machine context. The core keeps no data outside the peripheral.
pub struct Context;

impl StateMachineContext for Context {}

/// Knobs for the emulated core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrngArgs {
    /// Seed for the word generator. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Implemented width of CALIBRATION_CYCLES. Higher bits read back as 0.
    pub calibration_register_bits: u32,

    /// The calibration timer runs this many times slower than programmed.
    pub calibration_slowdown: u64,

    /// Cycles from READ_REQUEST to READY with the long ring oscillator base.
    pub read_latency_long: u64,

    /// Cycles from READ_REQUEST to READY with the short ring oscillator base.
    pub read_latency_short: u64,

    /// Number of entropy cells fitted to the core.
    pub entropy_cells: u32,
}

impl Default for TrngArgs {
    fn default() -> Self {
        Self {
            seed: None,
            calibration_register_bits: 32,
            calibration_slowdown: 1,
            read_latency_long: 32,
            read_latency_short: 24,
            entropy_cells: 24,
        }
    }
}

fn low_bits(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Emulated TinyQV TRNG peripheral. Addresses seen by this peripheral are
/// byte offsets into its 64-byte window.
pub struct Trng {
    control: ReadWriteRegister<Control::Register>,
    status: ReadOnlyRegister<Status::Register>,
    calibration_cycles: ReadWriteRegister,
    entropy_select_1: WriteOnlyRegister,
    entropy_select_2: WriteOnlyRegister,
    trigger: WriteOnlyRegister,
    random_number: ReadOnlyRegister,

    /// Cells latched by the last TRIGGER write.
    active_cells: u32,

    timer: Timer,

    /// Pending calibration or word completion.
    op_complete_action: Option<ActionHandle>,

    state_machine: StateMachine<Context>,

    rng: StdRng,

    args: TrngArgs,
}

impl Trng {
    pub fn new(clock: &Clock, args: TrngArgs) -> Self {
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            control: ReadWriteRegister::new(0),
            status: ReadOnlyRegister::new(0),
            calibration_cycles: ReadWriteRegister::new(0),
            entropy_select_1: WriteOnlyRegister::new(0),
            entropy_select_2: WriteOnlyRegister::new(0),
            trigger: WriteOnlyRegister::new(0),
            random_number: ReadOnlyRegister::new(0),
            active_cells: 0,
            timer: clock.timer(),
            op_complete_action: None,
            state_machine: StateMachine::new(Context),
            rng,
            args,
        }
    }

    /// Current state of the core.
    pub fn core_state(&self) -> States {
        *self.state_machine.state()
    }

    /// Cells selected, not disabled and triggered.
    pub fn active_cells(&self) -> u32 {
        self.active_cells
    }

    pub fn args(&self) -> &TrngArgs {
        &self.args
    }

    /// Whether the short ring oscillator base is selected.
    pub fn short_base(&self) -> bool {
        self.control.reg.is_set(Control::SELECT_BASE_SHORT)
    }

    fn read_latency(&self) -> u64 {
        if self.short_base() {
            self.args.read_latency_short
        } else {
            self.args.read_latency_long
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(action) = self.op_complete_action.take() {
            self.timer.cancel(action);
        }
    }

    fn reset_core(&mut self) {
        self.cancel_pending();
        self.status.reg.set(0);
        self.random_number.reg.set(0);
        self.active_cells = 0;
        let _ = self.state_machine.process_event(Events::Reset);
    }

    fn on_write_control(&mut self, size: RvSize, val: RvData) -> Result<(), BusError> {
        let old = self.control.reg.extract();
        self.control.write(size, val & CONTROL_IMPLEMENTED)?;
        let new = self.control.reg.extract();

        let rose = |field| new.is_set(field) && !old.is_set(field);
        let fell = |field| !new.is_set(field) && old.is_set(field);

        if new.is_set(Control::RESET) {
            debug!("[trng] reset asserted");
            self.reset_core();
            return Ok(());
        }
        if !new.is_set(Control::CORE_ENABLE) {
            if old.is_set(Control::CORE_ENABLE) {
                debug!("[trng] core disabled");
                self.reset_core();
            }
            return Ok(());
        }

        if rose(Control::CALIBRATION) {
            self.start_calibration();
        }
        if fell(Control::READ_REQUEST) {
            self.release_request();
        }
        if rose(Control::READ_REQUEST) {
            self.request_word();
        }
        Ok(())
    }

    fn on_write_trigger(&mut self, size: RvSize, val: RvData) -> Result<(), BusError> {
        self.trigger.write(size, val)?;
        self.active_cells = self.entropy_select_1.reg.get()
            & !self.entropy_select_2.reg.get()
            & self.trigger.reg.get()
            & low_bits(self.args.entropy_cells);
        debug!("[trng] triggered cells {:#x}", self.active_cells);
        Ok(())
    }

    fn on_write_calibration_cycles(&mut self, size: RvSize, val: RvData) -> Result<(), BusError> {
        self.calibration_cycles
            .write(size, val & low_bits(self.args.calibration_register_bits))
    }

    fn start_calibration(&mut self) {
        self.cancel_pending();
        self.status.reg.modify(Status::READY::CLEAR);
        let _ = self
            .state_machine
            .process_event(Events::StartCalibration);

        let ticks = u64::from(self.calibration_cycles.reg.get())
            .saturating_mul(self.args.calibration_slowdown);
        debug!("[trng] calibrating for {} cycles", ticks);
        if ticks == 0 {
            self.complete_operation();
        } else {
            self.op_complete_action = Some(self.timer.schedule_poll_in(ticks));
        }
    }

    fn request_word(&mut self) {
        self.status.reg.modify(Status::READY::CLEAR);
        if self
            .state_machine
            .process_event(Events::RequestWord)
            .is_err()
        {
            debug!("[trng] read request ignored before calibration");
            return;
        }
        if self.active_cells == 0 {
            // Nothing oscillates; READY never rises.
            debug!("[trng] read request with no triggered cells");
            return;
        }
        self.op_complete_action = Some(self.timer.schedule_poll_in(self.read_latency()));
    }

    fn release_request(&mut self) {
        self.cancel_pending();
        self.status.reg.modify(Status::READY::CLEAR);
        let _ = self.state_machine.process_event(Events::ReleaseRequest);
    }

    fn complete_operation(&mut self) {
        match self.state_machine.state() {
            States::Calibrating => {
                debug!("[trng] calibration complete");
            }
            States::Generating => {
                let word: u32 = self.rng.gen();
                self.random_number.reg.set(word);
                debug!("[trng] word {:#010x}", word);
            }
            _ => return,
        }
        let _ = self.state_machine.process_event(Events::Complete);
        self.status.reg.modify(Status::READY::SET);
    }
}

impl Bus for Trng {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        if addr & 0x3 != 0 {
            Err(BusError::LoadAddrMisaligned)?
        }
        match addr {
            CONTROL_OFFSET => self.control.read(size),
            STATUS_OFFSET => self.status.read(size),
            CALIBRATION_CYCLES_OFFSET => self.calibration_cycles.read(size),
            ENTROPY_SELECT_1_OFFSET => self.entropy_select_1.read(size),
            ENTROPY_SELECT_2_OFFSET => self.entropy_select_2.read(size),
            TRIGGER_OFFSET => self.trigger.read(size),
            RANDOM_NUMBER_OFFSET => self.random_number.read(size),
            _ => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        if addr & 0x3 != 0 {
            Err(BusError::StoreAddrMisaligned)?
        }
        match addr {
            CONTROL_OFFSET => self.on_write_control(size, val),
            STATUS_OFFSET => self.status.write(size, val),
            CALIBRATION_CYCLES_OFFSET => self.on_write_calibration_cycles(size, val),
            ENTROPY_SELECT_1_OFFSET => self.entropy_select_1.write(size, val),
            ENTROPY_SELECT_2_OFFSET => self.entropy_select_2.write(size, val),
            TRIGGER_OFFSET => self.on_write_trigger(size, val),
            RANDOM_NUMBER_OFFSET => self.random_number.write(size, val),
            _ => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        if self.timer.fired(&mut self.op_complete_action) {
            self.complete_operation();
        }
    }

    fn warm_reset(&mut self) {
        self.reset_core();
        self.control.reg.set(0);
        self.calibration_cycles.reg.set(0);
        self.entropy_select_1.reg.set(0);
        self.entropy_select_2.reg.set(0);
        self.trigger.reg.set(0);
    }
}
