// Licensed under the Apache-2.0 license

use std::error::Error;
use std::io::Write;

use log::debug;

use tqv_emu_bus::{Bus, BusError, Clock};
use tqv_emu_periph::{TinyQvRootBus, Trng};
use tqv_emu_types::{RvAddr, RvData, RvSize};

use crate::bus_logger::BusLogger;
use crate::InitParams;
use crate::Output;

pub struct EmulatedApbBus<'a> {
    model: &'a mut ModelEmulated,
}

impl<'a> Bus for EmulatedApbBus<'a> {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        self.model.bus.read(size, addr)
    }
    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        self.model.bus.write(size, addr, val)
    }
}

/// Software model of the TRNG peripheral wired into the TinyQV user
/// peripheral region.
pub struct ModelEmulated {
    clock: Clock,
    bus: BusLogger<TinyQvRootBus>,
    output: Output,
}

impl ModelEmulated {
    /// The emulated TRNG core, for inspecting state the bus does not expose.
    pub fn trng(&self) -> &Trng {
        &self.bus.bus.trng
    }
}

impl crate::HwModel for ModelEmulated {
    type TBus<'a> = EmulatedApbBus<'a>;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized,
    {
        let clock = Clock::new();
        let output = Output::new_internal(params.log_writer, params.capture_output);
        let mut bus = BusLogger::new(TinyQvRootBus::new(&clock, params.bus_args));
        if params.trace_bus {
            bus.log = Some(output.sink().clone());
        }
        let trng_base = bus.bus.trng_base();
        debug!("[model] TRNG at 0x{:08x}", trng_base);
        writeln!(output.logger(), "TRNG at 0x{:08x}", trng_base)?;
        Ok(Self { clock, bus, output })
    }

    fn apb_bus<'a>(&'a mut self) -> Self::TBus<'a> {
        EmulatedApbBus { model: self }
    }

    fn step(&mut self) {
        self.clock
            .increment_and_process_timer_actions(1, &mut self.bus);
        self.output.sink().set_now(self.clock.now());
    }

    fn cycle_count(&self) -> u64 {
        self.clock.now()
    }

    fn trng_base(&self) -> RvAddr {
        self.bus.bus.trng_base()
    }

    fn output(&mut self) -> &mut Output {
        &mut self.output
    }

    fn reset(&mut self) {
        debug!("[model] warm reset at cycle {}", self.clock.now());
        self.bus.warm_reset();
    }
}

#[cfg(test)]
mod tests {
    use crate::{HwModel, InitParams, ModelEmulated};
    use tqv_emu_bus::{Bus, BusError};
    use tqv_emu_periph::{TinyQvRootBusArgs, TrngArgs, TrngState};
    use tqv_emu_types::RvSize;

    const TRNG_BASE: u32 = 0x0800_0340;
    const CONTROL: u32 = TRNG_BASE;
    const STATUS: u32 = TRNG_BASE + 0x4;
    const CALIBRATION_CYCLES: u32 = TRNG_BASE + 0x8;

    fn model() -> ModelEmulated {
        ModelEmulated::init(InitParams {
            bus_args: TinyQvRootBusArgs {
                trng: TrngArgs {
                    seed: Some(1),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_apb() {
        let mut model = model();
        assert_eq!(model.trng_base(), TRNG_BASE);

        model
            .apb_bus()
            .write(RvSize::Word, CALIBRATION_CYCLES, 4242)
            .unwrap();
        assert_eq!(
            model.apb_bus().read(RvSize::Word, CALIBRATION_CYCLES).unwrap(),
            4242
        );
        assert_eq!(
            model.apb_bus().read(RvSize::Word, 0x0800_0000),
            Err(BusError::LoadAccessFault)
        );
    }

    #[test]
    fn test_step_until_calibrated() {
        let mut model = model();
        model.apb_bus().write(RvSize::Word, CONTROL, 0x2).unwrap();
        model
            .apb_bus()
            .write(RvSize::Word, CALIBRATION_CYCLES, 100)
            .unwrap();
        model.apb_bus().write(RvSize::Word, CONTROL, 0xa).unwrap();

        let start = model.cycle_count();
        model.step_until(|m| m.apb_bus().read(RvSize::Word, STATUS).unwrap() & 1 != 0);
        assert_eq!(model.cycle_count() - start, 100);
        assert_eq!(model.trng().core_state(), TrngState::Calibrated);
    }

    #[test]
    fn test_reset() {
        let mut model = model();
        model.apb_bus().write(RvSize::Word, CONTROL, 0xa).unwrap();
        model.step();
        model.reset();
        assert_eq!(model.apb_bus().read(RvSize::Word, CONTROL).unwrap(), 0);
        assert_eq!(model.trng().core_state(), TrngState::Idle);
        assert_eq!(model.cycle_count(), 1);
        // Reset is reported through `log`, not the model output.
        assert_eq!(model.output().take(usize::MAX), "TRNG at 0x08000340\n");
    }

    #[test]
    fn test_uncaptured_trace() {
        let mut model = ModelEmulated::init(InitParams {
            trace_bus: true,
            capture_output: false,
            ..Default::default()
        })
        .unwrap();
        model.apb_bus().write(RvSize::Word, CONTROL, 0x3).unwrap();
        model.apb_bus().read(RvSize::Word, STATUS).unwrap();
        assert_eq!(model.output().take(usize::MAX), "");
    }

    #[test]
    fn test_trace() {
        let mut model = ModelEmulated::init(InitParams {
            trace_bus: true,
            ..Default::default()
        })
        .unwrap();
        model.step();
        model.apb_bus().write(RvSize::Word, CONTROL, 0x3).unwrap();
        assert_eq!(
            model.output().take(usize::MAX),
            "TRNG at 0x08000340\nTQV write4 *0x08000340 <- 0x3\n"
        );
    }
}
