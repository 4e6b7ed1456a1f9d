// Licensed under the Apache-2.0 license

use std::error::Error;

use tqv_emu_bus::Bus;
use tqv_emu_periph::TinyQvRootBusArgs;
use tqv_emu_types::RvAddr;

mod bus_logger;
mod model_emulated;
mod output;
mod port;

pub use bus_logger::BusLogger;
pub use model_emulated::ModelEmulated;
pub use output::{Output, OutputSink};
pub use port::BusPort;

pub type DefaultHwModel = ModelEmulated;

pub struct InitParams {
    /// Peripheral slot and emulated core knobs.
    pub bus_args: TinyQvRootBusArgs,

    /// Where cycle-stamped model output is written.
    pub log_writer: Box<dyn std::io::Write>,

    /// Record every bus transaction in the output.
    pub trace_bus: bool,

    /// Keep a copy of the output for [`Output::take`]. Callers that only
    /// want `log_writer` turn this off so long traces are not held in memory.
    pub capture_output: bool,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            bus_args: Default::default(),
            log_writer: Box::new(std::io::sink()),
            trace_bus: false,
            capture_output: true,
        }
    }
}

/// Creates the default model.
pub fn new(params: InitParams) -> Result<DefaultHwModel, Box<dyn Error>> {
    DefaultHwModel::init(params)
}

// Represents an emulator or simulation of the TinyQV TRNG peripheral, to be
// called from tests.
pub trait HwModel {
    type TBus<'a>: Bus
    where
        Self: 'a;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;

    /// The bus the TinyQV test adapter drives. Addresses are absolute.
    fn apb_bus<'a>(&'a mut self) -> Self::TBus<'a>;

    /// Step execution ahead one clock cycle.
    fn step(&mut self);

    /// Number of clock cycles since init.
    fn cycle_count(&self) -> u64;

    /// Base address of the TRNG register window.
    fn trng_base(&self) -> RvAddr;

    /// Bus traces and other model logging are available here.
    fn output(&mut self) -> &mut Output;

    /// Return the peripheral to its power-on state. The clock keeps running.
    fn reset(&mut self);

    /// Execute until the result of `predicate` becomes true.
    fn step_until(&mut self, mut predicate: impl FnMut(&mut Self) -> bool) {
        while !predicate(self) {
            self.step();
        }
    }

    /// A register port the TRNG driver can run against.
    fn trng_port(&mut self) -> BusPort<'_, Self>
    where
        Self: Sized,
    {
        BusPort::new(self)
    }
}
