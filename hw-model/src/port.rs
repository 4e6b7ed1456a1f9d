// Licensed under the Apache-2.0 license

use tqv_emu_bus::Bus;
use tqv_emu_types::{RvAddr, RvSize};
use tqv_trng_drivers::{RegisterPort, TrngReg};

use crate::HwModel;

/// A [`RegisterPort`] that reads and writes TRNG registers over the model's
/// bus and advances the model's clock.
pub struct BusPort<'a, M: HwModel> {
    model: &'a mut M,
    base: RvAddr,
}

impl<'a, M: HwModel> BusPort<'a, M> {
    pub fn new(model: &'a mut M) -> Self {
        let base = model.trng_base();
        Self { model, base }
    }

    pub fn model(&mut self) -> &mut M {
        &mut *self.model
    }

    fn addr(&self, reg: TrngReg) -> RvAddr {
        self.base + reg.offset() * 4
    }
}

impl<M: HwModel> RegisterPort for BusPort<'_, M> {
    /// # Panics
    ///
    /// This function panics if the bus faults.
    fn read(&mut self, reg: TrngReg) -> u32 {
        let addr = self.addr(reg);
        match self.model.apb_bus().read(RvSize::Word, addr) {
            Ok(val) => val,
            Err(e) => panic!("read of {} at 0x{addr:08x} faulted: {e:?}", reg.name()),
        }
    }

    /// # Panics
    ///
    /// This function panics if the bus faults.
    fn write(&mut self, reg: TrngReg, val: u32) {
        let addr = self.addr(reg);
        if let Err(e) = self.model.apb_bus().write(RvSize::Word, addr, val) {
            panic!("write of {} at 0x{addr:08x} faulted: {e:?}", reg.name());
        }
    }

    fn advance_cycles(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.model.step();
        }
    }

    fn cycles(&self) -> u64 {
        self.model.cycle_count()
    }
}
