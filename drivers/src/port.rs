// Licensed under the Apache-2.0 license

use crate::TrngReg;

/// Register access and clock control supplied by the environment the driver
/// runs in: a simulated bus in tests, load/store instructions on hardware.
///
/// Accesses are synchronous and ordered. The driver owns the port for the
/// duration of a sequence.
pub trait RegisterPort {
    /// Reads the register at `reg`.
    fn read(&mut self, reg: TrngReg) -> u32;

    /// Writes `val` to the register at `reg`.
    fn write(&mut self, reg: TrngReg, val: u32);

    /// Lets the hardware run for `cycles` clock cycles. This is the only
    /// point at which peripheral state changes underneath the driver.
    fn advance_cycles(&mut self, cycles: u64);

    /// Monotonic clock cycle counter.
    fn cycles(&self) -> u64;
}

impl<T: RegisterPort + ?Sized> RegisterPort for &mut T {
    fn read(&mut self, reg: TrngReg) -> u32 {
        T::read(self, reg)
    }

    fn write(&mut self, reg: TrngReg, val: u32) {
        T::write(self, reg, val)
    }

    fn advance_cycles(&mut self, cycles: u64) {
        T::advance_cycles(self, cycles)
    }

    fn cycles(&self) -> u64 {
        T::cycles(self)
    }
}
