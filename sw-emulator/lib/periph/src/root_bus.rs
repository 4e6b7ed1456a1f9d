/*++

Licensed under the Apache-2.0 license.

File Name:

    root_bus.rs

Abstract:

    File contains the root Bus for the TinyQV user peripheral region.

--*/

use crate::trng::TRNG_WINDOW_SIZE;
use crate::{Trng, TrngArgs};
use tqv_emu_bus::{Bus, BusError, Clock};
use tqv_emu_types::{RvAddr, RvData, RvSize};

/// Start of the TinyQV user peripheral region.
pub const USER_PERIPHERAL_BASE: RvAddr = 0x0800_0000;

/// Each user peripheral owns a 64-byte window.
pub const USER_PERIPHERAL_STRIDE: RvAddr = TRNG_WINDOW_SIZE;

/// TinyQV supports this many user peripheral slots.
pub const USER_PERIPHERAL_COUNT: u32 = 32;

/// Slot used by the reference test bench.
pub const DEFAULT_TRNG_PERIPHERAL: u32 = 13;

/// Base address of user peripheral `index`.
pub const fn user_peripheral_base(index: u32) -> RvAddr {
    USER_PERIPHERAL_BASE + USER_PERIPHERAL_STRIDE * index
}

/// TinyQV Root Bus Arguments
#[derive(Clone, Debug)]
pub struct TinyQvRootBusArgs {
    /// User peripheral slot the TRNG is wired to.
    pub peripheral: u32,
    pub trng: TrngArgs,
}

impl Default for TinyQvRootBusArgs {
    fn default() -> Self {
        Self {
            peripheral: DEFAULT_TRNG_PERIPHERAL,
            trng: TrngArgs::default(),
        }
    }
}

/// Decodes bus addresses onto the TRNG window. Everything else faults.
pub struct TinyQvRootBus {
    pub trng: Trng,
    trng_base: RvAddr,
}

impl TinyQvRootBus {
    /// # Panics
    ///
    /// Panics if `args.peripheral` is not a valid user peripheral slot.
    pub fn new(clock: &Clock, args: TinyQvRootBusArgs) -> Self {
        assert!(
            args.peripheral < USER_PERIPHERAL_COUNT,
            "User peripheral {} out of range",
            args.peripheral
        );
        Self {
            trng: Trng::new(clock, args.trng),
            trng_base: user_peripheral_base(args.peripheral),
        }
    }

    pub fn trng_base(&self) -> RvAddr {
        self.trng_base
    }

    fn trng_offset(&self, addr: RvAddr) -> Option<RvAddr> {
        let offset = addr.checked_sub(self.trng_base)?;
        (offset < TRNG_WINDOW_SIZE).then_some(offset)
    }
}

impl Bus for TinyQvRootBus {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        match self.trng_offset(addr) {
            Some(offset) => self.trng.read(size, offset),
            None => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        match self.trng_offset(addr) {
            Some(offset) => self.trng.write(size, offset, val),
            None => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        self.trng.poll();
    }

    fn warm_reset(&mut self) {
        self.trng.warm_reset();
    }
}
