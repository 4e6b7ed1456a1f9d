/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

use tqv_emu_types::{RvAddr, RvData, RvSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned
    LoadAddrMisaligned,

    /// Load from an unmapped or write-only location
    LoadAccessFault,

    /// Store address misaligned
    StoreAddrMisaligned,

    /// Store to an unmapped or read-only location
    StoreAccessFault,
}

/// Represents an abstract register bus. Used to read and write peripheral
/// registers.
pub trait Bus {
    /// Read data of specified size from given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError>;

    /// Write data of specified size to given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError>;

    /// Notifies peripherals that a previously scheduled timer action fired.
    /// The owner of the bus calls this from [`crate::Clock::increment_and_process_timer_actions`].
    fn poll(&mut self) {
        // By default, do nothing
    }

    /// Returns the peripheral to its power-on state.
    fn warm_reset(&mut self) {
        // By default, do nothing
    }
}
