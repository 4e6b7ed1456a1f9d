/*++

Licensed under the Apache-2.0 license.

File Name:

    register.rs

Abstract:

    File contains the word register cells used by emulated peripherals.

--*/

use crate::BusError;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::InMemoryRegister;
use tock_registers::RegisterLongName;
use tqv_emu_types::{RvData, RvSize};

/// A bus-visible register. Peripheral registers are 32 bits wide and only
/// accept word sized accesses.
pub trait Register {
    /// Read the register
    ///
    /// # Error
    ///
    /// * `BusError::LoadAccessFault` - Non-word access or write-only register
    fn read(&self, size: RvSize) -> Result<RvData, BusError>;

    /// Write the register
    ///
    /// # Error
    ///
    /// * `BusError::StoreAccessFault` - Non-word access or read-only register
    fn write(&mut self, size: RvSize, val: RvData) -> Result<(), BusError>;
}

/// Read Write Register
pub struct ReadWriteRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadWriteRegister<R> {
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadWriteRegister<R> {
    fn read(&self, size: RvSize) -> Result<RvData, BusError> {
        if size != RvSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        Ok(self.reg.get())
    }

    fn write(&mut self, size: RvSize, val: RvData) -> Result<(), BusError> {
        if size != RvSize::Word {
            Err(BusError::StoreAccessFault)?
        }
        self.reg.set(val);
        Ok(())
    }
}

/// Read Only Register. The owning peripheral updates `reg` directly.
pub struct ReadOnlyRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadOnlyRegister<R> {
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadOnlyRegister<R> {
    fn read(&self, size: RvSize) -> Result<RvData, BusError> {
        if size != RvSize::Word {
            Err(BusError::LoadAccessFault)?
        }
        Ok(self.reg.get())
    }

    fn write(&mut self, _size: RvSize, _val: RvData) -> Result<(), BusError> {
        Err(BusError::StoreAccessFault)
    }
}

/// Write Only Register
pub struct WriteOnlyRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> WriteOnlyRegister<R> {
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for WriteOnlyRegister<R> {
    fn read(&self, _size: RvSize) -> Result<RvData, BusError> {
        Err(BusError::LoadAccessFault)
    }

    fn write(&mut self, size: RvSize, val: RvData) -> Result<(), BusError> {
        if size != RvSize::Word {
            Err(BusError::StoreAccessFault)?
        }
        self.reg.set(val);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut reg = ReadWriteRegister::<()>::new(0x5);
        assert_eq!(reg.read(RvSize::Word), Ok(0x5));
        assert_eq!(reg.write(RvSize::Word, 0x1234_5678), Ok(()));
        assert_eq!(reg.read(RvSize::Word), Ok(0x1234_5678));
        assert_eq!(reg.read(RvSize::Byte), Err(BusError::LoadAccessFault));
        assert_eq!(
            reg.write(RvSize::HalfWord, 0),
            Err(BusError::StoreAccessFault)
        );
    }

    #[test]
    fn test_read_only() {
        let mut reg = ReadOnlyRegister::<()>::new(0x1);
        assert_eq!(reg.write(RvSize::Word, 0), Err(BusError::StoreAccessFault));
        reg.reg.set(0);
        assert_eq!(reg.read(RvSize::Word), Ok(0));
    }

    #[test]
    fn test_write_only() {
        let mut reg = WriteOnlyRegister::<()>::new(0);
        assert_eq!(reg.write(RvSize::Word, 0xff), Ok(()));
        assert_eq!(reg.reg.get(), 0xff);
        assert_eq!(reg.read(RvSize::Word), Err(BusError::LoadAccessFault));
    }
}
