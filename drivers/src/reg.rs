/*++

Licensed under the Apache-2.0 license.

File Name:

    reg.rs

Abstract:

    File contains the register map of the TinyQV TRNG peripheral.

--*/

use bitflags::bitflags;

/// Word offsets of the TRNG registers. Offsets count 32-bit registers, not
/// bytes; the register port maps them onto bus addresses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum TrngReg {
    /// R/W, see [`Control`]
    Control = 0x0,

    /// RO, see [`Status`]
    Status = 0x1,

    /// R/W, calibration timer target in clock cycles
    CalibrationCycles = 0x2,

    /// WO, entropy-cell mask
    EntropySelect1 = 0x3,

    /// WO, complementary entropy-cell mask
    EntropySelect2 = 0x4,

    /// WO, latches the entropy-cell selection
    Trigger = 0x5,

    /// RO, last random word produced
    RandomNumber = 0x7,
}

impl TrngReg {
    pub const ALL: [TrngReg; 7] = [
        TrngReg::Control,
        TrngReg::Status,
        TrngReg::CalibrationCycles,
        TrngReg::EntropySelect1,
        TrngReg::EntropySelect2,
        TrngReg::Trigger,
        TrngReg::RandomNumber,
    ];

    #[inline]
    pub const fn offset(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrngReg::Control => "CONTROL",
            TrngReg::Status => "STATUS",
            TrngReg::CalibrationCycles => "CALIBRATION_CYCLES",
            TrngReg::EntropySelect1 => "ENTROPY_SELECT_1",
            TrngReg::EntropySelect2 => "ENTROPY_SELECT_2",
            TrngReg::Trigger => "TRIGGER",
            TrngReg::RandomNumber => "RANDOM_NUMBER",
        }
    }

    pub fn from_offset(offset: u32) -> Option<TrngReg> {
        Self::ALL.into_iter().find(|reg| reg.offset() == offset)
    }
}

bitflags! {
    /// CONTROL register bits. Bits above `READ_REQUEST` are reserved and
    /// written as zero.
    pub struct Control: u32 {
        const RESET = 1 << 0;
        const CORE_ENABLE = 1 << 1;
        const SELECT_BASE_SHORT = 1 << 2;
        const CALIBRATION = 1 << 3;
        const READ_REQUEST = 1 << 4;
    }
}

bitflags! {
    /// STATUS register bits.
    pub struct Status: u32 {
        /// The in-flight calibration or read has completed.
        const READY = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(TrngReg::Control.offset(), 0x0);
        assert_eq!(TrngReg::Status.offset(), 0x1);
        assert_eq!(TrngReg::CalibrationCycles.offset(), 0x2);
        assert_eq!(TrngReg::EntropySelect1.offset(), 0x3);
        assert_eq!(TrngReg::EntropySelect2.offset(), 0x4);
        assert_eq!(TrngReg::Trigger.offset(), 0x5);
        assert_eq!(TrngReg::RandomNumber.offset(), 0x7);
        assert_eq!(TrngReg::from_offset(0x6), None);
        assert_eq!(TrngReg::from_offset(0x7), Some(TrngReg::RandomNumber));
    }

    #[test]
    fn test_control_bits() {
        assert_eq!((Control::RESET | Control::CORE_ENABLE).bits(), 0x3);
        assert_eq!(Control::SELECT_BASE_SHORT.bits(), 0x4);
        assert_eq!(Control::CALIBRATION.bits(), 0x8);
        assert_eq!(Control::READ_REQUEST.bits(), 0x10);
        assert_eq!(Control::from_bits_truncate(0xffff_ffe2), Control::CORE_ENABLE);
        assert_eq!(Status::from_bits_truncate(0x3), Status::READY);
    }
}
