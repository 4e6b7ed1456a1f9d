/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the primitive bus types shared by the TinyQV emulator
    crates.

--*/

/// Bus data width
pub type RvData = u32;

/// Bus address width
pub type RvAddr = u32;

/// Bus IO operation size
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RvSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl From<RvSize> for usize {
    fn from(val: RvSize) -> usize {
        val as usize
    }
}

impl TryFrom<usize> for RvSize {
    type Error = usize;

    fn try_from(val: usize) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(RvSize::Byte),
            2 => Ok(RvSize::HalfWord),
            4 => Ok(RvSize::Word),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for RvSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RvSize::Byte => write!(f, "Byte"),
            RvSize::HalfWord => write!(f, "HalfWord"),
            RvSize::Word => write!(f, "Word"),
        }
    }
}
