/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the error types reported by the TRNG control driver and
    the numeric codes they map to.

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::fmt;
use core::num::{NonZeroU32, TryFromIntError};

/// Status-polled phase in which a failure was detected. Reset and the
/// entropy trigger settle for a fixed time and cannot fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Calibration,
    ReadRequest,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::Calibration => write!(f, "calibration"),
            Phase::ReadRequest => write!(f, "read request"),
        }
    }
}

/// Failure of a TRNG control sequence. Both kinds are fatal to the sequence
/// that raised them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TrngError {
    /// A register did not read back the value just written to it.
    Verification {
        reg: &'static str,
        written: u32,
        read: u32,
    },

    /// A poll loop used up its cycle budget before the status bit it waits
    /// for was set. `iteration` is the zero-based read index for
    /// [`Phase::ReadRequest`].
    Timeout {
        phase: Phase,
        iteration: Option<u32>,
        budget: u64,
    },
}

impl TrngError {
    /// The stable numeric code reported for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TrngError::Verification { .. } => ErrorCode::VERIFICATION_MISMATCH,
            TrngError::Timeout { phase, .. } => match phase {
                Phase::Calibration => ErrorCode::CALIBRATION_TIMEOUT,
                Phase::ReadRequest => ErrorCode::READ_REQUEST_TIMEOUT,
            },
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            // Only the calibration register is verified today.
            TrngError::Verification { .. } => Phase::Calibration,
            TrngError::Timeout { phase, .. } => *phase,
        }
    }
}

impl fmt::Display for TrngError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrngError::Verification { reg, written, read } => write!(
                f,
                "{reg} read back {read:#x} after writing {written:#x}"
            ),
            TrngError::Timeout {
                phase,
                iteration: Some(i),
                budget,
            } => write!(f, "TRNG {phase} {i} timed out after {budget} cycles"),
            TrngError::Timeout {
                phase,
                iteration: None,
                budget,
            } => write!(f, "TRNG {phase} timed out after {budget} cycles"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TrngError {}

pub type TrngResult<T> = Result<T, TrngError>;

/// Numeric error code. The upper half identifies the error class, the lower
/// half the phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ErrorCode(pub NonZeroU32);

macro_rules! define_error_codes {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: ErrorCode = ErrorCode::new_const($value);
        )*

        #[cfg(test)]
        fn all_codes() -> Vec<(&'static str, u32)> {
            vec![$((stringify!($name), $value)),*]
        }
    };
}

impl ErrorCode {
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("ErrorCode cannot be 0"),
        }
    }

    define_error_codes![
        (
            VERIFICATION_MISMATCH,
            0x0001_0001,
            "Register read-back mismatch"
        ),
        (CALIBRATION_TIMEOUT, 0x0002_0001, "Calibration timed out"),
        (READ_REQUEST_TIMEOUT, 0x0002_0002, "Read request timed out"),
    ];
}

impl From<TrngError> for ErrorCode {
    fn from(val: TrngError) -> Self {
        val.code()
    }
}

impl From<ErrorCode> for u32 {
    fn from(val: ErrorCode) -> Self {
        val.0.get()
    }
}

impl TryFrom<u32> for ErrorCode {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        NonZeroU32::try_from(val).map(ErrorCode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(ErrorCode::try_from(0).is_err());
        assert_eq!(
            Ok(ErrorCode::CALIBRATION_TIMEOUT),
            ErrorCode::try_from(0x0002_0001)
        );
    }

    #[test]
    fn test_error_codes_uniqueness() {
        let mut seen = HashSet::new();
        for (name, value) in ErrorCode::all_codes() {
            assert!(seen.insert(value), "duplicate error code {name}");
        }
    }

    #[test]
    fn test_every_code_reachable() {
        let produced: HashSet<u32> = [
            TrngError::Verification {
                reg: "CALIBRATION_CYCLES",
                written: 1,
                read: 0,
            },
            TrngError::Timeout {
                phase: Phase::Calibration,
                iteration: None,
                budget: 0,
            },
            TrngError::Timeout {
                phase: Phase::ReadRequest,
                iteration: Some(0),
                budget: 64,
            },
        ]
        .iter()
        .map(|err| u32::from(err.code()))
        .collect();
        let defined: HashSet<u32> = ErrorCode::all_codes().into_iter().map(|(_, v)| v).collect();
        assert_eq!(produced, defined);
    }

    #[test]
    fn test_code_mapping() {
        let err = TrngError::Timeout {
            phase: Phase::ReadRequest,
            iteration: Some(3),
            budget: 64,
        };
        assert_eq!(u32::from(ErrorCode::from(err)), 0x0002_0002);
        assert_eq!(err.phase(), Phase::ReadRequest);

        let err = TrngError::Verification {
            reg: "CALIBRATION_CYCLES",
            written: 0x800,
            read: 0,
        };
        assert_eq!(err.code(), ErrorCode::VERIFICATION_MISMATCH);
        assert_eq!(err.phase(), Phase::Calibration);
    }

    #[test]
    fn test_display() {
        let err = TrngError::Timeout {
            phase: Phase::Calibration,
            iteration: None,
            budget: 4096,
        };
        assert_eq!(
            err.to_string(),
            "TRNG calibration timed out after 4096 cycles"
        );
        let err = TrngError::Timeout {
            phase: Phase::ReadRequest,
            iteration: Some(2),
            budget: 64,
        };
        assert_eq!(
            err.to_string(),
            "TRNG read request 2 timed out after 64 cycles"
        );
        let err = TrngError::Verification {
            reg: "CALIBRATION_CYCLES",
            written: 0x10000,
            read: 0,
        };
        assert_eq!(
            err.to_string(),
            "CALIBRATION_CYCLES read back 0x0 after writing 0x10000"
        );
    }
}
