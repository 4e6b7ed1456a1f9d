/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains the bounded status poll shared by the calibration and read
    request phases.

--*/

use crate::{RegisterPort, Status, TrngReg};
use tqv_trng_error::{Phase, TrngError, TrngResult};

/// Polls STATUS once per clock cycle until `ready` accepts it.
///
/// Returns the number of cycles that elapsed. Up to `budget` cycles may
/// elapse, so STATUS is sampled at most `budget + 1` times; a zero budget
/// decides on the first sample alone.
///
/// STATUS is sampled once more after the last advance, so READY appearing
/// at exactly cycle `budget` still counts. The cocotb bench gives up after
/// its final advance without that last sample, one sample earlier.
///
/// # Errors
///
/// * `TrngError::Timeout` - `ready` rejected every sample. The error carries
///   `phase`, `iteration` and `budget`.
pub fn until_ready<P, F>(
    port: &mut P,
    ready: F,
    budget: u64,
    phase: Phase,
    iteration: Option<u32>,
) -> TrngResult<u64>
where
    P: RegisterPort + ?Sized,
    F: Fn(Status) -> bool,
{
    let mut remaining = budget;
    loop {
        let status = Status::from_bits_truncate(port.read(TrngReg::Status));
        if ready(status) {
            return Ok(budget - remaining);
        }
        if remaining == 0 {
            return Err(TrngError::Timeout {
                phase,
                iteration,
                budget,
            });
        }
        port.advance_cycles(1);
        remaining -= 1;
    }
}

/// Polls until `Status::READY` is set. See [`until_ready`].
pub fn until_status_ready<P>(
    port: &mut P,
    budget: u64,
    phase: Phase,
    iteration: Option<u32>,
) -> TrngResult<u64>
where
    P: RegisterPort + ?Sized,
{
    until_ready(
        port,
        |status| status.contains(Status::READY),
        budget,
        phase,
        iteration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePort;

    #[test]
    fn test_ready_immediately() {
        let mut port = FakePort::new();
        port.status = Status::READY.bits();
        assert_eq!(until_status_ready(&mut port, 0, Phase::Calibration, None), Ok(0));
        assert_eq!(port.cycles(), 0);
        assert_eq!(port.log.take(), "read(STATUS) -> 0x1\n");
    }

    #[test]
    fn test_ready_after_cycles() {
        let mut port = FakePort::new();
        port.ready_at = Some(5);
        assert_eq!(until_status_ready(&mut port, 64, Phase::ReadRequest, Some(0)), Ok(5));
        assert_eq!(port.cycles(), 5);
    }

    #[test]
    fn test_ready_on_last_cycle_of_budget() {
        let mut port = FakePort::new();
        port.ready_at = Some(8);
        assert_eq!(until_status_ready(&mut port, 8, Phase::Calibration, None), Ok(8));
    }

    #[test]
    fn test_timeout() {
        let mut port = FakePort::new();
        port.ready_at = Some(9);
        assert_eq!(
            until_status_ready(&mut port, 8, Phase::Calibration, None),
            Err(TrngError::Timeout {
                phase: Phase::Calibration,
                iteration: None,
                budget: 8
            })
        );
        assert_eq!(port.cycles(), 8);
    }

    #[test]
    fn test_zero_budget_not_ready() {
        let mut port = FakePort::new();
        assert_eq!(
            until_status_ready(&mut port, 0, Phase::ReadRequest, Some(4)),
            Err(TrngError::Timeout {
                phase: Phase::ReadRequest,
                iteration: Some(4),
                budget: 0
            })
        );
        assert_eq!(port.cycles(), 0);
        assert_eq!(port.log.take(), "read(STATUS) -> 0x0\n");
    }

    #[test]
    fn test_custom_accessor() {
        let mut port = FakePort::new();
        port.status = Status::READY.bits();
        // Waiting for READY to clear.
        port.ready_at = None;
        let result = until_ready(
            &mut port,
            |status| !status.contains(Status::READY),
            3,
            Phase::ReadRequest,
            None,
        );
        assert!(result.is_err());
    }
}
