/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    File contains the simulation Clock and the Timer handle peripherals use
    to schedule work a number of clock cycles in the future.

--*/
use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    rc::Rc,
};

use crate::Bus;

/// Peripherals that need deferred execution store a clone of `Timer` and use
/// it to request a future call to [`Bus::poll`].
///
/// # Example
///
/// ```
/// use tqv_emu_bus::{ActionHandle, Bus, BusError, Clock, Timer};
/// use tqv_emu_types::{RvAddr, RvData, RvSize};
/// struct MyPeriph {
///     timer: Timer,
///     done: Option<ActionHandle>,
/// }
/// impl Bus for MyPeriph {
///     fn read(&mut self, _size: RvSize, _addr: RvAddr) -> Result<RvData, BusError> {
///         Ok(self.done.is_none() as RvData)
///     }
///     fn write(&mut self, _size: RvSize, _addr: RvAddr, _val: RvData) -> Result<(), BusError> {
///         if let Some(done) = self.done.take() {
///             self.timer.cancel(done);
///         }
///         self.done = Some(self.timer.schedule_poll_in(32));
///         Ok(())
///     }
///     fn poll(&mut self) {
///         if self.timer.fired(&mut self.done) {
///             println!("32 cycles since the last write");
///         }
///     }
/// }
/// let clock = Clock::new();
/// let mut periph = MyPeriph { timer: clock.timer(), done: None };
/// periph.write(RvSize::Word, 0, 0).unwrap();
/// clock.increment_and_process_timer_actions(32, &mut periph);
/// assert!(periph.done.is_none());
/// ```
#[derive(Clone)]
pub struct Timer {
    clock: Rc<ClockImpl>,
}
impl Timer {
    /// Constructs a new timer bound to the specified clock.
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: Rc::clone(&clock.clock),
        }
    }

    /// Number of clock cycles elapsed since the clock was created.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now.get()
    }

    /// Returns true (and clears `action`) once the deadline of `action` has
    /// been reached. Returns false if `action` is None or still pending.
    pub fn fired(&self, action: &mut Option<ActionHandle>) -> bool {
        let has_fired = match action {
            Some(handle) => {
                debug_assert!(
                    std::ptr::eq(handle.owner, Rc::as_ptr(&self.clock)),
                    "Supplied action was not created by this timer."
                );
                handle.deadline <= self.now()
            }
            None => false,
        };
        if has_fired {
            *action = None;
        }
        has_fired
    }

    /// Schedules a call to [`Bus::poll`] when the clock reaches `deadline`.
    pub fn schedule_poll_at(&self, deadline: u64) -> ActionHandle {
        self.clock.schedule(deadline)
    }

    /// Schedules a call to [`Bus::poll`] `ticks_from_now` cycles from now. A
    /// delay of zero fires on the next clock increment.
    pub fn schedule_poll_in(&self, ticks_from_now: u64) -> ActionHandle {
        self.schedule_poll_at(self.now().saturating_add(ticks_from_now))
    }

    /// Cancels a pending action. Cancelling an action that already fired is
    /// a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was created by a different clock.
    pub fn cancel(&self, handle: ActionHandle) {
        assert!(
            std::ptr::eq(handle.owner, Rc::as_ptr(&self.clock)),
            "Supplied action was not created by this timer."
        );
        self.clock
            .pending
            .borrow_mut()
            .remove(&(handle.deadline, handle.id));
    }
}

/// The simulation clock. Owned by the hardware model, which advances it one
/// cycle at a time.
pub struct Clock {
    clock: Rc<ClockImpl>,
}
impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
impl Clock {
    /// Constructs a new Clock with the cycle counter set to 0.
    pub fn new() -> Clock {
        Self {
            clock: Rc::new(ClockImpl {
                now: Cell::new(0),
                next_id: Cell::new(0),
                pending: RefCell::new(BTreeSet::new()),
            }),
        }
    }

    /// Constructs a `Timer` associated with this clock.
    pub fn timer(&self) -> Timer {
        Timer::new(self)
    }

    /// Number of simulated clock cycles since the clock was created.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now.get()
    }

    /// Advances the clock by `delta` cycles and returns how many scheduled
    /// actions fired.
    pub fn increment(&self, delta: u64) -> usize {
        let now = self
            .now()
            .checked_add(delta)
            .expect("Clock cycle counter overflowed.");
        self.clock.now.set(now);
        self.clock.expire(now)
    }

    /// Advances the clock by `delta` cycles and polls `bus` if any scheduled
    /// action fired.
    pub fn increment_and_process_timer_actions(&self, delta: u64, bus: &mut impl Bus) -> usize {
        let fired = self.increment(delta);
        if fired > 0 {
            bus.poll();
        }
        fired
    }
}

/// A pending call to [`Bus::poll`], returned by [`Timer::schedule_poll_at`].
#[derive(Debug)]
pub struct ActionHandle {
    deadline: u64,
    id: u64,
    // Identifies the owning clock; never dereferenced.
    owner: *const ClockImpl,
}
impl ActionHandle {
    /// The cycle at which this action fires.
    pub fn deadline(&self) -> u64 {
        self.deadline
    }
}

struct ClockImpl {
    now: Cell<u64>,
    next_id: Cell<u64>,
    pending: RefCell<BTreeSet<(u64, u64)>>,
}
impl ClockImpl {
    fn schedule(self: &Rc<Self>, deadline: u64) -> ActionHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending.borrow_mut().insert((deadline, id));
        ActionHandle {
            deadline,
            id,
            owner: Rc::as_ptr(self),
        }
    }

    fn expire(&self, now: u64) -> usize {
        let mut pending = self.pending.borrow_mut();
        let still_pending = pending.split_off(&(now.saturating_add(1), 0));
        let fired = pending.len();
        *pending = still_pending;
        fired
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::FakeBus;

    use super::*;

    #[test]
    fn test_clock() {
        let clock = Clock::new();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.increment(25), 0);
        assert_eq!(clock.now(), 25);
        assert_eq!(clock.increment(100), 0);
        assert_eq!(clock.now(), 125);
    }

    #[test]
    fn test_timer_schedule() {
        let clock = Clock::new();
        let timer = clock.timer();
        let mut action0 = Some(timer.schedule_poll_in(25));
        let mut action1 = Some(timer.schedule_poll_in(40));
        let mut action2 = Some(timer.schedule_poll_in(40));
        let mut action3 = Option::<ActionHandle>::None;

        assert_eq!(clock.increment(24), 0);
        assert!(!timer.fired(&mut action0) && action0.is_some());
        assert!(!timer.fired(&mut action3) && action3.is_none());

        assert_eq!(clock.increment(1), 1);
        assert!(timer.fired(&mut action0) && action0.is_none());
        assert!(!timer.fired(&mut action1) && action1.is_some());

        action3 = Some(timer.schedule_poll_in(0));
        assert_eq!(clock.increment(1), 1);
        assert!(timer.fired(&mut action3));

        assert_eq!(clock.increment(20), 2);
        assert!(timer.fired(&mut action1));
        assert!(timer.fired(&mut action2));
        assert_eq!(clock.increment(1000), 0);
    }

    #[test]
    fn test_cancel() {
        let clock = Clock::new();
        let timer = clock.timer();
        let action0 = timer.schedule_poll_in(10);
        assert_eq!(action0.deadline(), 10);
        timer.cancel(action0);
        assert_eq!(clock.increment(10), 0);
    }

    #[test]
    fn test_increment_and_poll() {
        let clock = Clock::new();
        let timer = clock.timer();
        let mut bus = FakeBus::new();

        let mut action0 = Some(timer.schedule_poll_in(25));
        clock.increment_and_process_timer_actions(20, &mut bus);
        assert_eq!(bus.log.take(), "");

        clock.increment_and_process_timer_actions(20, &mut bus);
        assert_eq!(bus.log.take(), "poll()\n");

        assert!(timer.fired(&mut action0));
    }

    #[test]
    #[should_panic(expected = "Supplied action was not created by this timer.")]
    fn test_mixup_timer_actions_on_cancel() {
        let clock0 = Clock::new();
        let clock0_action0 = clock0.timer().schedule_poll_at(50);

        let clock1 = Clock::new();
        clock1.timer().cancel(clock0_action0);
    }
}
