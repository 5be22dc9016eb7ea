//! Per-side countdown clocks.
//!
//! The [`Clock`] owns the remaining time of both sides and a [`Ticker`]
//! that schedules the recurring one-second tick. It never decides which
//! side is to move; the coordinator passes that in on every tick.

mod ticker;

pub use ticker::IntervalTicker;

use crate::types::{ClockState, Side};
use tracing::debug;

/// A cancellable recurring tick source.
///
/// `start` is only called once per game and `stop` only after `start`,
/// both by [`Clock`].
pub trait Ticker: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockPhase {
    Idle,
    Running,
    Stopped,
}

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock is not running; the tick arrived before start or after stop.
    Inactive,
    /// A player slot is empty, nothing was decremented.
    Frozen,
    Updated(ClockState),
    /// `loser` ran out of time. The clock has already stopped itself.
    Expired { state: ClockState, loser: Side },
}

pub struct Clock {
    state: ClockState,
    phase: ClockPhase,
    ticker: Box<dyn Ticker>,
}

impl Clock {
    /// Creates an idle clock.
    ///
    /// # Arguments
    ///
    /// * `seconds` - Initial time on each side
    /// * `ticker` - Tick source, started on [`start`](Clock::start)
    pub fn new(seconds: u32, ticker: Box<dyn Ticker>) -> Self {
        Self {
            state: ClockState::new(seconds),
            phase: ClockPhase::Idle,
            ticker,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Schedules the recurring tick. Returns `false` if the clock was
    /// already started (or stopped), in which case nothing is scheduled.
    pub fn start(&mut self) -> bool {
        if self.phase != ClockPhase::Idle {
            return false;
        }
        self.phase = ClockPhase::Running;
        self.ticker.start();
        debug!("Clock started at {:?}", self.state);
        true
    }

    /// Applies one tick. Exactly one side is decremented, and only while
    /// both player slots are occupied.
    ///
    /// # Arguments
    ///
    /// * `both_occupied` - Whether both player seats are currently held
    /// * `side_to_move` - The side whose time runs
    ///
    /// # Returns
    ///
    /// [`TickOutcome::Expired`] at most once per game; every later tick is
    /// [`TickOutcome::Inactive`].
    pub fn on_tick(&mut self, both_occupied: bool, side_to_move: Side) -> TickOutcome {
        if self.phase != ClockPhase::Running {
            return TickOutcome::Inactive;
        }
        if !both_occupied {
            return TickOutcome::Frozen;
        }

        let remaining = self.state.remaining_mut(side_to_move);
        *remaining = remaining.saturating_sub(1);

        if *remaining == 0 {
            self.stop();
            TickOutcome::Expired {
                state: self.state,
                loser: side_to_move,
            }
        } else {
            TickOutcome::Updated(self.state)
        }
    }

    /// Cancels the recurring tick for good. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == ClockPhase::Running {
            self.ticker.stop();
            debug!("Clock stopped at {:?}", self.state);
        }
        self.phase = ClockPhase::Stopped;
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("state", &self.state)
            .field("phase", &self.phase)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualTicker;
    use super::*;

    fn clock(seconds: u32) -> (Clock, ManualTicker) {
        let ticker = ManualTicker::default();
        (Clock::new(seconds, Box::new(ticker.clone())), ticker)
    }

    #[test]
    fn test_start_is_idempotent() {
        let (mut clock, ticker) = clock(600);
        assert!(clock.start());
        assert!(!clock.start());
        assert!(!clock.start());
        assert_eq!(ticker.starts(), 1);
        assert!(clock.is_running());
    }

    #[test]
    fn test_ticks_before_start_are_ignored() {
        let (mut clock, _) = clock(600);
        assert_eq!(clock.on_tick(true, Side::First), TickOutcome::Inactive);
        assert_eq!(clock.state(), ClockState::new(600));
    }

    #[test]
    fn test_only_side_to_move_is_decremented() {
        let (mut clock, _) = clock(600);
        clock.start();

        assert_eq!(
            clock.on_tick(true, Side::Second),
            TickOutcome::Updated(ClockState {
                first: 600,
                second: 599
            })
        );
        assert_eq!(
            clock.on_tick(true, Side::First),
            TickOutcome::Updated(ClockState {
                first: 599,
                second: 599
            })
        );
    }

    #[test]
    fn test_frozen_while_a_slot_is_empty() {
        let (mut clock, _) = clock(600);
        clock.start();

        for _ in 0..10 {
            assert_eq!(clock.on_tick(false, Side::First), TickOutcome::Frozen);
        }
        assert_eq!(clock.state(), ClockState::new(600));

        // No catch-up once both players are back
        clock.on_tick(true, Side::First);
        assert_eq!(clock.state().first, 599);
    }

    #[test]
    fn test_expiry_stops_the_clock() {
        let (mut clock, ticker) = clock(2);
        clock.start();

        assert!(matches!(clock.on_tick(true, Side::Second), TickOutcome::Updated(_)));
        assert_eq!(
            clock.on_tick(true, Side::Second),
            TickOutcome::Expired {
                state: ClockState {
                    first: 2,
                    second: 0
                },
                loser: Side::Second,
            }
        );
        assert!(!clock.is_running());
        assert_eq!(ticker.stops(), 1);

        // A tick that was already queued is a no-op
        assert_eq!(clock.on_tick(true, Side::Second), TickOutcome::Inactive);
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let (mut clock, ticker) = clock(600);
        clock.start();
        clock.stop();
        clock.stop();
        assert_eq!(ticker.stops(), 1);

        assert!(!clock.start());
        assert_eq!(ticker.starts(), 1);
        assert_eq!(clock.on_tick(true, Side::First), TickOutcome::Inactive);
    }

    #[test]
    fn test_stop_before_start_never_schedules() {
        let (mut clock, ticker) = clock(600);
        clock.stop();
        assert!(!clock.start());
        assert_eq!(ticker.starts(), 0);
        assert_eq!(ticker.stops(), 0);
    }
}
