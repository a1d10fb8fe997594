use serde::{Deserialize, Serialize};

use crate::timer::{TimerId, TimerKind};

/// Observation-only access to a timer.
///
/// Hand out `&dyn ReadOnlyTimer` where callers should watch a timer without
/// being able to start, stop or dispose it.
pub trait ReadOnlyTimer {
    /// Identifier assigned at construction.
    fn id(&self) -> TimerId;

    /// Countdown or stopwatch.
    fn kind(&self) -> TimerKind;

    /// Time left for a countdown; time counted so far for a stopwatch.
    fn remaining(&self) -> f32;

    /// Distance between the initial duration and `remaining`.
    fn elapsed(&self) -> f32;

    /// Fraction of the duration still left, from 1 (start) to 0 (end).
    ///
    /// A zero initial duration reports 1.
    fn inverse_progress(&self) -> f32;

    /// Fraction of the duration used up, from 0 (start) to 1 (end).
    fn progress(&self) -> f32 {
        1.0 - self.inverse_progress()
    }

    /// Registered and not paused.
    fn is_active(&self) -> bool;

    /// Paused, whether or not registered.
    fn is_paused(&self) -> bool;

    /// Currently in its registry's live set by way of `start`.
    fn is_registered(&self) -> bool;

    /// A countdown that reached zero. Stopwatches never finish.
    fn is_finished(&self) -> bool;

    /// Disposed; every mutating operation is now a no-op.
    fn is_disposed(&self) -> bool;

    /// Capture every observable value at once.
    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            id: self.id(),
            kind: self.kind(),
            remaining: self.remaining(),
            elapsed: self.elapsed(),
            progress: self.progress(),
            active: self.is_active(),
            paused: self.is_paused(),
            finished: self.is_finished(),
            disposed: self.is_disposed(),
        }
    }
}

/// The observable state of a timer at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Identifier of the timer.
    pub id: TimerId,
    /// Countdown or stopwatch.
    pub kind: TimerKind,
    /// Value of [`ReadOnlyTimer::remaining`].
    pub remaining: f32,
    /// Value of [`ReadOnlyTimer::elapsed`].
    pub elapsed: f32,
    /// Value of [`ReadOnlyTimer::progress`].
    pub progress: f32,
    /// Value of [`ReadOnlyTimer::is_active`].
    pub active: bool,
    /// Value of [`ReadOnlyTimer::is_paused`].
    pub paused: bool,
    /// Value of [`ReadOnlyTimer::is_finished`].
    pub finished: bool,
    /// Value of [`ReadOnlyTimer::is_disposed`].
    pub disposed: bool,
}
