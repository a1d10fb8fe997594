//! Frame-driven timers for Tempo.
//!
//! A [`Timer`] is advanced once per host frame by the [`TimerRegistry`] it was
//! created with. The registry never reads a clock: the host hands it a delta
//! time through [`TimerRegistry::tick_all`], usually from a callback spliced
//! into its frame pipeline (see the `tempo-pipeline` crate).
//!
//! Everything here is single-threaded. Timers and registries are `!Send` and
//! share state through reference counting, so a timer finishing mid-pass can
//! unregister itself from the registry that is ticking it.

/// The tick registry that owns the live set of timers.
pub mod registry;
/// Countdown and stopwatch timers.
pub mod timer;
/// Read-only observation of timers and serializable snapshots.
pub mod view;

/// Re-export of [`registry::TimerRegistry`].
pub use registry::TimerRegistry;
/// Re-exports of the timer types.
pub use timer::{Hook, Timer, TimerId, TimerKind};
/// Re-exports of the read-only view types.
pub use view::{ReadOnlyTimer, TimerSnapshot};
