use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::timer::{Timer, TimerHandle, TimerId};

/// State shared between a registry handle and the timers bound to it.
#[derive(Default)]
pub(crate) struct RegistryShared {
    live: RefCell<Vec<TimerHandle>>,
    /// Reused snapshot buffer for tick passes.
    sweep: RefCell<Vec<TimerHandle>>,
    next_id: Cell<u64>,
}

impl RegistryShared {
    pub(crate) fn push(&self, timer: TimerHandle) {
        log::debug!("registered {}", timer.id());
        self.live.borrow_mut().push(timer);
    }

    /// Removes the first entry with the same identity. Absent timers are ignored.
    pub(crate) fn remove(&self, timer: &TimerHandle) -> bool {
        let mut live = self.live.borrow_mut();
        match live.iter().position(|t| t.ptr_eq(timer)) {
            Some(index) => {
                live.remove(index);
                log::debug!("unregistered {}", timer.id());
                true
            }
            None => false,
        }
    }

    /// Copy the live set into a scratch buffer. Re-entrant passes get a
    /// fresh buffer because the shared one is taken for the duration.
    /// Removes every entry with the same identity. Returns how many went.
    pub(crate) fn remove_all(&self, timer: &TimerHandle) -> usize {
        let mut live = self.live.borrow_mut();
        let before = live.len();
        live.retain(|t| !t.ptr_eq(timer));
        let removed = before - live.len();
        if removed > 0 {
            log::debug!("unregistered {} ({removed} entries)", timer.id());
        }
        removed
    }

    fn snapshot(&self) -> Vec<TimerHandle> {
        let mut sweep = self.sweep.take();
        sweep.clear();
        sweep.extend(self.live.borrow().iter().cloned());
        sweep
    }

    fn recycle(&self, mut sweep: Vec<TimerHandle>) {
        sweep.clear();
        *self.sweep.borrow_mut() = sweep;
    }
}

/// The live set of timers and the per-frame tick pass over it.
///
/// A registry is a cheap, clonable handle; every clone refers to the same
/// live set. It is meant to be created once at engine startup, handed to
/// whatever creates timers, and torn down with [`TimerRegistry::clear_all`]
/// on shutdown.
///
/// Timers add and remove themselves as they start and stop, including from
/// inside [`TimerRegistry::tick_all`] when a countdown runs out. Each pass
/// therefore iterates a snapshot of the live set taken when the pass began.
#[derive(Clone, Default)]
pub struct TimerRegistry {
    shared: Rc<RegistryShared>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `timer` to the live set.
    ///
    /// [`Timer::start`] calls this for you. Registering the same timer twice
    /// makes it tick twice per pass; that is the caller's mistake and is not
    /// checked. Disposed timers are refused.
    pub fn register(&self, timer: &Timer) {
        let handle = timer.handle();
        if handle.is_disposed() {
            log::debug!("refused to register disposed {}", handle.id());
            return;
        }
        self.shared.push(handle.clone());
    }

    /// Remove `timer` from the live set. Unknown timers are ignored.
    pub fn unregister(&self, timer: &Timer) {
        self.shared.remove(timer.handle());
    }

    /// Tick every live timer once by `delta_time` seconds.
    ///
    /// Timers are ticked in snapshot order. A timer that unregisters during
    /// the pass does not disturb the others, and a timer registered during
    /// the pass waits for the next one.
    pub fn tick_all(&self, delta_time: f32) {
        if self.shared.live.borrow().is_empty() {
            return;
        }

        let sweep = self.shared.snapshot();
        log::trace!("tick pass over {} timers, dt={delta_time}", sweep.len());
        for timer in &sweep {
            timer.tick(delta_time);
        }
        self.shared.recycle(sweep);
    }

    /// Dispose every live timer and empty the live set.
    ///
    /// Timers started by hooks while the clear runs are disposed as well, so
    /// the live set is empty on return.
    pub fn clear_all(&self) {
        let mut count = 0;
        loop {
            let drained = std::mem::take(&mut *self.shared.live.borrow_mut());
            if drained.is_empty() {
                break;
            }
            count += drained.len();
            for timer in &drained {
                timer.dispose();
            }
        }
        log::debug!("cleared {count} timers");
    }

    /// Number of entries in the live set.
    pub fn len(&self) -> usize {
        self.shared.live.borrow().len()
    }

    /// Whether the live set is empty.
    pub fn is_empty(&self) -> bool {
        self.shared.live.borrow().is_empty()
    }

    /// Whether `timer` is in the live set.
    pub fn contains(&self, timer: &Timer) -> bool {
        let handle = timer.handle();
        self.shared.live.borrow().iter().any(|t| t.ptr_eq(handle))
    }

    pub(crate) fn next_id(&self) -> TimerId {
        let id = self.shared.next_id.get() + 1;
        self.shared.next_id.set(id);
        TimerId(id)
    }

    pub(crate) fn downgrade(&self) -> Weak<RegistryShared> {
        Rc::downgrade(&self.shared)
    }
}

impl fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::view::ReadOnlyTimer;

    #[test]
    fn empty_tick_is_a_noop() {
        let registry = TimerRegistry::new();
        registry.tick_all(1.0);
        assert!(registry.is_empty());
    }

    #[test]
    fn self_stopping_timers_do_not_disturb_the_pass() {
        let registry = TimerRegistry::new();
        let durations = [1.0, 5.0, 0.5, 5.0, 1.0, 5.0];
        let mut timers: Vec<_> = durations
            .iter()
            .map(|&d| Timer::countdown(&registry, d))
            .collect();
        for timer in &mut timers {
            timer.start();
        }

        registry.tick_all(1.0);

        for (timer, &duration) in timers.iter().zip(&durations) {
            // Every timer moved by exactly one tick.
            let expected = (duration - 1.0f32).max(0.0);
            assert!((timer.remaining() - expected).abs() < 1e-6);
        }
        assert_eq!(registry.len(), 3);
        for (timer, &duration) in timers.iter().zip(&durations) {
            assert_eq!(registry.contains(timer), duration > 1.0);
        }
    }

    #[test]
    fn timers_started_mid_pass_wait_for_next_pass() {
        let registry = TimerRegistry::new();
        let late = Rc::new(RefCell::new(None::<Timer>));

        let slot = Rc::clone(&late);
        let reg = registry.clone();
        let mut first = Timer::countdown(&registry, 1.0).with_on_stop(move || {
            let mut timer = Timer::stopwatch(&reg);
            timer.start();
            *slot.borrow_mut() = Some(timer);
        });
        first.start();

        registry.tick_all(1.0);
        assert_eq!(late.borrow().as_ref().map(|t| t.remaining()), Some(0.0));

        registry.tick_all(0.5);
        assert_eq!(late.borrow().as_ref().map(|t| t.remaining()), Some(0.5));
    }

    #[test]
    fn reentrant_tick_from_hook_does_not_panic() {
        let registry = TimerRegistry::new();
        let reg = registry.clone();
        let mut outer = Timer::countdown(&registry, 1.0).with_on_stop(move || reg.tick_all(0.25));
        let mut watch = Timer::stopwatch(&registry);
        outer.start();
        watch.start();

        registry.tick_all(1.0);
        // One tick from the outer pass, one from the nested pass.
        assert!((watch.remaining() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn clear_all_disposes_timers_started_by_stop_hooks() {
        let registry = TimerRegistry::new();
        let late = Rc::new(RefCell::new(None::<Timer>));

        let slot = Rc::clone(&late);
        let reg = registry.clone();
        let mut first = Timer::countdown(&registry, 5.0).with_on_stop(move || {
            let mut timer = Timer::stopwatch(&reg);
            timer.start();
            *slot.borrow_mut() = Some(timer);
        });
        first.start();

        registry.clear_all();
        assert!(registry.is_empty());
        assert!(first.is_disposed());

        let late = late.borrow();
        let follow_up = late.as_ref().unwrap();
        assert!(follow_up.is_disposed());
        assert!(!follow_up.is_registered());
        assert!(!follow_up.is_active());
    }

    #[test]
    fn unregister_absent_timer_is_silent() {
        let registry = TimerRegistry::new();
        let timer = Timer::countdown(&registry, 1.0);
        registry.unregister(&timer);
        registry.unregister(&timer);
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_registration_double_ticks() {
        let registry = TimerRegistry::new();
        let mut timer = Timer::stopwatch(&registry);
        timer.start();
        registry.register(&timer);
        registry.tick_all(1.0);
        assert!((timer.remaining() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn register_refuses_disposed_timers() {
        let registry = TimerRegistry::new();
        let mut timer = Timer::countdown(&registry, 1.0);
        timer.dispose();
        registry.register(&timer);
        assert!(!registry.contains(&timer));
    }

    #[test]
    fn dispose_removes_directly_registered_timer() {
        let registry = TimerRegistry::new();
        let mut timer = Timer::countdown(&registry, 1.0);
        registry.register(&timer);
        assert!(registry.contains(&timer));
        timer.dispose();
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_all_disposes_everything() {
        let registry = TimerRegistry::new();
        let stops = Rc::new(Cell::new(0));
        let mut timers = Vec::new();
        for i in 0..3 {
            let counter = Rc::clone(&stops);
            let mut timer = Timer::countdown(&registry, 1.0 + i as f32)
                .with_on_stop(move || counter.set(counter.get() + 1));
            timer.start();
            timers.push(timer);
        }
        timers[1].pause();

        registry.clear_all();

        assert_eq!(registry.len(), 0);
        assert!(timers.iter().all(|t| t.is_disposed()));
        assert!(timers.iter().all(|t| !t.is_registered()));
        assert_eq!(stops.get(), 3);
    }

    #[test]
    fn clear_all_then_reuse() {
        let registry = TimerRegistry::new();
        let mut old = Timer::countdown(&registry, 1.0);
        old.start();
        registry.clear_all();

        let mut fresh = Timer::countdown(&registry, 2.0);
        fresh.start();
        registry.tick_all(0.5);
        assert_eq!(registry.len(), 1);
        assert!((fresh.remaining() - 1.5).abs() < 1e-6);
        assert_eq!(old.remaining(), 1.0);
    }

    #[test]
    fn clones_share_the_live_set() {
        let registry = TimerRegistry::new();
        let other = registry.clone();
        let mut timer = Timer::stopwatch(&registry);
        timer.start();
        assert_eq!(other.len(), 1);
        assert!(format!("{other:?}").contains("live: 1"));
    }

    mod properties {
        use proptest::prelude::*;

        use crate::view::ReadOnlyTimer;
        use crate::{Timer, TimerRegistry};

        proptest! {
            #[test]
            fn pass_ticks_each_timer_once(durations in proptest::collection::vec(0.0f32..3.0, 1..30)) {
                let registry = TimerRegistry::new();
                let mut timers: Vec<_> = durations
                    .iter()
                    .map(|&d| Timer::countdown(&registry, d))
                    .collect();
                for timer in &mut timers {
                    timer.start();
                }

                registry.tick_all(1.0);

                let mut survivors = 0;
                for (timer, &duration) in timers.iter().zip(&durations) {
                    let expected = (duration - 1.0).max(0.0);
                    prop_assert!((timer.remaining() - expected).abs() < 1e-5);
                    let alive = timer.remaining() > 0.0;
                    prop_assert_eq!(registry.contains(timer), alive);
                    if alive {
                        survivors += 1;
                    }
                }
                prop_assert_eq!(registry.len(), survivors);
            }
        }
    }
}
