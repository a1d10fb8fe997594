use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::registry::{RegistryShared, TimerRegistry};
use crate::view::ReadOnlyTimer;

/// A lifecycle callback attached to a timer.
pub type Hook = Rc<dyn Fn()>;

/// Identifier handed out by a [`TimerRegistry`], unique within that registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Which way a timer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Counts `remaining` down to zero, then stops itself.
    Countdown,
    /// Counts `remaining` up from zero and never finishes on its own.
    Stopwatch,
}

impl TimerKind {
    /// Value `remaining` takes when the timer is started or reset.
    fn start_value(self, initial_duration: f32) -> f32 {
        match self {
            Self::Countdown => initial_duration,
            Self::Stopwatch => 0.0,
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Countdown => write!(f, "countdown"),
            Self::Stopwatch => write!(f, "stopwatch"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HookKind {
    Start,
    Stop,
    Pause,
    Resume,
}

#[derive(Default, Clone)]
struct TimerHooks {
    on_start: Option<Hook>,
    on_stop: Option<Hook>,
    on_pause: Option<Hook>,
    on_resume: Option<Hook>,
}

impl TimerHooks {
    fn get(&self, kind: HookKind) -> Option<Hook> {
        match kind {
            HookKind::Start => self.on_start.clone(),
            HookKind::Stop => self.on_stop.clone(),
            HookKind::Pause => self.on_pause.clone(),
            HookKind::Resume => self.on_resume.clone(),
        }
    }
}

struct TimerState {
    id: TimerId,
    kind: TimerKind,
    initial_duration: f32,
    remaining: f32,
    registered: bool,
    paused: bool,
    disposed: bool,
    hooks: TimerHooks,
    registry: Weak<RegistryShared>,
}

impl TimerState {
    fn is_active(&self) -> bool {
        self.registered && !self.paused
    }

    fn is_finished(&self) -> bool {
        match self.kind {
            TimerKind::Countdown => self.remaining <= 0.0,
            TimerKind::Stopwatch => false,
        }
    }

    fn inverse_progress(&self) -> f32 {
        if self.initial_duration <= 0.0 || !self.initial_duration.is_finite() {
            return 1.0;
        }
        (self.remaining / self.initial_duration).clamp(0.0, 1.0)
    }

    /// Advance by `dt`. Returns true when a countdown just ran out.
    fn advance(&mut self, dt: f32) -> bool {
        match self.kind {
            TimerKind::Countdown => {
                self.remaining = (self.remaining - dt).max(0.0);
                self.remaining <= 0.0
            }
            TimerKind::Stopwatch => {
                self.remaining += dt;
                false
            }
        }
    }
}

/// Negative, infinite-negative and NaN inputs collapse to zero.
fn clamp_non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

/// Shared, non-owning reference to a timer's state.
///
/// The registry keeps these in its live set; identity is the allocation.
#[derive(Clone)]
pub(crate) struct TimerHandle(Rc<RefCell<TimerState>>);

impl TimerHandle {
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> TimerId {
        self.0.borrow().id
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.0.borrow().disposed
    }

    /// Runs a hook with no borrow of the state held, so the hook may freely
    /// call back into the registry.
    fn fire(&self, kind: HookKind) {
        let hook = self.0.borrow().hooks.get(kind);
        if let Some(hook) = hook {
            hook();
        }
    }

    pub(crate) fn start(&self) {
        let mut resumed = false;
        let registry = {
            let mut state = self.0.borrow_mut();
            if state.disposed {
                return;
            }
            if state.paused {
                state.paused = false;
                resumed = true;
            }
            if state.registered {
                None
            } else {
                let registry = state.registry.upgrade();
                match registry {
                    Some(registry) => {
                        state.remaining = state.kind.start_value(state.initial_duration);
                        state.registered = true;
                        Some(registry)
                    }
                    None => {
                        log::warn!("{} started after its registry was dropped", state.id);
                        None
                    }
                }
            }
        };

        if resumed {
            self.fire(HookKind::Resume);
        }
        if let Some(registry) = registry {
            registry.push(self.clone());
            self.fire(HookKind::Start);
        }
    }

    pub(crate) fn stop(&self) {
        let registry = {
            let mut state = self.0.borrow_mut();
            if state.disposed || !state.registered {
                return;
            }
            state.registered = false;
            state.registry.upgrade()
        };

        if let Some(registry) = registry {
            registry.remove(self);
        }
        self.fire(HookKind::Stop);
    }

    pub(crate) fn pause(&self) {
        let changed = {
            let mut state = self.0.borrow_mut();
            !state.disposed && !std::mem::replace(&mut state.paused, true)
        };
        if changed {
            self.fire(HookKind::Pause);
        }
    }

    pub(crate) fn resume(&self) {
        let changed = {
            let mut state = self.0.borrow_mut();
            !state.disposed && std::mem::replace(&mut state.paused, false)
        };
        if changed {
            self.fire(HookKind::Resume);
        }
    }

    pub(crate) fn reset(&self, new_duration: Option<f32>) {
        let mut state = self.0.borrow_mut();
        if state.disposed {
            return;
        }
        if let (TimerKind::Countdown, Some(duration)) = (state.kind, new_duration) {
            state.initial_duration = clamp_non_negative(duration);
        }
        state.remaining = state.kind.start_value(state.initial_duration);
    }

    pub(crate) fn tick(&self, delta_time: f32) {
        let finished = {
            let mut state = self.0.borrow_mut();
            if state.disposed || !state.is_active() {
                return;
            }
            state.advance(clamp_non_negative(delta_time))
        };
        if finished {
            self.stop();
        }
    }

    pub(crate) fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.stop();

        let registry = {
            let mut state = self.0.borrow_mut();
            state.disposed = true;
            state.registered = false;
            state.registry.upgrade()
        };
        // Direct `TimerRegistry::register` calls may have left extra entries.
        if let Some(registry) = registry {
            registry.remove_all(self);
        }
    }
}

/// A schedulable unit of elapsed or remaining time.
///
/// The `Timer` value is the exclusive owner: dropping it disposes the timer,
/// which removes it from its registry. The registry itself only holds
/// non-owning references used for ticking.
///
/// ```
/// use tempo_core::{ReadOnlyTimer, Timer, TimerRegistry};
///
/// let registry = TimerRegistry::new();
/// let mut timer = Timer::countdown(&registry, 5.0);
/// timer.start();
/// registry.tick_all(2.0);
/// assert_eq!(timer.remaining(), 3.0);
/// ```
pub struct Timer {
    handle: TimerHandle,
}

impl Timer {
    /// Create a stopped timer of the given kind bound to `registry`.
    ///
    /// Negative durations are clamped to zero. A stopwatch ignores the
    /// duration entirely; it always measures from zero.
    pub fn new(registry: &TimerRegistry, kind: TimerKind, duration: f32) -> Self {
        let initial_duration = match kind {
            TimerKind::Countdown => clamp_non_negative(duration),
            TimerKind::Stopwatch => 0.0,
        };
        let state = TimerState {
            id: registry.next_id(),
            kind,
            initial_duration,
            remaining: kind.start_value(initial_duration),
            registered: false,
            paused: false,
            disposed: false,
            hooks: TimerHooks::default(),
            registry: registry.downgrade(),
        };
        Self {
            handle: TimerHandle(Rc::new(RefCell::new(state))),
        }
    }

    /// Create a countdown timer that runs for `duration` seconds.
    pub fn countdown(registry: &TimerRegistry, duration: f32) -> Self {
        Self::new(registry, TimerKind::Countdown, duration)
    }

    /// Create a stopwatch that counts up from zero.
    pub fn stopwatch(registry: &TimerRegistry) -> Self {
        Self::new(registry, TimerKind::Stopwatch, 0.0)
    }

    /// Attach a callback fired each time the timer registers on `start`.
    pub fn with_on_start(self, hook: impl Fn() + 'static) -> Self {
        self.handle.0.borrow_mut().hooks.on_start = Some(Rc::new(hook));
        self
    }

    /// Attach a callback fired each time the timer unregisters, whether by
    /// `stop`, countdown completion or `dispose`.
    pub fn with_on_stop(self, hook: impl Fn() + 'static) -> Self {
        self.handle.0.borrow_mut().hooks.on_stop = Some(Rc::new(hook));
        self
    }

    /// Attach a callback fired when the timer becomes paused.
    pub fn with_on_pause(self, hook: impl Fn() + 'static) -> Self {
        self.handle.0.borrow_mut().hooks.on_pause = Some(Rc::new(hook));
        self
    }

    /// Attach a callback fired when the timer stops being paused.
    pub fn with_on_resume(self, hook: impl Fn() + 'static) -> Self {
        self.handle.0.borrow_mut().hooks.on_resume = Some(Rc::new(hook));
        self
    }

    /// Duration the timer resets to. Always zero for a stopwatch.
    pub fn initial_duration(&self) -> f32 {
        self.handle.0.borrow().initial_duration
    }

    /// Register with the registry and begin ticking.
    ///
    /// Clears a pending pause. If the timer was not registered, `remaining`
    /// is reset first and the start hook fires. Starting a running timer
    /// does nothing.
    pub fn start(&mut self) {
        self.handle.start();
    }

    /// Unregister and fire the stop hook. Does nothing if already stopped.
    pub fn stop(&mut self) {
        self.handle.stop();
    }

    /// Suspend ticking without giving up registration.
    pub fn pause(&mut self) {
        self.handle.pause();
    }

    /// Resume ticking after [`Timer::pause`].
    pub fn resume(&mut self) {
        self.handle.resume();
    }

    /// Rewind `remaining` to the initial duration. Registration and pause
    /// state are left untouched.
    pub fn reset(&mut self) {
        self.handle.reset(None);
    }

    /// Change the initial duration, then rewind. A stopwatch ignores the
    /// new duration and rewinds to zero.
    pub fn reset_with(&mut self, duration: f32) {
        self.handle.reset(Some(duration));
    }

    /// Advance by `delta_time` seconds. Only active timers move; the
    /// registry calls this for every live timer each frame.
    pub fn tick(&mut self, delta_time: f32) {
        self.handle.tick(delta_time);
    }

    /// Stop the timer and mark it disposed. Every later operation is a no-op.
    pub fn dispose(&mut self) {
        self.handle.dispose();
    }

    pub(crate) fn handle(&self) -> &TimerHandle {
        &self.handle
    }
}

impl ReadOnlyTimer for Timer {
    fn id(&self) -> TimerId {
        self.handle.id()
    }

    fn kind(&self) -> TimerKind {
        self.handle.0.borrow().kind
    }

    fn remaining(&self) -> f32 {
        self.handle.0.borrow().remaining
    }

    fn elapsed(&self) -> f32 {
        let state = self.handle.0.borrow();
        (state.initial_duration - state.remaining).abs()
    }

    fn inverse_progress(&self) -> f32 {
        self.handle.0.borrow().inverse_progress()
    }

    fn is_active(&self) -> bool {
        self.handle.0.borrow().is_active()
    }

    fn is_paused(&self) -> bool {
        self.handle.0.borrow().paused
    }

    fn is_registered(&self) -> bool {
        self.handle.0.borrow().registered
    }

    fn is_finished(&self) -> bool {
        self.handle.0.borrow().is_finished()
    }

    fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.dispose();
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.handle.0.borrow();
        f.debug_struct("Timer")
            .field("id", &state.id)
            .field("kind", &state.kind)
            .field("initial_duration", &state.initial_duration)
            .field("remaining", &state.remaining)
            .field("registered", &state.registered)
            .field("paused", &state.paused)
            .field("disposed", &state.disposed)
            .finish()
    }
}
