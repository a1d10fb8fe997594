use std::fmt;
use std::rc::Rc;

/// A per-frame callback that receives the host's delta time in seconds.
///
/// Clones share one allocation, and [`FrameCallback::ptr_eq`] compares that
/// allocation. This is how the injector recognises its own node in a tree
/// the host may have rebuilt since activation.
#[derive(Clone)]
pub struct FrameCallback(Rc<dyn Fn(f32)>);

impl FrameCallback {
    /// Wrap a closure.
    pub fn new(callback: impl Fn(f32) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback.
    pub fn call(&self, delta_time: f32) {
        (self.0)(delta_time);
    }

    /// Whether both values are clones of the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FrameCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameCallback({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}
