use std::fmt;

use crate::callback::FrameCallback;
use crate::error::{PipelineError, PipelineResult};
use crate::node::PipelineNode;

/// Splices one callback node into a pipeline tree and takes it out again.
///
/// The injector owns exactly one node: a leaf carrying its callback.
/// [`Injector::activate`] inserts it under the first phase matching the
/// target, and [`Injector::deactivate`] removes it by callback identity,
/// wherever it has ended up. An active flag makes both operations idempotent
/// so repeated startup/shutdown cycles never leave duplicates behind.
pub struct Injector<N: PipelineNode> {
    phase: N::Phase,
    callback: FrameCallback,
    active: bool,
}

impl<N: PipelineNode> Injector<N> {
    /// Create an inactive injector whose node will carry `phase` as its
    /// identity and run `callback` every frame.
    pub fn new(phase: N::Phase, callback: FrameCallback) -> Self {
        Self {
            phase,
            callback,
            active: false,
        }
    }

    /// Whether the node is currently in a tree.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The callback carried by the injected node.
    pub fn callback(&self) -> &FrameCallback {
        &self.callback
    }

    /// Identity of the injected node.
    pub fn phase(&self) -> &N::Phase {
        &self.phase
    }

    /// Insert the node as a child of the first phase matching `target`,
    /// at `index` (clamped to the child count).
    ///
    /// Does nothing if already active. Fails with
    /// [`PipelineError::PhaseNotFound`] if no phase matches, in which case
    /// the tree is untouched and the injector stays inactive.
    pub fn activate(&mut self, root: &mut N, target: &N::Phase, index: usize) -> PipelineResult<()> {
        if self.active {
            log::debug!("{} already injected, skipping activation", self.phase);
            return Ok(());
        }

        let make = || N::leaf(self.phase.clone(), self.callback.clone());
        if !insert_under(root, target, index, &make) {
            return Err(PipelineError::PhaseNotFound {
                phase: target.to_string(),
            });
        }

        self.active = true;
        log::info!("injected {} into {target}", self.phase);
        Ok(())
    }

    /// Remove the injected node, matched by callback identity rather than
    /// position. Returns whether a node was removed.
    ///
    /// Does nothing if inactive. If the host rebuilt the tree without the
    /// node, the injector still becomes inactive.
    pub fn deactivate(&mut self, root: &mut N) -> bool {
        if !self.active {
            log::debug!("{} not injected, skipping deactivation", self.phase);
            return false;
        }
        self.active = false;

        let removed = remove_by_callback(root, &self.callback);
        if removed {
            log::info!("removed {} from the pipeline", self.phase);
        } else {
            log::warn!("{} was no longer in the pipeline", self.phase);
        }
        removed
    }
}

impl<N: PipelineNode> fmt::Debug for Injector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("phase", &self.phase.to_string())
            .field("callback", &self.callback)
            .field("active", &self.active)
            .finish()
    }
}

/// Pre-order search for `target`; inserts under the first match only.
fn insert_under<N: PipelineNode>(
    node: &mut N,
    target: &N::Phase,
    index: usize,
    make: &dyn Fn() -> N,
) -> bool {
    if node.phase() == target {
        let index = index.min(node.children().len());
        node.insert_child(index, make());
        return true;
    }
    node.children_mut()
        .iter_mut()
        .any(|child| insert_under(child, target, index, make))
}

/// Pre-order search for a child carrying `callback`; removes the first one.
fn remove_by_callback<N: PipelineNode>(node: &mut N, callback: &FrameCallback) -> bool {
    let position = node
        .children()
        .iter()
        .position(|child| child.callback().is_some_and(|cb| cb.ptr_eq(callback)));
    if let Some(index) = position {
        node.remove_child(index);
        return true;
    }
    node.children_mut()
        .iter_mut()
        .any(|child| remove_by_callback(child, callback))
}
