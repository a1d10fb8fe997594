use std::fmt;

use crate::callback::FrameCallback;

/// A node in a host-owned frame pipeline tree.
///
/// The injector only needs a node's identity, its ordered children and its
/// callback slot, plus a way to build a fresh leaf. Implement this for the
/// host's own node type and the tree becomes walkable without any runtime
/// type inspection.
pub trait PipelineNode: Sized {
    /// Identity the injector matches target phases against.
    type Phase: PartialEq + Clone + fmt::Display;

    /// This node's identity.
    fn phase(&self) -> &Self::Phase;

    /// The callback this node runs each frame, if any.
    fn callback(&self) -> Option<&FrameCallback>;

    /// Ordered children. Nodes without a child list return an empty slice.
    fn children(&self) -> &[Self];

    /// Ordered children, mutably.
    fn children_mut(&mut self) -> &mut [Self];

    /// Insert `child` at `index`, creating the child list if absent.
    /// `index` is always within `0..=children().len()`.
    fn insert_child(&mut self, index: usize, child: Self);

    /// Remove and return the child at `index`.
    fn remove_child(&mut self, index: usize) -> Self;

    /// Build a childless node carrying `callback`.
    fn leaf(phase: Self::Phase, callback: FrameCallback) -> Self;

    /// Depth-first search for the first node with the given identity.
    fn find_phase(&self, phase: &Self::Phase) -> Option<&Self> {
        if self.phase() == phase {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_phase(phase))
    }

    /// Number of nodes in this subtree holding a clone of `callback`.
    fn count_callback(&self, callback: &FrameCallback) -> usize {
        let own = usize::from(self.callback().is_some_and(|cb| cb.ptr_eq(callback)));
        own + self
            .children()
            .iter()
            .map(|c| c.count_callback(callback))
            .sum::<usize>()
    }
}
