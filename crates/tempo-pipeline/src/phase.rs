use std::fmt;

use serde::{Deserialize, Serialize};

use crate::callback::FrameCallback;
use crate::node::PipelineNode;

/// Name of a pipeline phase, e.g. `"Update"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(String);

impl PhaseId {
    /// Create a phase name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhaseId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PhaseId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named phase with an optional callback and ordered sub-phases.
#[derive(Debug, Clone)]
pub struct PhaseNode {
    phase: PhaseId,
    callback: Option<FrameCallback>,
    children: Vec<PhaseNode>,
}

impl PhaseNode {
    /// Create an empty phase.
    pub fn new(phase: impl Into<PhaseId>) -> Self {
        Self {
            phase: phase.into(),
            callback: None,
            children: Vec::new(),
        }
    }

    /// Append a sub-phase.
    pub fn with_child(mut self, child: PhaseNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several sub-phases.
    pub fn with_children(mut self, children: impl IntoIterator<Item = PhaseNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a callback run when this phase executes.
    pub fn with_callback(mut self, callback: FrameCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run this phase and then its sub-phases, pre-order.
    pub fn run(&self, delta_time: f32) {
        if let Some(callback) = &self.callback {
            callback.call(delta_time);
        }
        for child in &self.children {
            child.run(delta_time);
        }
    }

    fn render(&self, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.phase, indent = depth * 2)?;
        if self.callback.is_some() {
            f.write_str(" *")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.render(depth + 1, f)?;
        }
        Ok(())
    }
}

impl PipelineNode for PhaseNode {
    type Phase = PhaseId;

    fn phase(&self) -> &PhaseId {
        &self.phase
    }

    fn callback(&self) -> Option<&FrameCallback> {
        self.callback.as_ref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    fn insert_child(&mut self, index: usize, child: Self) {
        self.children.insert(index, child);
    }

    fn remove_child(&mut self, index: usize) -> Self {
        self.children.remove(index)
    }

    fn leaf(phase: PhaseId, callback: FrameCallback) -> Self {
        Self::new(phase).with_callback(callback)
    }
}

/// Indented outline of the tree. Phases holding a callback are marked `*`.
impl fmt::Display for PhaseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(0, f)
    }
}

/// A host frame pipeline: a phase tree plus a frame counter.
#[derive(Debug, Clone)]
pub struct Pipeline {
    root: PhaseNode,
    frame_index: u64,
}

impl Pipeline {
    /// Wrap an existing tree.
    pub fn new(root: PhaseNode) -> Self {
        Self {
            root,
            frame_index: 0,
        }
    }

    /// The default frame layout.
    ///
    /// ```text
    /// Frame
    ///   BeginFrame
    ///   Input
    ///   FixedUpdate
    ///   Update
    ///     ScriptUpdate
    ///   LateUpdate
    ///   Render
    ///     Extract
    ///     Present
    ///   EndFrame
    /// ```
    pub fn standard() -> Self {
        let root = PhaseNode::new("Frame").with_children([
            PhaseNode::new("BeginFrame"),
            PhaseNode::new("Input"),
            PhaseNode::new("FixedUpdate"),
            PhaseNode::new("Update").with_child(PhaseNode::new("ScriptUpdate")),
            PhaseNode::new("LateUpdate"),
            PhaseNode::new("Render")
                .with_children([PhaseNode::new("Extract"), PhaseNode::new("Present")]),
            PhaseNode::new("EndFrame"),
        ]);
        Self::new(root)
    }

    /// The root phase.
    pub fn root(&self) -> &PhaseNode {
        &self.root
    }

    /// The root phase, mutably. This is what an injector splices into.
    pub fn root_mut(&mut self) -> &mut PhaseNode {
        &mut self.root
    }

    /// Replace the whole tree, as a host does when it rebuilds its pipeline.
    pub fn replace_root(&mut self, root: PhaseNode) -> PhaseNode {
        std::mem::replace(&mut self.root, root)
    }

    /// Execute one frame: every callback in the tree, pre-order.
    pub fn run_frame(&mut self, delta_time: f32) {
        self.frame_index += 1;
        log::trace!("frame {} dt={delta_time}", self.frame_index);
        self.root.run(delta_time);
    }

    /// Number of frames executed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Number of nodes holding a clone of `callback`.
    pub fn count_callbacks(&self, callback: &FrameCallback) -> usize {
        self.root.count_callback(callback)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
