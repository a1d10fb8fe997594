//! Frame pipeline integration for Tempo timers.
//!
//! A host walks a tree of named phases once per frame. The [`Injector`]
//! finds one phase in that tree and splices in a leaf node whose callback
//! ticks the timer registry, then removes exactly that node again on
//! shutdown. Any tree type can take part by implementing [`PipelineNode`];
//! [`PhaseNode`] and [`Pipeline`] are a ready-made host tree.
//!
//! [`TimerEngine`] ties one registry and one injector together with the
//! startup and shutdown sequence a host needs.

/// Shared frame callbacks compared by identity.
pub mod callback;
/// Engine configuration.
pub mod config;
/// Engine lifecycle: one registry plus one injector.
pub mod engine;
/// Error types for the pipeline crate.
pub mod error;
/// Recursive insertion and removal of the engine-owned node.
pub mod injector;
/// The generic pipeline-node interface.
pub mod node;
/// A concrete host pipeline tree.
pub mod phase;

/// Re-export of [`callback::FrameCallback`].
pub use callback::FrameCallback;
/// Re-export of [`config::EngineConfig`].
pub use config::EngineConfig;
/// Re-export of [`engine::TimerEngine`].
pub use engine::TimerEngine;
/// Re-exports of [`error::PipelineError`] and [`error::PipelineResult`].
pub use error::{PipelineError, PipelineResult};
/// Re-export of [`injector::Injector`].
pub use injector::Injector;
/// Re-export of [`node::PipelineNode`].
pub use node::PipelineNode;
/// Re-exports of the host tree types.
pub use phase::{PhaseId, PhaseNode, Pipeline};
