use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::phase::PhaseId;

/// Where and how the timer tick is spliced into the host pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Phase the tick node is inserted under.
    pub target_phase: PhaseId,
    /// Position among the target phase's children. Clamped on insertion.
    pub insertion_index: usize,
    /// Name given to the inserted node.
    pub engine_phase: PhaseId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_phase: PhaseId::new("Update"),
            insertion_index: 0,
            engine_phase: PhaseId::new("TimerTick"),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields take their default values.
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        serde_json::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Set the phase the tick node is inserted under.
    pub fn with_target_phase(mut self, phase: impl Into<PhaseId>) -> Self {
        self.target_phase = phase.into();
        self
    }

    /// Set the position among the target phase's children.
    pub fn with_insertion_index(mut self, index: usize) -> Self {
        self.insertion_index = index;
        self
    }

    /// Set the name given to the inserted node.
    pub fn with_engine_phase(mut self, phase: impl Into<PhaseId>) -> Self {
        self.engine_phase = phase.into();
        self
    }
}
