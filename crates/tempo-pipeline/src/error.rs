/// Alias for `Result<T, PipelineError>`.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by pipeline injection and engine setup.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The target phase does not exist anywhere in the pipeline tree.
    /// Timers will never tick; treat this as fatal at startup.
    #[error("pipeline phase not found: \"{phase}\"")]
    PhaseNotFound {
        /// The phase that was searched for.
        phase: String,
    },

    /// The engine configuration could not be parsed.
    #[error("invalid engine config: {0}")]
    Config(String),
}
