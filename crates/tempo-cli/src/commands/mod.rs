pub mod pipeline;
pub mod run;

use std::path::Path;

use tempo_pipeline::EngineConfig;

/// Load an engine config file, or the defaults when no path is given.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    EngineConfig::from_json(&text).map_err(|e| e.to_string())
}
