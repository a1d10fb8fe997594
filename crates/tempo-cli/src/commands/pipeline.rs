use colored::Colorize;
use tempo_pipeline::{EngineConfig, Pipeline, TimerEngine};

pub fn run(inject: bool, cycles: u32, phase: Option<&str>) -> Result<(), String> {
    let mut config = EngineConfig::default();
    if let Some(phase) = phase {
        config = config.with_target_phase(phase);
    }

    let mut pipeline = Pipeline::standard();
    let mut engine: TimerEngine = TimerEngine::new(config);

    if inject {
        engine
            .start(pipeline.root_mut())
            .map_err(|e| format!("cannot start timer engine: {e}"))?;
    }

    print!("{pipeline}");

    if cycles == 0 {
        return Ok(());
    }

    for _ in 0..cycles {
        engine
            .start(pipeline.root_mut())
            .map_err(|e| format!("cannot start timer engine: {e}"))?;
        engine.shutdown(pipeline.root_mut());
    }

    let left = pipeline.count_callbacks(engine.callback());
    let summary = format!("{cycles} cycles, {left} engine nodes left");
    if left == 0 {
        println!("  {}", summary.green());
        Ok(())
    } else {
        Err(summary)
    }
}
