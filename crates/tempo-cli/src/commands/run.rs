use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tempo_core::{ReadOnlyTimer, Timer, TimerSnapshot};
use tempo_pipeline::{Pipeline, TimerEngine};

#[derive(Args)]
pub struct RunArgs {
    /// Start a countdown of this many seconds (repeatable)
    #[arg(short, long, value_name = "SECS")]
    countdown: Vec<f32>,

    /// Number of stopwatches to start
    #[arg(short, long, default_value = "0", value_name = "N")]
    stopwatch: usize,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u32,

    /// Delta time passed to every frame, in seconds
    #[arg(long, default_value = "0.016", allow_negative_numbers = true)]
    dt: f32,

    /// Phase the timer tick is injected under (overrides the config file)
    #[arg(short, long)]
    phase: Option<String>,

    /// Position among the phase's children (overrides the config file)
    #[arg(short, long)]
    index: Option<usize>,

    /// Engine config file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print timer snapshots as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: &RunArgs) -> Result<(), String> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(phase) = &args.phase {
        config = config.with_target_phase(phase.as_str());
    }
    if let Some(index) = args.index {
        config = config.with_insertion_index(index);
    }

    let mut pipeline = Pipeline::standard();
    let mut engine: TimerEngine = TimerEngine::new(config);
    engine
        .start(pipeline.root_mut())
        .map_err(|e| format!("cannot start timer engine: {e}"))?;

    let stopped = Rc::new(Cell::new(0usize));
    let mut timers: Vec<Timer> = args
        .countdown
        .iter()
        .map(|&secs| Timer::countdown(engine.registry(), secs).with_on_stop(counter(&stopped)))
        .chain(
            (0..args.stopwatch)
                .map(|_| Timer::stopwatch(engine.registry()).with_on_stop(counter(&stopped))),
        )
        .collect();
    for timer in &mut timers {
        timer.start();
    }

    for _ in 0..args.frames {
        pipeline.run_frame(args.dt);
    }

    let snapshots: Vec<TimerSnapshot> = timers.iter().map(|t| t.snapshot()).collect();
    let completed = stopped.get();
    engine.shutdown(pipeline.root_mut());

    if args.json {
        let json = serde_json::to_string_pretty(&snapshots)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "  {} {}",
        "Run".bold(),
        format!(
            "({} frames, dt={}, tick under {})",
            pipeline.frame_index(),
            args.dt,
            engine.config().target_phase
        )
        .dimmed()
    );

    if snapshots.is_empty() {
        println!("  No timers requested.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Timer", "Kind", "Remaining", "Elapsed", "Progress", "State"]);
    for snap in &snapshots {
        table.add_row(vec![
            snap.id.to_string(),
            snap.kind.to_string(),
            format!("{:.3}", snap.remaining),
            format!("{:.3}", snap.elapsed),
            format!("{:.0}%", snap.progress * 100.0),
            state_label(snap),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} timers, {completed} completed", snapshots.len());

    Ok(())
}

fn counter(count: &Rc<Cell<usize>>) -> impl Fn() + 'static {
    let count = Rc::clone(count);
    move || count.set(count.get() + 1)
}

fn state_label(snap: &TimerSnapshot) -> String {
    if snap.finished {
        "finished".green().to_string()
    } else if snap.paused {
        "paused".yellow().to_string()
    } else if snap.active {
        "running".cyan().to_string()
    } else {
        "stopped".dimmed().to_string()
    }
}
