//! Demo host for the Tempo timer engine.

mod commands;
mod logging;

use std::process;

use clap::{Parser, Subcommand};

use crate::commands::run::RunArgs;

#[derive(Parser)]
#[command(
    name = "tempo",
    about = "Tempo: frame-driven timers spliced into a host pipeline",
    version,
    propagate_version = true
)]
struct Cli {
    /// Show debug logging (ignored when --log or RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter in env_logger syntax, e.g. "tempo_pipeline=info"
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run timers through a number of frames and report their state
    Run(RunArgs),

    /// Print the frame pipeline tree
    Pipeline {
        /// Show the tree with the timer tick injected
        #[arg(short, long)]
        inject: bool,

        /// Run this many start/shutdown cycles and report leftover nodes
        #[arg(short, long, default_value = "0")]
        cycles: u32,

        /// Phase the timer tick is injected under
        #[arg(short, long)]
        phase: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(logging::LoggingConfig::new(cli.log, cli.verbose));

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&args),
        Commands::Pipeline {
            inject,
            cycles,
            phase,
        } => commands::pipeline::run(inject, cycles, phase.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
