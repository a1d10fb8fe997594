use std::sync::Once;

/// Logger settings gathered from the command line.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "debug",
/// "tempo_pipeline=info,tempo_core=trace").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub verbose: bool,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    pub fn new(env_filter: Option<String>, verbose: bool) -> Self {
        Self {
            env_filter,
            verbose,
            write_style: env_logger::WriteStyle::Auto,
        }
    }

    fn fallback_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored.
///
/// An explicit filter wins over `RUST_LOG`; with neither set only warnings
/// are shown, or debug output with `--verbose`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.fallback_level());
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}
