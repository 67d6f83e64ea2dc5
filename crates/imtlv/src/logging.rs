use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Target prefix of every imtlv crate (`imtlv_stream`, `imtlv_codec`, ...).
const CODEC_TARGET: &str = "imtlv";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `level` applies to the codec crates; anything else stays at warn or
/// quieter. `trace` shows container open/close and unknown-tag skips,
/// `debug` shows schema check failures.
fn codec_filter(level: LogLevel) -> Targets {
    let level = level.as_filter();
    Targets::new()
        .with_default(level.min(LevelFilter::WARN))
        .with_target(CODEC_TARGET, level)
}

/// Install the stderr subscriber.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);
    let registry = tracing_subscriber::registry();

    let _ = match format {
        LogFormat::Text => registry
            .with(layer.with_filter(codec_filter(level)))
            .try_init(),
        LogFormat::Json => registry
            .with(layer.json().with_filter(codec_filter(level)))
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn codec_crates_follow_the_requested_level() {
        let filter = codec_filter(LogLevel::Trace);
        assert!(filter.would_enable("imtlv_stream::writer", &Level::TRACE));
        assert!(filter.would_enable("imtlv_schema::validator", &Level::DEBUG));
        assert!(!filter.would_enable("clap_builder::parser", &Level::DEBUG));
        assert!(filter.would_enable("clap_builder::parser", &Level::WARN));
    }

    #[test]
    fn quiet_level_applies_everywhere() {
        let filter = codec_filter(LogLevel::Error);
        assert!(!filter.would_enable("imtlv_codec::encoder", &Level::DEBUG));
        assert!(!filter.would_enable("other", &Level::WARN));
        assert!(filter.would_enable("other", &Level::ERROR));
    }
}
