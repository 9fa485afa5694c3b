//! Logging setup.
//!
//! Filter comes from `RUST_LOG` (default `info`). Output is human-readable
//! unless `LOG_FORMAT=json`, which is what the in-cluster deployment uses.

use std::io::Write;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`; anything other than `json` means text.
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Flushes buffered log output when dropped. Hold it for the life of `main`.
#[must_use]
#[derive(Debug)]
pub struct TelemetryGuard {
    format: LogFormat,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(e) = std::io::stdout().flush() {
            eprintln!("Failed to flush {:?} log output: {e}", self.format);
        }
    }
}

/// Installs the global subscriber.
pub fn init() -> TelemetryGuard {
    let format = LogFormat::from_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let filter_layer = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    TelemetryGuard { format }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_value() {
        assert_eq!(LogFormat::from_value(None), LogFormat::Text);
        assert_eq!(LogFormat::from_value(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_value(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::from_value(Some("pretty")), LogFormat::Text);
    }
}
