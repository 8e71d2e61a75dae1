use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Filter directives in this variable replace the level chosen by `-v`.
pub const LOG_ENV: &str = "BIOSIMI_LOG";

/// Directives for the command-line flags: `biosimi` at the requested level,
/// everything else at WARN, or nothing at all with `-q`.
pub fn default_directives(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "off".to_string();
    }
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,biosimi={}", level)
}

pub fn build_filter(verbosity: u8, quiet: bool, env_directives: Option<&str>) -> Result<EnvFilter> {
    let custom = env_directives.map(str::trim).filter(|d| !d.is_empty());
    match custom {
        Some(directives) if !quiet => EnvFilter::try_new(directives).map_err(|e| {
            CliError::Config(format!(
                "invalid {} directives '{}': {}",
                LOG_ENV, directives, e
            ))
        }),
        _ => Ok(EnvFilter::new(default_directives(verbosity, quiet))),
    }
}

/// Plain-text log file layer. Workflow spans are written when they close,
/// with their busy and idle time.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(verbosity, quiet, std::env::var(LOG_ENV).ok().as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            subscriber.with(file_layer(file)).init();
        }
        None => subscriber.init(),
    }

    Ok(())
}
