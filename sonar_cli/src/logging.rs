//! Tracing subscriber setup: console (pretty or JSON) plus optional rotated JSON file.

use crate::error_fmt::CONFIG_CONTEXT;
use eyre::{Result, WrapErr};
use sonar_config::Logging;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Console level when neither the CLI nor the config sets one.
/// Cycle output already goes to stdout, so per-cycle `info` events stay quiet.
const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber.
///
/// Level precedence: `RUST_LOG`, then `--log-level`, then `[logging] level`.
/// Console output goes to stderr so stdout carries only cycle lines.
/// The returned guard flushes the file writer when dropped; hold it for the
/// life of the process.
pub fn init(json: bool, cli_level: Option<&str>, cfg: &Logging) -> Result<Option<WorkerGuard>> {
    let level = cli_level
        .or(cfg.level.as_deref())
        .unwrap_or(DEFAULT_LEVEL);
    let filter = match std::env::var("RUST_LOG") {
        Ok(s) if !s.trim().is_empty() => EnvFilter::try_new(s),
        _ => EnvFilter::try_new(level),
    }
    .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let pretty = (!json).then(|| fmt::layer().with_writer(std::io::stderr));
    let structured = json.then(|| fmt::layer().json().with_writer(std::io::stderr));

    let (file_layer, guard) = match cfg.file.as_deref() {
        Some(path) => {
            let appender = rolling_appender(Path::new(path), cfg.rotation.as_deref())?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(structured)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

fn rolling_appender(path: &Path, rotation: Option<&str>) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name().ok_or_else(|| {
        eyre::eyre!("{CONFIG_CONTEXT}: logging.file has no file name: {}", path.display())
    })?;
    let rotation = match rotation.unwrap_or("never") {
        "daily" => Rotation::DAILY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        other => eyre::bail!(
            "{CONFIG_CONTEXT}: logging.rotation must be one of never|daily|hourly, got '{other}'"
        ),
    };
    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .wrap_err_with(|| {
            format!("{CONFIG_CONTEXT}: cannot open log file {}", path.display())
        })
}
