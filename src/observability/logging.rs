//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Route output to stdout, stderr, a file, or nowhere
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Logging is discarded unless a target is given
//! - File output is appended and rotated by size (see `rotation.rs`)

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::observability::rotation::{RotatingFile, RotationPolicy};

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Discard,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `"stdout"`, `"stderr"`, `""` (discard) or a file path.
    pub fn parse(value: &str) -> Self {
        match value {
            "" => LogTarget::Discard,
            "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("opening log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Rotation limits for file output.
pub fn rotation_policy(config: &ObservabilityConfig) -> RotationPolicy {
    RotationPolicy {
        max_bytes: config.log_max_size_mb * 1024 * 1024,
        max_backups: config.log_max_backups,
        max_age: (config.log_max_age_days > 0)
            .then(|| Duration::from_secs(config.log_max_age_days * 24 * 60 * 60)),
    }
}

/// Install the global subscriber.
pub fn init_logging(target: &LogTarget, config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let default_level = &config.log_level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("arc_gateway={default_level},tower_http={default_level}").into()
    });

    let writer = match target {
        LogTarget::Discard => BoxMakeWriter::new(std::io::sink),
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File(path) => {
            let file = RotatingFile::open(path, rotation_policy(config)).map_err(|source| {
                LoggingError::Open {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let ansi = matches!(target, LogTarget::Stdout | LogTarget::Stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi),
        )
        .try_init()?;

    Ok(())
}
