//! `KEY=VALUE` environment file loading.
//!
//! Parsing is done by `dotenvy`: blank lines and `#` comments are skipped,
//! values may be quoted. Parse failures are reported with their line number.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse line {line}; line should be in KEY=VALUE format")]
    Parse { line: usize, content: String },

    #[error("read error: {0}")]
    Read(#[source] dotenvy::Error),
}

/// Parse environment file contents into a map.
pub fn parse_env_file(contents: &str) -> Result<HashMap<String, String>, EnvFileError> {
    let mut vars = HashMap::new();
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        let (key, value) = item.map_err(|e| locate(contents, e))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Attach a 1-based line number to a parse failure.
fn locate(contents: &str, err: dotenvy::Error) -> EnvFileError {
    match err {
        dotenvy::Error::LineParse(content, _) => {
            let line = contents
                .lines()
                .position(|l| l.trim() == content.trim())
                .map_or(0, |i| i + 1);
            EnvFileError::Parse { line, content }
        }
        other => EnvFileError::Read(other),
    }
}

/// Load `path` into the process environment. An empty path is a no-op.
///
/// Must run before any other thread reads the environment.
pub fn load_env_file(path: &Path) -> Result<usize, EnvFileError> {
    if path.as_os_str().is_empty() {
        return Ok(0);
    }

    let contents = fs::read_to_string(path).map_err(|source| EnvFileError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let vars = parse_env_file(&contents)?;

    for (key, value) in &vars {
        std::env::set_var(key, value);
    }

    tracing::debug!(path = %path.display(), count = vars.len(), "Environment file loaded");
    Ok(vars.len())
}
