use std::{fs, path::Path};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::schema::Schema;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("server returned an error: {status}")]
    ServerError { status: u16 },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read raw JSON text from a file path or an `http(s)://` URL.
pub fn read_source(source: &str) -> Result<String, LoadError> {
    debug!(source, "reading schema source");

    if !is_url(source) {
        return fs::read_to_string(source).map_err(|e| LoadError::Io {
            path: source.to_string(),
            source: e,
        });
    }

    let response = ureq::get(source).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => LoadError::ServerError { status: code },
        other => LoadError::Http(other),
    })?;

    response.into_string().map_err(|e| LoadError::Io {
        path: source.to_string(),
        source: e,
    })
}

pub fn parse_json(text: &str) -> Result<Value, LoadError> {
    Ok(serde_json::from_str(text)?)
}

/// Read and parse `source`. Structural validation is left to the caller.
pub fn load_json(source: &str) -> Result<Value, LoadError> {
    parse_json(&read_source(source)?)
}

pub fn to_pretty_json(schema: &Schema) -> Result<String, LoadError> {
    let mut text = serde_json::to_string_pretty(schema)?;
    text.push('\n');
    Ok(text)
}

/// Replace the file at `path` with the whole schema, pretty-printed.
pub fn save_schema(schema: &Schema, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    let text = to_pretty_json(schema)?;
    fs::write(path, text).map_err(|e| LoadError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), "saved schema");
    Ok(())
}
