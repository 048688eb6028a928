use super::{Backend, Format};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("no file registered for role '{role}'")]
    MissingPath { role: String },

    #[error("property '{property}' not found in '{}'", path.display())]
    MissingProperty { property: String, path: PathBuf },

    #[error("the {backend} reader cannot provide property '{property}'")]
    UnsupportedProperty { backend: Backend, property: String },

    #[error("user property {index} requested but the table holds {available} entries")]
    UserIndex { index: usize, available: usize },

    #[error("invalid TOML in '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn missing_property(property: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingProperty {
            property: property.into(),
            path: path.into(),
        }
    }
}
