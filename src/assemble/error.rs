//! Error types for example assembly.

use crate::io;
use crate::model::density::TransformError;
use crate::model::structure::CorrectionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling a training example.
///
/// Every failure is fatal for the example being built; no partially
/// assembled [`System`](super::System) is ever returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration or file map cannot describe a valid pipeline.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failed to parse the functional parameters TOML.
    #[error("failed to parse functional parameters: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A reader could not provide a requested quantity.
    #[error("failed to fetch {what}")]
    Fetch {
        /// What was being fetched, e.g. `property 'energy'`.
        what: String,
        #[source]
        source: io::Error,
    },

    #[error("density transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("local energy correction failed: {0}")]
    Correction(#[from] CorrectionError),

    /// An input tried to append a feature after the structure locked the
    /// collection.
    #[error("input '{input}' cannot be added: the feature collection is locked")]
    Locked { input: String },

    #[error("no density grid has been loaded")]
    MissingDensity,

    #[error("failed to write '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn configuration(details: impl Into<String>) -> Self {
        Self::Configuration(details.into())
    }

    pub fn fetch(what: impl Into<String>, source: io::Error) -> Self {
        Self::Fetch {
            what: what.into(),
            source,
        }
    }
}
