//! The `prophet` backend: hand-written or tool-generated plain-text inputs.
//!
//! Densities are cube files whose title may carry a `train=<tag>` token,
//! structures are TOML documents, and properties are either bare scalar
//! files or TOML tables keyed by property name.

mod structure;

use super::util::{self, TextCache};
use super::{Backend, DftReader, Error, cube};
use crate::model::density::DensityField;
use crate::model::structure::Structure;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CustomReader {
    cache: TextCache,
}

impl CustomReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DftReader for CustomReader {
    fn backend(&self) -> Backend {
        Backend::Custom
    }

    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error> {
        debug!(path = %path.display(), stride, "reading cube");
        let data = cube::parse(self.cache.load(path)?)?;
        let train = data.train_tag().map(str::to_string);
        let density = data.into_density()?;
        Ok(match train {
            Some(tag) => density.with_train(tag),
            None => density,
        })
    }

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error> {
        debug!(path = %path.display(), "reading structure TOML");
        structure::parse(self.cache.load(path)?, path)
    }

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error> {
        let text = self.cache.load(path)?;
        if let Ok(value) = util::parse_scalar(text) {
            return Ok(value);
        }

        let table: toml::Table = toml::from_str(text).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        match table.get(name) {
            Some(toml::Value::Float(v)) => Ok(*v),
            Some(toml::Value::Integer(v)) => Ok(*v as f64),
            Some(_) => Err(Error::UnsupportedProperty {
                backend: Backend::Custom,
                property: name.to_string(),
            }),
            None => Err(Error::missing_property(name, path)),
        }
    }
}
