//! FHI-aims: cube densities, `geometry.in` structures and standard output.

mod geometry;
mod output;

use super::util::{self, TextCache};
use super::{Backend, DftReader, Error, cube};
use crate::model::density::DensityField;
use crate::model::structure::Structure;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct FhiAimsReader {
    cache: TextCache,
}

impl FhiAimsReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DftReader for FhiAimsReader {
    fn backend(&self) -> Backend {
        Backend::FhiAims
    }

    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error> {
        debug!(path = %path.display(), stride, "reading cube");
        cube::parse(self.cache.load(path)?)?.into_density()
    }

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error> {
        debug!(path = %path.display(), "reading geometry.in");
        geometry::parse(self.cache.load(path)?)
    }

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error> {
        let text = self.cache.load(path)?;
        if output::is_known(name) {
            return output::property(text, name)
                .ok_or_else(|| Error::missing_property(name, path));
        }
        util::parse_scalar(text)
    }
}
