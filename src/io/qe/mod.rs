//! Quantum ESPRESSO: pp.x cube densities, pw.x inputs and pw.x outputs.

mod pw_input;
mod pw_output;

use super::util::{self, TextCache};
use super::{Backend, DftReader, Error, cube};
use crate::model::density::DensityField;
use crate::model::structure::Structure;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct QeReader {
    cache: TextCache,
}

impl QeReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DftReader for QeReader {
    fn backend(&self) -> Backend {
        Backend::Qe
    }

    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error> {
        debug!(path = %path.display(), stride, "reading pp.x cube");
        cube::parse(self.cache.load(path)?)?.into_density()
    }

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error> {
        debug!(path = %path.display(), "reading pw.x input");
        pw_input::parse(self.cache.load(path)?)
    }

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error> {
        let text = self.cache.load(path)?;
        if pw_output::is_known(name) {
            return pw_output::property(text, name)
                .ok_or_else(|| Error::missing_property(name, path));
        }
        util::parse_scalar(text)
    }
}
