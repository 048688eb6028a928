//! VASP: CHGCAR densities, POSCAR/CONTCAR structures and OUTCAR properties.

mod chgcar;
mod outcar;
mod poscar;

use super::util::{self, TextCache};
use super::{Backend, DftReader, Error};
use crate::model::density::DensityField;
use crate::model::structure::Structure;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct VaspReader {
    cache: TextCache,
}

impl VaspReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DftReader for VaspReader {
    fn backend(&self) -> Backend {
        Backend::Vasp
    }

    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error> {
        debug!(path = %path.display(), stride, "reading CHGCAR");
        let (density, _) = chgcar::parse(self.cache.load(path)?)?;
        Ok(density)
    }

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error> {
        debug!(path = %path.display(), "reading POSCAR");
        poscar::parse(self.cache.load(path)?)
    }

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error> {
        let text = self.cache.load(path)?;
        if outcar::is_known(name) {
            return outcar::property(text, name)
                .ok_or_else(|| Error::missing_property(name, path));
        }
        util::parse_scalar(text)
    }
}
