//! Readers for DFT calculation outputs and the cube volumetric writer.
//!
//! Every backend exposes the same four capabilities through [`DftReader`]:
//! density grids, atomic structures, scalar properties and user-defined
//! property vectors. [`Reader`] is the closed set of built-in backends,
//! selected by the `code` entry of a [`FileMap`](crate::FileMap).
//!
//! | Backend | Density | Structure | Properties |
//! |---|---|---|---|
//! | `vasp` | CHGCAR | POSCAR/CONTCAR | OUTCAR, scalar files |
//! | `qe` | cube | pw.x input | pw.x output, scalar files |
//! | `fhiaims` | cube | `geometry.in` | aims output, scalar files |
//! | `prophet` | cube | TOML structure | scalar or TOML files |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::model::density::DensityField;
use crate::model::structure::Structure;

pub mod cube;
pub mod error;
pub mod util;

mod custom;
mod fhiaims;
mod qe;
mod user;
mod vasp;

pub use custom::CustomReader;
pub use error::Error;
pub use fhiaims::FhiAimsReader;
pub use qe::QeReader;
pub use vasp::VaspReader;

/// File formats understood by the readers, used in parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Cube,
    Chgcar,
    Poscar,
    Outcar,
    PwInput,
    PwOutput,
    AimsGeometry,
    AimsOutput,
    CustomStructure,
    UserTable,
    Scalar,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Cube => write!(f, "cube"),
            Format::Chgcar => write!(f, "CHGCAR"),
            Format::Poscar => write!(f, "POSCAR"),
            Format::Outcar => write!(f, "OUTCAR"),
            Format::PwInput => write!(f, "pw.x input"),
            Format::PwOutput => write!(f, "pw.x output"),
            Format::AimsGeometry => write!(f, "geometry.in"),
            Format::AimsOutput => write!(f, "FHI-aims output"),
            Format::CustomStructure => write!(f, "structure TOML"),
            Format::UserTable => write!(f, "user property table"),
            Format::Scalar => write!(f, "scalar"),
        }
    }
}

/// The DFT codes a [`Reader`] can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Vasp,
    Qe,
    FhiAims,
    /// Plain-text formats written by hand or by other tools.
    Custom,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Backend::Vasp, Backend::Qe, Backend::FhiAims, Backend::Custom];

    /// The `code` string selecting this backend.
    pub fn code(&self) -> &'static str {
        match self {
            Backend::Vasp => "vasp",
            Backend::Qe => "qe",
            Backend::FhiAims => "fhiaims",
            Backend::Custom => "prophet",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("interface to code '{0}' has not been implemented")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.code() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

/// The capabilities the feature pipeline needs from a DFT code.
pub trait DftReader {
    fn backend(&self) -> Backend;

    /// Reads a density grid. `stride` is the configured sampling step; the
    /// pipeline performs the actual downsampling.
    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error>;

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error>;

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error>;

    /// Reads user property `index` (1-based) from a user property table.
    fn get_user_property(&mut self, index: usize, path: &Path) -> Result<Vec<f64>, Error> {
        user::read_user_property(index, path)
    }
}

/// A built-in reader backend.
#[derive(Debug)]
pub enum Reader {
    Vasp(VaspReader),
    Qe(QeReader),
    FhiAims(FhiAimsReader),
    Custom(CustomReader),
}

impl Reader {
    pub fn open(backend: Backend) -> Self {
        match backend {
            Backend::Vasp => Reader::Vasp(VaspReader::new()),
            Backend::Qe => Reader::Qe(QeReader::new()),
            Backend::FhiAims => Reader::FhiAims(FhiAimsReader::new()),
            Backend::Custom => Reader::Custom(CustomReader::new()),
        }
    }

    fn inner(&mut self) -> &mut dyn DftReader {
        match self {
            Reader::Vasp(r) => r,
            Reader::Qe(r) => r,
            Reader::FhiAims(r) => r,
            Reader::Custom(r) => r,
        }
    }
}

impl DftReader for Reader {
    fn backend(&self) -> Backend {
        match self {
            Reader::Vasp(_) => Backend::Vasp,
            Reader::Qe(_) => Backend::Qe,
            Reader::FhiAims(_) => Backend::FhiAims,
            Reader::Custom(_) => Backend::Custom,
        }
    }

    fn read_density(&mut self, path: &Path, stride: usize) -> Result<DensityField, Error> {
        self.inner().read_density(path, stride)
    }

    fn read_structure(&mut self, path: &Path) -> Result<Structure, Error> {
        self.inner().read_structure(path)
    }

    fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, Error> {
        self.inner().get_property(name, path)
    }

    fn get_user_property(&mut self, index: usize, path: &Path) -> Result<Vec<f64>, Error> {
        self.inner().get_user_property(index, path)
    }
}
