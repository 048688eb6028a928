//! Assembly of machine-learning training examples from the outputs of
//! electronic-structure (DFT) calculations.
//!
//! Given a map of named input files and a [`FunctionalParams`] configuration,
//! the library reads densities, structures and scalar properties through a
//! backend-specific reader, transforms them into an ordered collection of
//! feature vectors and resolves one scalar training target.
//!
//! # Features
//!
//! - **Reader backends** — VASP, Quantum ESPRESSO, FHI-aims and a plain-text
//!   `prophet` format behind the common [`DftReader`] interface
//! - **Density transforms** — normalization, local-variance gating,
//!   block-averaged compression and strided downsampling
//! - **Feature ordering** — inputs are appended in configured order; the
//!   `structure` input locks the collection
//! - **Target resolution** — scalar properties, user property tables and
//!   locally corrected energies
//! - **Diagnostics** — Gaussian cube dumps of the density grid and of model
//!   outputs laid out on it
//!
//! # Quick Start
//!
//! ```
//! use dft_forge::{Backend, FunctionalParams, InputStep, Plan, TargetStep};
//!
//! let params = FunctionalParams::from_toml(
//!     r#"
//!     inputs = ["density", "structure"]
//!     output = "energy"
//!
//!     [density]
//!     sample_step = 2
//!     "#,
//! )?;
//!
//! let plan = Plan::resolve(&params, Backend::Qe)?;
//! assert_eq!(plan.inputs.len(), 2);
//! assert_eq!(plan.inputs[1], InputStep::Structure);
//! assert_eq!(plan.target, TargetStep::Energy);
//! # Ok::<(), dft_forge::AssembleError>(())
//! ```
//!
//! Building an example reads the files named in a [`FileMap`]:
//!
//! ```no_run
//! use dft_forge::{FileMap, FunctionalParams, System};
//!
//! let files = FileMap::new()
//!     .with("code", "vasp")
//!     .with("density", "run/CHGCAR")
//!     .with("structure", "run/POSCAR")
//!     .with("energy", "run/OUTCAR");
//! let params = FunctionalParams::new(&["density", "structure"], "energy");
//!
//! let system = System::build(&files, &params)?;
//! for feature in system.features() {
//!     println!("{}: {} values", feature.name, feature.values.len());
//! }
//! println!("target = {}", system.target());
//! # Ok::<(), dft_forge::AssembleError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — Reader backends, the [`DftReader`] interface and cube files
//! - [`System`] — Pipeline orchestration and the assembled example
//! - [`Plan`] — Configuration resolved into explicit pipeline steps

mod assemble;
mod model;

pub mod io;

pub use model::atom::Atom;
pub use model::density::{DensityField, TransformError, VarianceBounds};
pub use model::features::{FeatureCollection, FeatureRef, FeatureStore, LockedError};
pub use model::grid::{BOHR_IN_ANGSTROM, GridHeader};
pub use model::structure::{CorrectionError, ReferenceEnergies, Structure};
pub use model::types::{Element, ParseElementError};

pub use io::{Backend, DftReader, Reader};

pub use assemble::{
    DensityParams, DensityStep, Example, Feature, FileMap, FunctionalParams, InputStep,
    N_CONV_DISABLED, Plan, System, TargetStep,
};

pub use assemble::Error as AssembleError;
