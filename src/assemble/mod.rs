//! Assembly of training examples from DFT outputs.
//!
//! [`System::build`] selects a reader backend from the [`FileMap`], resolves
//! the [`FunctionalParams`] into a [`Plan`], runs every input step in order
//! and finally resolves the training target.

mod config;
mod error;
mod files;
mod plan;
mod system;

pub use config::{DensityParams, FunctionalParams, N_CONV_DISABLED};
pub use error::Error;
pub use files::FileMap;
pub use plan::{DensityStep, InputStep, Plan, TargetStep};
pub use system::{Example, Feature, System};
