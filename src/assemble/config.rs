use super::error::Error;
use crate::model::density::VarianceBounds;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Convergence-matrix sizes at or above this value disable compression.
pub const N_CONV_DISABLED: usize = 10;

/// Which quantities feed the model and which one it is trained on.
///
/// Loaded from TOML:
///
/// ```toml
/// inputs = ["density", "structure"]
/// output = "energy"
/// output_is_intensive = false
/// seed = 7
///
/// [density]
/// sample_step = 2
/// normalize = 8.0
/// var_bounds = { lower = 0.0, upper = 1e3 }
/// n_conv = 10
///
/// [formation_energies]
/// Si = -5.42
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionalParams {
    /// Input names, processed in order.
    pub inputs: Vec<String>,
    /// Name of the training target.
    pub output: String,
    #[serde(default)]
    pub output_is_intensive: bool,
    /// Seed for the `random` input; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub density: DensityParams,
    /// Per-element reference energies keyed by element symbol. Symbols are
    /// validated when the pipeline plan is resolved.
    #[serde(default)]
    pub formation_energies: BTreeMap<String, f64>,
}

impl FunctionalParams {
    pub fn new(inputs: &[&str], output: &str) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
            output_is_intensive: false,
            seed: None,
            density: DensityParams::default(),
            formation_energies: BTreeMap::new(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DensityParams {
    #[serde(default = "default_sample_step")]
    pub sample_step: usize,
    /// Target integral for normalization; disabled when absent.
    #[serde(default)]
    pub normalize: Option<f64>,
    #[serde(default)]
    pub var_bounds: VarianceBounds,
    #[serde(default = "default_n_conv")]
    pub n_conv: usize,
}

fn default_sample_step() -> usize {
    1
}
fn default_n_conv() -> usize {
    N_CONV_DISABLED
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            sample_step: default_sample_step(),
            normalize: None,
            var_bounds: VarianceBounds::default(),
            n_conv: default_n_conv(),
        }
    }
}
