//! Resolution of [`FunctionalParams`] into an explicit pipeline plan.
//!
//! Everything that can be checked without touching a file is checked here,
//! so a [`Plan`] that resolves is guaranteed to be well formed.

use super::config::{FunctionalParams, N_CONV_DISABLED};
use super::error::Error;
use crate::io::Backend;
use crate::model::density::VarianceBounds;
use crate::model::structure::ReferenceEnergies;
use crate::model::types::Element;

pub const DENSITY: &str = "density";
pub const DENSITY_SQUARED: &str = "density^2";
pub const STRUCTURE: &str = "structure";
pub const RANDOM: &str = "random";
pub const USER: &str = "user";
pub const ENERGY: &str = "energy";
pub const GW_GAP: &str = "gw_gap";

/// Parameters of the density transform chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityStep {
    pub stride: usize,
    pub normalize: Option<f64>,
    pub bounds: VarianceBounds,
    /// Compression size, present only when compression is enabled.
    pub compress: Option<usize>,
    pub intensive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputStep {
    Density(DensityStep),
    /// Recognized but contributes nothing.
    DensitySquared,
    User { name: String, index: usize },
    Structure,
    Random,
    Scalar { name: String },
}

impl InputStep {
    fn resolve(name: &str, params: &FunctionalParams) -> Result<Self, Error> {
        Ok(match name {
            DENSITY => {
                let d = &params.density;
                if d.sample_step == 0 {
                    return Err(Error::configuration("density sample_step must be at least 1"));
                }
                if d.n_conv == 0 {
                    return Err(Error::configuration("density n_conv must be at least 1"));
                }
                InputStep::Density(DensityStep {
                    stride: d.sample_step,
                    normalize: d.normalize,
                    bounds: d.var_bounds,
                    compress: (d.n_conv < N_CONV_DISABLED).then_some(d.n_conv),
                    intensive: params.output_is_intensive,
                })
            }
            DENSITY_SQUARED => InputStep::DensitySquared,
            STRUCTURE => InputStep::Structure,
            RANDOM => InputStep::Random,
            _ if name.starts_with(USER) => InputStep::User {
                name: name.to_string(),
                index: user_index(name)?,
            },
            _ => InputStep::Scalar {
                name: name.to_string(),
            },
        })
    }

    /// Whether the step adds a vector to the feature collection.
    pub fn appends(&self) -> bool {
        !matches!(self, InputStep::DensitySquared | InputStep::Structure)
    }

    pub fn name(&self) -> &str {
        match self {
            InputStep::Density(_) => DENSITY,
            InputStep::DensitySquared => DENSITY_SQUARED,
            InputStep::User { name, .. } | InputStep::Scalar { name } => name,
            InputStep::Structure => STRUCTURE,
            InputStep::Random => RANDOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetStep {
    GwGap,
    /// Element 0 of user property `index`.
    User { index: usize },
    /// The generic `user` property of the custom backend.
    CustomUser,
    /// The energy, locally corrected when reference energies are available.
    Energy,
    Scalar { name: String },
}

impl TargetStep {
    fn resolve(name: &str, backend: Backend) -> Result<Self, Error> {
        Ok(match name {
            GW_GAP => TargetStep::GwGap,
            ENERGY => TargetStep::Energy,
            _ if name.starts_with(USER) => match backend {
                Backend::Custom => TargetStep::CustomUser,
                _ => TargetStep::User {
                    index: user_index(name)?,
                },
            },
            _ => TargetStep::Scalar {
                name: name.to_string(),
            },
        })
    }
}

/// The resolved pipeline: input steps in order, then the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub inputs: Vec<InputStep>,
    pub target: TargetStep,
    pub formation_energies: ReferenceEnergies,
    pub seed: Option<u64>,
}

impl Plan {
    pub fn resolve(params: &FunctionalParams, backend: Backend) -> Result<Self, Error> {
        if params.inputs.is_empty() {
            return Err(Error::configuration("at least one input is required"));
        }

        let inputs = params
            .inputs
            .iter()
            .map(|name| InputStep::resolve(name, params))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(lock) = inputs.iter().position(|s| *s == InputStep::Structure) {
            if let Some(late) = inputs[lock..].iter().find(|s| s.appends()) {
                return Err(Error::configuration(format!(
                    "input '{}' appears after 'structure', which locks the feature collection",
                    late.name()
                )));
            }
        }

        let formation_energies = params
            .formation_energies
            .iter()
            .map(|(symbol, mu)| {
                symbol
                    .parse::<Element>()
                    .map(|el| (el, *mu))
                    .map_err(|e| Error::configuration(format!("formation_energies: {e}")))
            })
            .collect::<Result<ReferenceEnergies, _>>()?;

        Ok(Self {
            inputs,
            target: TargetStep::resolve(&params.output, backend)?,
            formation_energies,
            seed: params.seed,
        })
    }
}

fn user_index(name: &str) -> Result<usize, Error> {
    let suffix = &name[USER.len()..];
    match suffix.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(Error::configuration(format!(
            "'{name}' must be 'user' followed by a positive property index"
        ))),
    }
}
