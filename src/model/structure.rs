use super::atom::Atom;
use super::types::Element;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-element reference energies (eV per atom) used by the local-energy
/// correction.
pub type ReferenceEnergies = BTreeMap<Element, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectionError {
    #[error("no reference energy for element {0} present in the structure")]
    MissingReference(Element),
}

/// Atomic configuration read from a DFT calculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    /// Lattice vectors (rows) in Ångströms, for periodic systems.
    pub lattice: Option<[[f64; 3]; 3]>,
    /// Training-set tag recorded in the structure file, if any.
    pub train: Option<String>,
    /// Structure-local reference energies; they take precedence over any
    /// globally configured references.
    pub formation_energies: ReferenceEnergies,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.lattice.is_some()
    }

    /// Number of atoms of each element.
    pub fn composition(&self) -> BTreeMap<Element, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element).or_insert(0) += 1;
        }
        counts
    }

    /// Local training target for `energy`: the energy referenced to the
    /// per-element energies, `E - Σ μ(element)` over all atoms.
    ///
    /// References found on the structure override entries of `global`.
    pub fn local_target(
        &self,
        global: &ReferenceEnergies,
        energy: f64,
    ) -> Result<f64, CorrectionError> {
        let mut corrected = energy;
        for (element, count) in self.composition() {
            let mu = self
                .formation_energies
                .get(&element)
                .or_else(|| global.get(&element))
                .ok_or(CorrectionError::MissingReference(element))?;
            corrected -= *mu * count as f64;
        }
        Ok(corrected)
    }
}
