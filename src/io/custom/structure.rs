use crate::io::error::Error;
use crate::model::atom::Atom;
use crate::model::structure::{ReferenceEnergies, Structure};
use crate::model::types::Element;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructureFile {
    train: Option<String>,
    lattice: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    atoms: Vec<AtomEntry>,
    #[serde(default)]
    formation_energies: ReferenceEnergies,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AtomEntry {
    element: Element,
    position: [f64; 3],
}

/// Parses the TOML structure format of the custom backend.
///
/// ```toml
/// train = "bulk"
/// lattice = [[5.43, 0, 0], [0, 5.43, 0], [0, 0, 5.43]]
///
/// [[atoms]]
/// element = "Si"
/// position = [0.0, 0.0, 0.0]
///
/// [formation_energies]
/// Si = -5.42
/// ```
pub fn parse(text: &str, path: &Path) -> Result<Structure, Error> {
    let file: StructureFile = toml::from_str(text).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Structure {
        atoms: file
            .atoms
            .into_iter()
            .map(|a| Atom::new(a.element, a.position))
            .collect(),
        lattice: file.lattice,
        train: file.train.filter(|t| !t.is_empty()),
        formation_energies: file.formation_energies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SI: &str = r#"
train = "bulk"
lattice = [[5.43, 0.0, 0.0], [0.0, 5.43, 0.0], [0.0, 0.0, 5.43]]

[[atoms]]
element = "Si"
position = [0.0, 0.0, 0.0]

[[atoms]]
element = "Si"
position = [1.3575, 1.3575, 1.3575]

[formation_energies]
Si = -5.42
"#;

    #[test]
    fn parses_all_sections() {
        let s = parse(SI, Path::new("si.toml")).expect("parse structure");
        assert_eq!(s.atom_count(), 2);
        assert_eq!(s.train.as_deref(), Some("bulk"));
        assert_eq!(s.formation_energies.get(&Element::Si), Some(&-5.42));
        assert!(s.is_periodic());
    }

    #[test]
    fn empty_train_is_ignored() {
        let s = parse("train = \"\"\n", Path::new("empty.toml")).unwrap();
        assert_eq!(s.train, None);
        assert_eq!(s.atom_count(), 0);
    }

    #[test]
    fn bad_element_is_a_toml_error() {
        let text = "[[atoms]]\nelement = \"Xx\"\nposition = [0, 0, 0]\n";
        let err = parse(text, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, Error::Toml { .. }));
    }
}
