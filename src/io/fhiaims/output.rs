use crate::io::util::{last_line_containing, number_after};

const PROPERTIES: [(&str, &str); 2] = [
    ("energy", "| Total energy of the DFT / Hartree-Fock s.c.f. calculation"),
    ("fermi", "| Chemical potential (Fermi level)"),
];

pub fn is_known(name: &str) -> bool {
    PROPERTIES.iter().any(|(n, _)| *n == name)
}

/// Looks up `name` (in eV) in FHI-aims standard output.
pub fn property(text: &str, name: &str) -> Option<f64> {
    let (_, needle) = PROPERTIES.iter().find(|(n, _)| *n == name)?;
    let (_, line) = last_line_containing(text, needle)?;
    number_after(line, ":")
}
