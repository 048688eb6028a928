use crate::io::util::{last_line_containing, number_after};

/// Properties available from an OUTCAR, with the line marker and the token
/// preceding the value.
const PROPERTIES: [(&str, &str, &str); 3] = [
    ("energy", "TOTEN", "="),
    ("fermi", "E-fermi", ":"),
    ("volume", "volume of cell", ":"),
];

pub fn is_known(name: &str) -> bool {
    PROPERTIES.iter().any(|(n, _, _)| *n == name)
}

/// Looks up `name` in the OUTCAR text. Later ionic steps override earlier
/// ones, so the last matching line is used.
pub fn property(text: &str, name: &str) -> Option<f64> {
    let (_, needle, marker) = PROPERTIES.iter().find(|(n, _, _)| *n == name)?;
    let (_, line) = last_line_containing(text, needle)?;
    number_after(line, marker)
}
