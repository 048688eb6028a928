use crate::io::util::{RYDBERG_IN_EV, last_line_containing, number_after};
use crate::model::grid::BOHR_IN_ANGSTROM;

pub fn is_known(name: &str) -> bool {
    matches!(name, "energy" | "fermi" | "volume")
}

/// Looks up `name` in pw.x standard output. Energies are returned in eV and
/// the cell volume in Å³.
pub fn property(text: &str, name: &str) -> Option<f64> {
    match name {
        "energy" => {
            let (_, line) = text
                .lines()
                .enumerate()
                .filter(|(_, l)| l.trim_start().starts_with('!') && l.contains("total energy"))
                .last()?;
            number_after(line, "=").map(|ry| ry * RYDBERG_IN_EV)
        }
        "fermi" => {
            let (_, line) = last_line_containing(text, "the Fermi energy is")?;
            number_after(line, "is")
        }
        "volume" => {
            let (_, line) = last_line_containing(text, "unit-cell volume")?;
            number_after(line, "=").map(|v| v * BOHR_IN_ANGSTROM.powi(3))
        }
        _ => None,
    }
}
