use super::poscar;
use crate::io::{Format, error::Error, util};
use crate::model::density::DensityField;
use crate::model::grid::{BOHR_IN_ANGSTROM, GridHeader, determinant};
use crate::model::structure::Structure;

/// Parses the first (total) density block of a CHGCAR/CHG file.
///
/// VASP stores `ρ·V` with the first axis varying fastest; the returned field
/// holds `ρ` in electrons per bohr³ in cube order.
pub fn parse(text: &str) -> Result<(DensityField, Structure), Error> {
    let lines: Vec<_> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
    let (structure, mut cursor) = poscar::parse_block(&lines, Format::Chgcar)?;

    while lines.get(cursor).is_some_and(|(_, l)| l.trim().is_empty()) {
        cursor += 1;
    }
    let (ln, dims) = lines
        .get(cursor)
        .copied()
        .ok_or_else(|| Error::parse(Format::Chgcar, 0, "missing grid dimensions"))?;
    let shape = dims
        .split_whitespace()
        .map(|tok| util::parse_usize(tok, Format::Chgcar, ln, "grid dimension"))
        .collect::<Result<Vec<_>, _>>()?;
    let shape: [usize; 3] = shape
        .try_into()
        .map_err(|_| Error::parse(Format::Chgcar, ln, "grid dimensions must be three integers"))?;
    cursor += 1;

    let expected = GridHeader::checked_point_count(shape)
        .ok_or_else(|| Error::parse(Format::Chgcar, ln, "grid too large"))?;
    let mut raw = Vec::new();
    'lines: for (ln, line) in &lines[cursor..] {
        for tok in line.split_whitespace() {
            if raw.len() == expected {
                break 'lines;
            }
            raw.push(util::parse_f64(tok, Format::Chgcar, *ln, "grid value")?);
        }
    }
    if raw.len() != expected {
        return Err(Error::parse(
            Format::Chgcar,
            lines.len(),
            format!("expected {expected} grid values, found {}", raw.len()),
        ));
    }

    let lattice = structure
        .lattice
        .ok_or_else(|| Error::parse(Format::Chgcar, 1, "missing lattice"))?;
    let volume_a3 = determinant(&lattice).abs();
    let to_per_bohr3 = BOHR_IN_ANGSTROM.powi(3) / volume_a3;

    let header = GridHeader::new(shape, util::scale_matrix(lattice, util::ANGSTROM_TO_BOHR));
    let [nx, ny, _] = shape;
    let mut values = vec![0.0; expected];
    for (flat, value) in raw.into_iter().enumerate() {
        let i = flat % nx;
        let j = (flat / nx) % ny;
        let k = flat / (nx * ny);
        values[header.index(i, j, k)] = value * to_per_bohr3;
    }

    let density = DensityField::new(header, values)
        .map_err(|e| Error::parse(Format::Chgcar, ln, e.to_string()))?;
    Ok((density, structure))
}
