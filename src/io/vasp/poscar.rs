use crate::io::{Format, error::Error, util};
use crate::model::atom::Atom;
use crate::model::grid::determinant;
use crate::model::structure::Structure;
use crate::model::types::Element;

/// Parses a POSCAR/CONTCAR block from the start of `lines`.
///
/// Returns the structure and the number of lines consumed, so that CHGCAR
/// parsing can continue with the grid section.
pub fn parse_block(lines: &[(usize, &str)], format: Format) -> Result<(Structure, usize), Error> {
    let line_at = |idx: usize, what: &str| {
        lines.get(idx).copied().ok_or_else(|| {
            let ln = lines.last().map(|(ln, _)| *ln).unwrap_or(0);
            Error::parse(format, ln, format!("file ended before {what}"))
        })
    };

    let (_, comment) = line_at(0, "the comment line")?;

    let (ln, scale_line) = line_at(1, "the scaling factor")?;
    let scale_token = scale_line
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::parse(format, ln, "missing scaling factor"))?;
    let scale = util::parse_f64(scale_token, format, ln, "scaling factor")?;

    let mut lattice = [[0.0; 3]; 3];
    for (axis, row) in lattice.iter_mut().enumerate() {
        let (ln, line) = line_at(2 + axis, "the lattice vectors")?;
        *row = util::parse_vec3(line, format, ln, "lattice vector")?;
    }

    let factor = if scale < 0.0 {
        let v0 = determinant(&lattice).abs();
        if v0 == 0.0 {
            return Err(Error::parse(format, ln, "lattice vectors are degenerate"));
        }
        (scale.abs() / v0).cbrt()
    } else {
        scale
    };
    let lattice = util::scale_matrix(lattice, factor);

    let mut cursor = 5;
    let (ln, line) = line_at(cursor, "the species line")?;
    let first_is_count = line
        .split_whitespace()
        .next()
        .is_some_and(|tok| tok.parse::<usize>().is_ok());

    let (symbols, (count_ln, count_line)) = if first_is_count {
        (comment.split_whitespace().collect::<Vec<_>>(), (ln, line))
    } else {
        cursor += 1;
        (
            line.split_whitespace().collect::<Vec<_>>(),
            line_at(cursor, "the species counts")?,
        )
    };
    cursor += 1;

    let counts = count_line
        .split_whitespace()
        .map(|tok| util::parse_usize(tok, format, count_ln, "species count"))
        .collect::<Result<Vec<_>, _>>()?;
    if symbols.len() < counts.len() {
        return Err(Error::parse(
            format,
            count_ln,
            "species symbols are missing (VASP 4 files need them in the comment line)",
        ));
    }
    let species = symbols
        .iter()
        .take(counts.len())
        .map(|sym| {
            util::guess_element_symbol(sym).ok_or_else(|| {
                Error::parse(format, count_ln, format!("unknown species symbol '{sym}'"))
            })
        })
        .collect::<Result<Vec<Element>, _>>()?;

    let (_, mut mode) = line_at(cursor, "the coordinate mode")?;
    if mode.trim_start().starts_with(['S', 's']) {
        cursor += 1;
        mode = line_at(cursor, "the coordinate mode")?.1;
    }
    let cartesian = mode.trim_start().starts_with(['C', 'c', 'K', 'k']);
    cursor += 1;

    let mut atoms = Vec::new();
    for (element, count) in species.iter().zip(&counts) {
        for _ in 0..*count {
            let (ln, line) = line_at(cursor, "all atom positions were given")?;
            let coords = util::parse_vec3(line, format, ln, "atom position")?;
            let position = if cartesian {
                coords.map(|v| v * factor)
            } else {
                util::frac_to_cart(coords, &lattice)
            };
            atoms.push(Atom::new(*element, position));
            cursor += 1;
        }
    }

    let structure = Structure {
        atoms,
        lattice: Some(lattice),
        ..Structure::default()
    };
    Ok((structure, cursor))
}

pub fn parse(text: &str) -> Result<Structure, Error> {
    let lines: Vec<_> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
    parse_block(&lines, Format::Poscar).map(|(structure, _)| structure)
}

#[cfg(test)]
pub(super) const SI_POSCAR: &str = "\
Si2 test cell
   1.0
     5.43 0.00 0.00
     0.00 5.43 0.00
     0.00 0.00 5.43
   Si
   2
Direct
  0.00 0.00 0.00
  0.25 0.25 0.25
";
