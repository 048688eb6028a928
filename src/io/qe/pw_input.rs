use crate::io::util;
use crate::io::{Format, error::Error};
use crate::model::atom::Atom;
use crate::model::grid::BOHR_IN_ANGSTROM;
use crate::model::structure::Structure;
use std::collections::HashMap;

const FORMAT: Format = Format::PwInput;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Units {
    Alat,
    Bohr,
    Angstrom,
    Crystal,
}

impl Units {
    fn from_card(line: &str, ln: usize, default: Units) -> Result<Units, Error> {
        let option = line
            .split_whitespace()
            .nth(1)
            .map(|tok| tok.trim_matches(|c| matches!(c, '{' | '}' | '(' | ')')));
        match option.map(str::to_ascii_lowercase).as_deref() {
            None => Ok(default),
            Some("alat") => Ok(Units::Alat),
            Some("bohr") => Ok(Units::Bohr),
            Some("angstrom") => Ok(Units::Angstrom),
            Some("crystal") => Ok(Units::Crystal),
            Some(other) => Err(Error::parse(FORMAT, ln, format!("unsupported units '{other}'"))),
        }
    }
}

/// Parses the structure of a pw.x input file.
///
/// Only `ibrav = 0` cells (explicit `CELL_PARAMETERS`) carry a lattice; other
/// Bravais lattices are read as non-periodic unless positions are given in
/// crystal coordinates, which is then an error.
pub fn parse(text: &str) -> Result<Structure, Error> {
    let lines: Vec<_> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
    let namelist = namelist_values(&lines);

    let nat = namelist
        .get("nat")
        .ok_or_else(|| Error::parse(FORMAT, 0, "missing 'nat' in &SYSTEM"))?;
    let nat = util::parse_usize(nat, FORMAT, 0, "nat")?;

    // Lattice parameter in Ångströms, when one is given.
    let alat = match (namelist.get("celldm(1)"), namelist.get("a")) {
        (Some(celldm), _) => {
            Some(util::parse_f64(celldm, FORMAT, 0, "celldm(1)")? * BOHR_IN_ANGSTROM)
        }
        (None, Some(a)) => Some(util::parse_f64(a, FORMAT, 0, "A")?),
        (None, None) => None,
    };
    let alat_or_err = |ln: usize| {
        alat.ok_or_else(|| Error::parse(FORMAT, ln, "alat units require celldm(1) or A"))
    };

    let mut lattice = None;
    if let Some(pos) = find_card(&lines, "CELL_PARAMETERS") {
        let (ln, card) = lines[pos];
        let default = if alat.is_some() { Units::Alat } else { Units::Bohr };
        let factor = match Units::from_card(card, ln, default)? {
            Units::Alat => alat_or_err(ln)?,
            Units::Bohr => BOHR_IN_ANGSTROM,
            Units::Angstrom => 1.0,
            Units::Crystal => {
                return Err(Error::parse(FORMAT, ln, "CELL_PARAMETERS cannot be crystal"));
            }
        };
        let rows = data_lines(&lines[pos + 1..], 3, ln, "lattice vectors")?;
        let mut cell = [[0.0; 3]; 3];
        for (row, (ln, line)) in cell.iter_mut().zip(rows) {
            *row = util::parse_vec3(line, FORMAT, ln, "lattice vector")?;
        }
        lattice = Some(util::scale_matrix(cell, factor));
    }

    let pos = find_card(&lines, "ATOMIC_POSITIONS")
        .ok_or_else(|| Error::parse(FORMAT, 0, "missing ATOMIC_POSITIONS card"))?;
    let (card_ln, card) = lines[pos];
    let units = Units::from_card(card, card_ln, Units::Alat)?;
    let mut atoms = Vec::new();
    for (ln, line) in data_lines(&lines[pos + 1..], nat, card_ln, "atomic positions")? {
        let (label, rest) = line
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::parse(FORMAT, ln, "atom line needs a label and position"))?;
        let element = util::guess_element_symbol(label)
            .ok_or_else(|| Error::parse(FORMAT, ln, format!("unknown species '{label}'")))?;
        let raw = util::parse_vec3(rest, FORMAT, ln, "atomic position")?;
        let position = match units {
            Units::Angstrom => raw,
            Units::Bohr => raw.map(|v| v * BOHR_IN_ANGSTROM),
            Units::Alat => {
                let a = alat_or_err(ln)?;
                raw.map(|v| v * a)
            }
            Units::Crystal => {
                let lattice = lattice.as_ref().ok_or_else(|| {
                    Error::parse(FORMAT, ln, "crystal positions require CELL_PARAMETERS")
                })?;
                util::frac_to_cart(raw, lattice)
            }
        };
        atoms.push(Atom::new(element, position));
    }

    Ok(Structure {
        atoms,
        lattice,
        ..Structure::default()
    })
}

/// Collects `key = value` pairs from the namelists, with lowercased keys.
fn namelist_values<'a>(lines: &[(usize, &'a str)]) -> HashMap<String, &'a str> {
    let mut values = HashMap::new();
    let mut inside = false;
    for (_, line) in lines {
        let line = line.split('!').next().unwrap_or_default().trim();
        if line.starts_with('&') {
            inside = true;
            continue;
        }
        if line == "/" {
            inside = false;
            continue;
        }
        if !inside {
            continue;
        }
        for assignment in line.split(',') {
            if let Some((key, value)) = assignment.split_once('=') {
                let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
                values.insert(key.trim().to_ascii_lowercase(), value);
            }
        }
    }
    values
}

fn find_card(lines: &[(usize, &str)], name: &str) -> Option<usize> {
    lines.iter().position(|(_, line)| {
        line.split_whitespace()
            .next()
            .is_some_and(|tok| tok.eq_ignore_ascii_case(name))
    })
}

/// Takes the next `count` non-blank, non-comment lines.
fn data_lines<'a>(
    lines: &[(usize, &'a str)],
    count: usize,
    card_ln: usize,
    what: &str,
) -> Result<Vec<(usize, &'a str)>, Error> {
    let rows: Vec<_> = lines
        .iter()
        .copied()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('!') && !l.starts_with('#')
        })
        .take(count)
        .collect();
    if rows.len() < count {
        return Err(Error::parse(
            FORMAT,
            card_ln,
            format!("expected {count} lines of {what}, found {}", rows.len()),
        ));
    }
    Ok(rows)
}
