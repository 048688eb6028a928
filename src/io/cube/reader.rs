use crate::io::{Format, error::Error, util};
use crate::model::atom::Atom;
use crate::model::density::DensityField;
use crate::model::grid::{BOHR_IN_ANGSTROM, GridHeader};
use crate::model::types::Element;

/// Contents of a cube file.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeData {
    /// First comment line.
    pub title: String,
    /// Second comment line.
    pub comment: String,
    pub header: GridHeader,
    /// Atoms listed in the header, positions in Ångströms.
    pub atoms: Vec<Atom>,
    pub values: Vec<f64>,
}

impl CubeData {
    /// The `train=<tag>` token of the title line, if present.
    pub fn train_tag(&self) -> Option<&str> {
        self.title
            .split_whitespace()
            .find_map(|tok| tok.strip_prefix("train="))
            .filter(|tag| !tag.is_empty())
    }

    pub fn into_density(self) -> Result<DensityField, Error> {
        DensityField::new(self.header, self.values)
            .map_err(|e| Error::parse(Format::Cube, 0, e.to_string()))
    }
}

pub fn parse(text: &str) -> Result<CubeData, Error> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut next = |what: &str| {
        lines
            .next()
            .ok_or_else(|| Error::parse(Format::Cube, 0, format!("file ended before {what}")))
    };

    let (_, title) = next("the title line")?;
    let (_, comment) = next("the comment line")?;

    let (ln, counts) = next("the atom count line")?;
    let tokens: Vec<_> = counts.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::parse(
            Format::Cube,
            ln,
            "atom count line must hold the atom count and origin",
        ));
    }
    let natoms = parse_i64(tokens[0], ln, "atom count")?;
    let mut origin = [
        util::parse_f64(tokens[1], Format::Cube, ln, "origin")?,
        util::parse_f64(tokens[2], Format::Cube, ln, "origin")?,
        util::parse_f64(tokens[3], Format::Cube, ln, "origin")?,
    ];

    let mut shape = [0usize; 3];
    let mut voxels = [[0.0; 3]; 3];
    let mut angstrom = false;
    for axis in 0..3 {
        let (ln, line) = next("the grid axes")?;
        let (count, rest) = split_first_token(line)
            .ok_or_else(|| Error::parse(Format::Cube, ln, "empty grid axis line"))?;
        let n = parse_i64(count, ln, "grid point count")?;
        if n == 0 {
            return Err(Error::parse(Format::Cube, ln, "grid axis has no points"));
        }
        if axis == 0 && n < 0 {
            angstrom = true;
        }
        shape[axis] = n.unsigned_abs() as usize;
        voxels[axis] = util::parse_vec3(rest, Format::Cube, ln, "voxel vector")?;
    }

    if angstrom {
        voxels = util::scale_matrix(voxels, util::ANGSTROM_TO_BOHR);
        origin = origin.map(|v| v * util::ANGSTROM_TO_BOHR);
    }
    let to_angstrom = if angstrom { 1.0 } else { BOHR_IN_ANGSTROM };

    let mut atoms = Vec::new();
    for _ in 0..natoms.unsigned_abs() {
        let (ln, line) = next("the atom block")?;
        let tokens: Vec<_> = line.split_whitespace().collect();
        if tokens.len() < 5 {
            return Err(Error::parse(Format::Cube, ln, "invalid atom line"));
        }
        let z = parse_i64(tokens[0], ln, "atomic number")?;
        let element = u8::try_from(z)
            .ok()
            .and_then(Element::from_atomic_number)
            .ok_or_else(|| Error::parse(Format::Cube, ln, format!("unknown atomic number {z}")))?;
        let position = util::parse_vec3(&tokens[2..].join(" "), Format::Cube, ln, "atom position")?;
        atoms.push(Atom::new(element, position.map(|v| v * to_angstrom)));
    }

    if natoms < 0 {
        next("the orbital index line")?;
    }

    let expected = GridHeader::checked_point_count(shape)
        .ok_or_else(|| Error::parse(Format::Cube, 6, "grid too large"))?;
    let header = GridHeader::from_voxels(shape, voxels, origin);
    let mut values = Vec::new();
    for (ln, line) in lines {
        for tok in line.split_whitespace() {
            values.push(util::parse_f64(tok, Format::Cube, ln, "grid value")?);
        }
    }

    if values.len() != expected {
        return Err(Error::parse(
            Format::Cube,
            text.lines().count(),
            format!("expected {expected} grid values, found {}", values.len()),
        ));
    }

    Ok(CubeData {
        title: title.trim().to_string(),
        comment: comment.trim().to_string(),
        header,
        atoms,
        values,
    })
}

fn parse_i64(token: &str, line: usize, what: &str) -> Result<i64, Error> {
    token
        .parse::<i64>()
        .map_err(|_| Error::parse(Format::Cube, line, format!("invalid {what} '{token}'")))
}

fn split_first_token(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    let end = line.find(char::is_whitespace).unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    Some((&line[..end], &line[end..]))
}
