use crate::io::{Format, error::Error, util};
use crate::model::atom::Atom;
use crate::model::structure::Structure;

const FORMAT: Format = Format::AimsGeometry;

/// Parses a `geometry.in` file. Fractional atoms require all three lattice
/// vectors, which may appear anywhere in the file.
pub fn parse(text: &str) -> Result<Structure, Error> {
    let mut vectors = Vec::new();
    let mut pending = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let ln = i + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((keyword, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        match keyword {
            "lattice_vector" => vectors.push(util::parse_vec3(rest, FORMAT, ln, "lattice vector")?),
            "atom" | "atom_frac" => {
                let tokens: Vec<_> = rest.split_whitespace().collect();
                if tokens.len() < 4 {
                    return Err(Error::parse(FORMAT, ln, "atom line needs a position and species"));
                }
                let coords = tokens[..3].join(" ");
                let position = util::parse_vec3(&coords, FORMAT, ln, "atom position")?;
                let element = util::guess_element_symbol(tokens[3]).ok_or_else(|| {
                    Error::parse(FORMAT, ln, format!("unknown species '{}'", tokens[3]))
                })?;
                pending.push((ln, keyword == "atom_frac", element, position));
            }
            _ => {}
        }
    }

    let lattice: Option<[[f64; 3]; 3]> = match vectors.len() {
        0 => None,
        3 => Some([vectors[0], vectors[1], vectors[2]]),
        n => return Err(Error::parse(FORMAT, 0, format!("expected 3 lattice vectors, found {n}"))),
    };

    let mut atoms = Vec::with_capacity(pending.len());
    for (ln, fractional, element, position) in pending {
        let position = if fractional {
            let lattice = lattice
                .as_ref()
                .ok_or_else(|| Error::parse(FORMAT, ln, "atom_frac requires lattice vectors"))?;
            util::frac_to_cart(position, lattice)
        } else {
            position
        };
        atoms.push(Atom::new(element, position));
    }

    Ok(Structure {
        atoms,
        lattice,
        ..Structure::default()
    })
}
