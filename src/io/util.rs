use super::{Format, error::Error};
use crate::model::grid::BOHR_IN_ANGSTROM;
use crate::model::types::Element;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Hartree energy in eV.
pub const HARTREE_IN_EV: f64 = 27.211_386_245_988;
/// Rydberg energy in eV.
pub const RYDBERG_IN_EV: f64 = HARTREE_IN_EV / 2.0;
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_IN_ANGSTROM;

/// File contents read during one pipeline run, keyed by path.
///
/// Several properties are usually pulled from the same output file, so each
/// file is read from disk at most once per reader.
#[derive(Debug, Default)]
pub struct TextCache {
    files: HashMap<PathBuf, String>,
}

impl TextCache {
    pub fn load(&mut self, path: &Path) -> Result<&str, Error> {
        if !self.files.contains_key(path) {
            let text = read_text(path)?;
            self.files.insert(path.to_path_buf(), text);
        }
        Ok(self.files[path].as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub fn read_text(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Infers an element from an atom label such as `Fe`, `fe2`, `O_h` or `Si_pv`.
pub fn guess_element_symbol(label: &str) -> Option<Element> {
    let letters: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }

    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    if let Some(second) = chars.next() {
        let two = format!("{first}{}", second.to_ascii_lowercase());
        if let Ok(el) = two.parse() {
            return Some(el);
        }
    }
    first.to_string().parse().ok()
}

pub fn parse_f64(token: &str, format: Format, line: usize, what: &str) -> Result<f64, Error> {
    token
        .trim()
        .replace(['d', 'D'], "e")
        .parse::<f64>()
        .map_err(|_| Error::parse(format, line, format!("invalid {what} '{token}'")))
}

pub fn parse_usize(token: &str, format: Format, line: usize, what: &str) -> Result<usize, Error> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::parse(format, line, format!("invalid {what} '{token}'")))
}

/// Parses the first three tokens of `line` as a vector.
pub fn parse_vec3(
    line: &str,
    format: Format,
    line_no: usize,
    what: &str,
) -> Result<[f64; 3], Error> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(Error::parse(
            format,
            line_no,
            format!("{what} must have three components"),
        ));
    }
    Ok([
        parse_f64(tokens[0], format, line_no, what)?,
        parse_f64(tokens[1], format, line_no, what)?,
        parse_f64(tokens[2], format, line_no, what)?,
    ])
}

/// Returns the 1-based number and content of the last line containing `needle`.
pub fn last_line_containing<'a>(text: &'a str, needle: &str) -> Option<(usize, &'a str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.contains(needle))
        .last()
        .map(|(i, line)| (i + 1, line))
}

/// Returns the first real number that follows `marker` on `line`.
pub fn number_after(line: &str, marker: &str) -> Option<f64> {
    let (_, rest) = line.split_once(marker)?;
    rest.split_whitespace().find_map(|tok| tok.parse::<f64>().ok())
}

/// Parses a file holding exactly one real number.
pub fn parse_scalar(text: &str) -> Result<f64, Error> {
    let mut tokens = text.split_whitespace();
    let value = tokens
        .next()
        .ok_or_else(|| Error::parse(Format::Scalar, 1, "file is empty"))?;
    let value = parse_f64(value, Format::Scalar, 1, "scalar value")?;
    if tokens.next().is_some() {
        return Err(Error::parse(
            Format::Scalar,
            1,
            "expected exactly one value in scalar file",
        ));
    }
    Ok(value)
}

pub fn frac_to_cart(frac: [f64; 3], lattice: &[[f64; 3]; 3]) -> [f64; 3] {
    let mut cart = [0.0; 3];
    for (axis, f) in frac.iter().enumerate() {
        for k in 0..3 {
            cart[k] += f * lattice[axis][k];
        }
    }
    cart
}

pub fn scale_matrix(m: [[f64; 3]; 3], factor: f64) -> [[f64; 3]; 3] {
    m.map(|row| row.map(|v| v * factor))
}

/// Formats a value the way C's `%g` does with the default precision of six
/// significant digits.
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let mantissa = strip_fraction_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_elements_from_labels() {
        assert_eq!(guess_element_symbol("Fe"), Some(Element::Fe));
        assert_eq!(guess_element_symbol("fe2"), Some(Element::Fe));
        assert_eq!(guess_element_symbol("Si_pv"), Some(Element::Si));
        assert_eq!(guess_element_symbol("O1"), Some(Element::O));
        assert_eq!(guess_element_symbol("Cx"), Some(Element::C));
        assert_eq!(guess_element_symbol("12"), None);
    }

    #[test]
    fn parses_fortran_exponents() {
        let v = parse_f64("1.5D-02", Format::Scalar, 1, "value").unwrap();
        assert!((v - 0.015).abs() < 1e-15);
    }

    #[test]
    fn scalar_files_hold_one_value() {
        assert_eq!(parse_scalar("  -3.5\n").unwrap(), -3.5);
        assert!(parse_scalar("").is_err());
        assert!(parse_scalar("1.0 2.0").is_err());
    }

    #[test]
    fn finds_number_after_marker() {
        let line = "  free  energy   TOTEN  =       -10.84370112 eV";
        assert_eq!(number_after(line, "="), Some(-10.84370112));
        assert_eq!(number_after(line, "missing"), None);
    }

    #[test]
    fn last_line_wins() {
        let text = "E = 1\nother\nE = 2\n";
        assert_eq!(last_line_containing(text, "E ="), Some((3, "E = 2")));
    }

    #[test]
    fn format_general_matches_printf() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(1.0), "1");
        assert_eq!(format_general(0.5), "0.5");
        assert_eq!(format_general(-2.25), "-2.25");
        assert_eq!(format_general(123456.0), "123456");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001234), "1.234e-05");
        assert_eq!(format_general(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn fractional_coordinates_map_through_lattice() {
        let lattice = [[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [1.0, 0.0, 6.0]];
        let cart = frac_to_cart([0.5, 0.25, 0.5], &lattice);
        assert_eq!(cart, [1.5, 1.0, 3.0]);
    }
}
