//! User-defined property tables.
//!
//! Each non-blank, non-comment line of the table is one property vector of
//! whitespace-separated reals. Property `N` is the `N`-th such line.

use super::{Format, error::Error, util};
use std::path::Path;

pub fn read_user_property(index: usize, path: &Path) -> Result<Vec<f64>, Error> {
    let text = util::read_text(path)?;
    parse_user_property(&text, index)
}

pub fn parse_user_property(text: &str, index: usize) -> Result<Vec<f64>, Error> {
    let rows: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let (line_no, row) = index
        .checked_sub(1)
        .and_then(|i| rows.get(i))
        .ok_or(Error::UserIndex {
            index,
            available: rows.len(),
        })?;

    row.split_whitespace()
        .map(|tok| util::parse_f64(tok, Format::UserTable, *line_no, "user property value"))
        .collect()
}
