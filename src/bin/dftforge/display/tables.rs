use std::io::{self, Write};

use dft_forge::{Feature, System};

use crate::util::text::{number, truncate};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();
const MAX_ROWS: usize = 15;

pub fn print_example_summary(system: &System, code: &str) {
    let mut out = io::stderr().lock();

    let mut rows = vec![
        ("Code", code.to_string()),
        ("Training Set", system.train().to_string()),
        ("Features", system.feature_count().to_string()),
        ("Target", number(system.target())),
        ("Prefactor", number(system.prefactor())),
        ("Locked", if system.is_locked() { "yes" } else { "no" }.to_string()),
    ];

    if let Some(density) = system.density() {
        let [nx, ny, nz] = density.shape();
        rows.push(("Grid", format!("{nx} × {ny} × {nz}")));
        rows.push(("Cell (bohr³)", number(density.volume())));
    }
    if !system.structure().atoms.is_empty() {
        rows.push(("Atoms", system.structure().atom_count().to_string()));
    }

    print_kv_table(&mut out, "Example Summary", &rows);
}

pub fn print_feature_table(system: &System) {
    let features: Vec<Feature<'_>> = system.features().collect();
    if features.is_empty() {
        return;
    }
    let mut out = io::stderr().lock();

    let name_w = 12usize;
    let len_w = 8usize;
    let sep_overhead = 6;
    let range_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + len_w + sep_overhead);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{INDENT}{left}{}{mid}{}{mid}{}{right}",
            "─".repeat(name_w + 2),
            "─".repeat(len_w + 2),
            "─".repeat(range_w + 2)
        )
    };

    let _ = writeln!(out, "{INDENT}┌─ Features ─┐");
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{INDENT}│ {:<name_w$} │ {:>len_w$} │ {:<range_w$} │",
        "Input", "Length", "Range"
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for feature in features.iter().take(MAX_ROWS) {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<name_w$} │ {:>len_w$} │ {:<range_w$} │",
            truncate(feature.name, name_w),
            feature.values.len(),
            truncate(&value_range(feature.values), range_w)
        );
    }
    if features.len() > MAX_ROWS {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<name_w$} │ {:>len_w$} │ {:<range_w$} │",
            "...",
            "...",
            format!("({} more inputs)", features.len() - MAX_ROWS)
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn value_range(values: &[f64]) -> String {
    match values {
        [] => "empty".to_string(),
        [v] => number(*v),
        _ => {
            let (min, max) = values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            format!("{} … {}", number(min), number(max))
        }
    }
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Metric",
        "Value",
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_summarize_vectors() {
        assert_eq!(value_range(&[]), "empty");
        assert_eq!(value_range(&[2.5]), "2.5");
        assert_eq!(value_range(&[3.0, -1.0, 2.0]), "-1 … 3");
    }

    #[test]
    fn key_value_table_fits_box() {
        let mut buf = Vec::new();
        print_kv_table(&mut buf, "Summary", &[("Target", "-10.5".to_string())]);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().all(|l| l.chars().count() <= BOX_INNER_WIDTH + INDENT.len()));
        assert!(text.contains("-10.5"));
    }
}
