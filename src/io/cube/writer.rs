use crate::io::util::format_general;
use crate::model::density::DensityField;
use std::io::{self, Write};

pub const OUTPUT_TITLE: &str = "Model output written by dft-forge";
pub const INPUT_TITLE: &str = "Model input written by dft-forge";

const VALUES_PER_LINE: usize = 6;

/// Writes `values` as a cube file laid out on the grid of `density`.
///
/// The atom block is a single placeholder atom; the file is meant for
/// visualising a scalar stream against the density grid, not for
/// round-tripping structures.
pub fn write<W: Write>(
    mut writer: W,
    title: &str,
    density: &DensityField,
    values: &[f64],
) -> io::Result<()> {
    writeln!(writer, "{title}")?;
    writeln!(writer)?;
    writeln!(writer, "1")?;
    density.cube_header(&mut writer)?;
    writeln!(writer, "1 1 0.0 0.0 0.0")?;

    for (i, value) in values.iter().enumerate() {
        write!(writer, "{:>12}", format_general(*value))?;
        if (i + 1) % VALUES_PER_LINE == 0 {
            writeln!(writer)?;
        }
    }
    if values.len() % VALUES_PER_LINE != 0 {
        writeln!(writer)?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::grid::GridHeader;

    fn five_point_density() -> DensityField {
        let header = GridHeader::new(
            [5, 1, 1],
            [[5.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        );
        DensityField::new(header, vec![0.1, 0.2, 0.3, 0.4, 0.5]).unwrap()
    }

    #[test]
    fn wraps_after_every_sixth_value() {
        let density = five_point_density();
        let outputs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        let mut buf = Vec::new();
        write(&mut buf, OUTPUT_TITLE, &density, &outputs).expect("write cube");
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], OUTPUT_TITLE);
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "1");
        assert_eq!(lines[3], "    5    1.000000    0.000000    0.000000");
        assert_eq!(lines[6], "1 1 0.0 0.0 0.0");
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[7].len(), 72);
        assert_eq!(
            lines[7].split_whitespace().collect::<Vec<_>>(),
            vec!["1", "2", "3", "4", "5", "6"]
        );
        assert_eq!(lines[8], "           7");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn writes_density_values_with_general_format() {
        let density = five_point_density();
        let mut buf = Vec::new();
        write(&mut buf, INPUT_TITLE, &density, density.values()).expect("write cube");
        let text = String::from_utf8(buf).unwrap();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "         0.1         0.2         0.3         0.4         0.5");
    }
}
