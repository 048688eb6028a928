//! Geometry of a periodic volumetric grid.

use std::io::{self, Write};

/// Bohr radius in Ångströms.
pub const BOHR_IN_ANGSTROM: f64 = 0.529_177_210_903;

/// Shape and cell geometry of a volumetric grid, in bohr.
///
/// Values attached to a header are stored in cube order: the first axis
/// varies slowest and the third axis fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHeader {
    /// Number of points along each cell vector.
    pub shape: [usize; 3],
    /// Full cell vectors (rows), in bohr.
    pub cell: [[f64; 3]; 3],
    /// Grid origin, in bohr.
    pub origin: [f64; 3],
}

impl GridHeader {
    pub fn new(shape: [usize; 3], cell: [[f64; 3]; 3]) -> Self {
        Self {
            shape,
            cell,
            origin: [0.0; 3],
        }
    }

    /// Builds a header from per-axis voxel vectors, the way cube files store them.
    pub fn from_voxels(shape: [usize; 3], voxels: [[f64; 3]; 3], origin: [f64; 3]) -> Self {
        let mut cell = [[0.0; 3]; 3];
        for axis in 0..3 {
            for k in 0..3 {
                cell[axis][k] = voxels[axis][k] * shape[axis] as f64;
            }
        }
        Self {
            shape,
            cell,
            origin,
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of points in a grid of `shape`, or `None` if it overflows.
    pub fn checked_point_count(shape: [usize; 3]) -> Option<usize> {
        shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// Cell volume in bohr³.
    pub fn volume(&self) -> f64 {
        determinant(&self.cell).abs()
    }

    pub fn voxel(&self, axis: usize) -> [f64; 3] {
        let n = self.shape[axis].max(1) as f64;
        let v = self.cell[axis];
        [v[0] / n, v[1] / n, v[2] / n]
    }

    /// Flat index of grid point `(i, j, k)` in cube order.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    /// Writes the three axis lines of a cube header (`%5d%12.6f%12.6f%12.6f`).
    pub fn write_axes<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for axis in 0..3 {
            let v = self.voxel(axis);
            writeln!(
                writer,
                "{:>5}{:>12.6}{:>12.6}{:>12.6}",
                self.shape[axis], v[0], v[1], v[2]
            )?;
        }
        Ok(())
    }
}

pub fn determinant(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}
