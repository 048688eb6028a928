//! Volumetric density grids and the numeric transforms applied to them
//! before they are used as a feature vector.
//!
//! The pipeline applies the transforms in a fixed order:
//! [`normalize`](DensityField::normalize) →
//! [`variance`](DensityField::variance) →
//! [`conv_matrix`](DensityField::conv_matrix) →
//! [`downsample`](DensityField::downsample).

use super::grid::GridHeader;
use serde::Deserialize;
use std::io::{self, Write};
use std::ops::Index;
use thiserror::Error;

/// Errors raised by density grid construction and transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("grid declares {expected} points but {found} values were supplied")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("downsampling stride must be at least 1")]
    ZeroStride,

    #[error("cannot normalize a grid whose integral is zero")]
    ZeroIntegral,

    #[error("cannot compress a {shape:?} grid to a {size}x{size}x{size} matrix")]
    InvalidCompression { size: usize, shape: [usize; 3] },
}

/// Inclusive bounds on the local variance of a grid point.
///
/// Points whose neighbourhood variance falls outside the bounds are zeroed by
/// [`DensityField::variance`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VarianceBounds {
    #[serde(default)]
    pub lower: f64,
    #[serde(default = "default_upper")]
    pub upper: f64,
}

fn default_upper() -> f64 {
    f64::INFINITY
}

impl Default for VarianceBounds {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: default_upper(),
        }
    }
}

impl VarianceBounds {
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// A scalar field sampled on a periodic grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    header: GridHeader,
    values: Vec<f64>,
    /// Training-set tag recorded by the reader, if any.
    pub train: Option<String>,
}

impl DensityField {
    pub fn new(header: GridHeader, values: Vec<f64>) -> Result<Self, TransformError> {
        match GridHeader::checked_point_count(header.shape) {
            Some(expected) if expected == values.len() => {}
            expected => {
                return Err(TransformError::ShapeMismatch {
                    expected: expected.unwrap_or(usize::MAX),
                    found: values.len(),
                });
            }
        }
        Ok(Self {
            header,
            values,
            train: None,
        })
    }

    pub fn with_train(mut self, train: impl Into<String>) -> Self {
        self.train = Some(train.into());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.header.shape
    }

    /// Cell volume in bohr³.
    pub fn volume(&self) -> f64 {
        self.header.volume()
    }

    /// Volume associated with one grid point at the current resolution.
    pub fn dv(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.volume() / self.values.len() as f64
        }
    }

    /// Integral of the field over the cell, `Σ ρ · dV`.
    pub fn integral(&self) -> f64 {
        self.values.iter().sum::<f64>() * self.dv()
    }

    /// Rescales the field so that its integral equals `target`.
    pub fn normalize(&mut self, target: f64) -> Result<(), TransformError> {
        let integral = self.integral();
        if integral == 0.0 || !integral.is_finite() {
            return Err(TransformError::ZeroIntegral);
        }
        let scale = target / integral;
        for v in &mut self.values {
            *v *= scale;
        }
        Ok(())
    }

    /// Zeroes every point whose variance over its 27-point periodic
    /// neighbourhood lies outside `bounds`.
    ///
    /// Variances are computed from the grid as it was before the call.
    pub fn variance(&mut self, bounds: VarianceBounds) {
        if self.values.is_empty() {
            return;
        }
        let [nx, ny, nz] = self.header.shape;
        let mut masked = Vec::new();

        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let var = self.local_variance(i, j, k);
                    if !bounds.contains(var) {
                        masked.push(self.header.index(i, j, k));
                    }
                }
            }
        }

        for idx in masked {
            self.values[idx] = 0.0;
        }
    }

    fn local_variance(&self, i: usize, j: usize, k: usize) -> f64 {
        let [nx, ny, nz] = self.header.shape;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;

        for di in [nx - 1, 0, 1] {
            for dj in [ny - 1, 0, 1] {
                for dk in [nz - 1, 0, 1] {
                    let idx = self
                        .header
                        .index((i + di) % nx, (j + dj) % ny, (k + dk) % nz);
                    let v = self.values[idx];
                    sum += v;
                    sum_sq += v * v;
                }
            }
        }

        let mean = sum / 27.0;
        (sum_sq / 27.0 - mean * mean).max(0.0)
    }

    /// Compresses the grid onto a `size³` matrix by block averaging.
    pub fn conv_matrix(&mut self, size: usize) -> Result<(), TransformError> {
        let shape = self.header.shape;
        if size == 0 || shape.iter().any(|&n| n < size) {
            return Err(TransformError::InvalidCompression { size, shape });
        }

        let bounds = |n: usize, b: usize| (b * n / size, (b + 1) * n / size);
        let mut compressed = Vec::with_capacity(size * size * size);

        for bi in 0..size {
            let (i0, i1) = bounds(shape[0], bi);
            for bj in 0..size {
                let (j0, j1) = bounds(shape[1], bj);
                for bk in 0..size {
                    let (k0, k1) = bounds(shape[2], bk);
                    let mut sum = 0.0;
                    for i in i0..i1 {
                        for j in j0..j1 {
                            for k in k0..k1 {
                                sum += self.values[self.header.index(i, j, k)];
                            }
                        }
                    }
                    let count = (i1 - i0) * (j1 - j0) * (k1 - k0);
                    compressed.push(sum / count as f64);
                }
            }
        }

        self.header.shape = [size; 3];
        self.values = compressed;
        Ok(())
    }

    /// Keeps every `stride`-th point along each axis.
    ///
    /// Repeated calls compound: `downsample(a)` followed by `downsample(b)`
    /// is the same as `downsample(a * b)`.
    pub fn downsample(&mut self, stride: usize) -> Result<(), TransformError> {
        if stride == 0 {
            return Err(TransformError::ZeroStride);
        }
        if stride == 1 {
            return Ok(());
        }

        let old = self.header.clone();
        let shape = old.shape.map(|n| n.div_ceil(stride));
        let mut reduced = Vec::with_capacity(shape.iter().product());

        for i in 0..shape[0] {
            for j in 0..shape[1] {
                for k in 0..shape[2] {
                    reduced.push(self.values[old.index(i * stride, j * stride, k * stride)]);
                }
            }
        }

        self.header.shape = shape;
        self.values = reduced;
        Ok(())
    }

    /// Writes the grid geometry block of a cube file.
    pub fn cube_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header.write_axes(writer)
    }
}

impl Index<usize> for DensityField {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn cubic(n: usize, edge: f64, values: Vec<f64>) -> DensityField {
        let header = GridHeader::new(
            [n, n, n],
            [[edge, 0.0, 0.0], [0.0, edge, 0.0], [0.0, 0.0, edge]],
        );
        DensityField::new(header, values).unwrap()
    }

    fn ramp(n: usize) -> DensityField {
        cubic(n, n as f64, (0..n * n * n).map(|v| v as f64).collect())
    }

    #[test]
    fn rejects_mismatched_value_count() {
        let cell = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let header = GridHeader::new([2, 2, 2], cell);
        let err = DensityField::new(header, vec![1.0; 7]).unwrap_err();
        assert_eq!(
            err,
            TransformError::ShapeMismatch {
                expected: 8,
                found: 7
            }
        );
    }

    #[test]
    fn dv_tracks_current_resolution() {
        let mut field = ramp(4);
        assert!(approx_eq(field.dv(), 1.0, 1e-12));
        field.downsample(2).unwrap();
        assert!(approx_eq(field.dv(), 8.0, 1e-12));
        assert!(approx_eq(field.volume(), 64.0, 1e-12));
    }

    #[test]
    fn normalize_sets_integral_and_is_idempotent() {
        let mut field = cubic(2, 2.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        field.normalize(10.0).unwrap();
        assert!(approx_eq(field.integral(), 10.0, 1e-9));

        let once = field.values().to_vec();
        field.normalize(10.0).unwrap();
        for (a, b) in once.iter().zip(field.values()) {
            assert!(approx_eq(*a, *b, 1e-12));
        }
    }

    #[test]
    fn normalize_is_scale_linear() {
        let mut a = cubic(2, 2.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let mut b = a.clone();
        a.normalize(3.0).unwrap();
        b.normalize(6.0).unwrap();
        for (x, y) in a.values().iter().zip(b.values()) {
            assert!(approx_eq(2.0 * x, *y, 1e-12));
        }
    }

    #[test]
    fn normalize_rejects_zero_integral() {
        let mut field = cubic(2, 1.0, vec![0.0; 8]);
        assert_eq!(field.normalize(1.0), Err(TransformError::ZeroIntegral));
    }

    #[test]
    fn default_variance_bounds_keep_everything() {
        let mut field = ramp(3);
        let before = field.values().to_vec();
        field.variance(VarianceBounds::default());
        assert_eq!(field.values(), before.as_slice());
    }

    #[test]
    fn variance_gate_zeroes_flat_regions() {
        let mut values = vec![1.0; 27];
        values[13] = 10.0;
        let mut field = cubic(3, 3.0, values);
        field.variance(VarianceBounds {
            lower: 1e-6,
            upper: f64::INFINITY,
        });
        // On a 3x3x3 periodic grid every neighbourhood covers the spike.
        assert!(field.values().iter().all(|&v| v != 0.0));

        let mut flat = cubic(3, 3.0, vec![2.0; 27]);
        flat.variance(VarianceBounds {
            lower: 1e-6,
            upper: f64::INFINITY,
        });
        assert!(flat.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn variance_gate_upper_bound_masks_noisy_points() {
        let mut values = vec![0.0; 64];
        values[0] = 100.0;
        let mut field = cubic(4, 4.0, values);
        field.variance(VarianceBounds {
            lower: 0.0,
            upper: 1.0,
        });
        assert_eq!(field[0], 0.0);
    }

    #[test]
    fn conv_matrix_block_averages() {
        let mut field = ramp(4);
        let total: f64 = field.values().iter().sum();
        field.conv_matrix(2).unwrap();

        assert_eq!(field.shape(), [2, 2, 2]);
        assert_eq!(field.len(), 8);
        // First block holds indices i,j,k in {0,1}.
        let expected = (0 + 1 + 4 + 5 + 16 + 17 + 20 + 21) as f64 / 8.0;
        assert!(approx_eq(field[0], expected, 1e-12));
        let mean: f64 = field.values().iter().sum::<f64>() / 8.0;
        assert!(approx_eq(mean, total / 64.0, 1e-12));
    }

    #[test]
    fn conv_matrix_rejects_oversized_matrix() {
        let mut field = ramp(3);
        assert_eq!(
            field.conv_matrix(4),
            Err(TransformError::InvalidCompression {
                size: 4,
                shape: [3, 3, 3]
            })
        );
        assert!(field.conv_matrix(0).is_err());
    }

    #[test]
    fn downsample_keeps_strided_points() {
        let mut field = ramp(5);
        field.downsample(2).unwrap();
        assert_eq!(field.shape(), [3, 3, 3]);
        assert_eq!(field[0], 0.0);
        assert_eq!(field[1], 2.0);
        assert_eq!(field[2], 4.0);
        assert_eq!(field[3], 10.0);
    }

    #[test]
    fn downsample_composes_multiplicatively() {
        let mut twice = ramp(7);
        twice.downsample(2).unwrap();
        twice.downsample(3).unwrap();

        let mut once = ramp(7);
        once.downsample(6).unwrap();

        assert_eq!(twice.shape(), once.shape());
        assert_eq!(twice.values(), once.values());
    }

    #[test]
    fn downsample_stride_one_is_identity_and_zero_fails() {
        let mut field = ramp(3);
        let before = field.clone();
        field.downsample(1).unwrap();
        assert_eq!(field, before);
        assert_eq!(field.downsample(0), Err(TransformError::ZeroStride));
    }
}
