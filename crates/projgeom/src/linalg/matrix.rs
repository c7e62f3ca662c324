use nalgebra::{Complex, DMatrix, Matrix3};

use super::approx::ApproxEq;
use super::vector::Vector;
use crate::error::{GeomError, GeomResult};

/// Imaginary parts below this count as real eigenvalues.
const REAL_EIG_EPS: f64 = 1e-9;

/// Dense rectangular matrix of runtime shape.
///
/// 3×3 dominates (projective maps of the plane); determinant uses cofactor
/// expansion and is meant for small sizes only.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix(DMatrix<f64>);

/// Eigenvalues plus, for each real eigenvalue, a unit eigenvector.
#[derive(Clone, Debug)]
pub struct Eigen {
    pub values: Vec<Complex<f64>>,
    pub vectors: Vec<Option<Vector>>,
}

impl Eigen {
    /// Real eigenvalues sorted ascending (complex pairs skipped).
    pub fn real_values(&self) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .values
            .iter()
            .filter(|z| z.im.abs() <= REAL_EIG_EPS)
            .map(|z| z.re)
            .collect();
        out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        out
    }
}

impl Matrix {
    #[inline]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }
    #[inline]
    pub fn identity(n: usize) -> Self {
        Self(DMatrix::identity(n, n))
    }
    /// Build from row-major data; `data.len()` must equal `rows * cols`.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> GeomResult<Self> {
        if data.len() != rows * cols {
            return Err(GeomError::mismatch(
                "matrix from_row_slice",
                (rows, cols),
                (data.len(), 1),
            ));
        }
        Ok(Self(DMatrix::from_row_slice(rows, cols, data)))
    }
    /// Build from rows; ragged input is a dimension mismatch.
    pub fn from_rows(rows: &[Vec<f64>]) -> GeomResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(GeomError::mismatch(
                "matrix from_rows",
                (rows.len(), cols),
                (1, bad.len()),
            ));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_row_slice(rows.len(), cols, &flat)
    }
    pub fn from_fn(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> f64) -> Self {
        Self(DMatrix::from_fn(rows, cols, f))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }
    #[inline]
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.0.shape()
    }
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Option<f64> {
        self.0.get((r, c)).copied()
    }

    /// `self * other`; requires `self.cols == other.rows`.
    pub fn multiply(&self, other: &Matrix) -> GeomResult<Matrix> {
        if self.cols() != other.rows() {
            return Err(GeomError::mismatch("matrix multiply", self.shape(), other.shape()));
        }
        Ok(Self(&self.0 * &other.0))
    }

    /// Matrix action on a column vector.
    pub fn apply(&self, v: &Vector) -> GeomResult<Vector> {
        if self.cols() != v.dim() {
            return Err(GeomError::mismatch("matrix apply", self.shape(), (v.dim(), 1)));
        }
        Ok(Vector::from_raw(&self.0 * v.raw()))
    }

    #[inline]
    pub fn transpose(&self) -> Matrix {
        Self(self.0.transpose())
    }

    #[inline]
    pub fn scale(&self, s: f64) -> Matrix {
        Self(&self.0 * s)
    }

    /// Determinant by direct formulas (1×1, 2×2) and first-row cofactor expansion.
    pub fn determinant(&self) -> GeomResult<f64> {
        if self.rows() != self.cols() {
            return Err(GeomError::mismatch("determinant", self.shape(), self.shape()));
        }
        Ok(cofactor_det(&self.0))
    }

    /// Inverse via nalgebra's LU solver; singular input is `NumericInstability`.
    pub fn inverse(&self) -> GeomResult<Matrix> {
        if self.rows() != self.cols() {
            return Err(GeomError::mismatch("inverse", self.shape(), self.shape()));
        }
        self.0
            .clone()
            .lu()
            .try_inverse()
            .map(Self)
            .ok_or_else(|| GeomError::unstable("matrix is singular"))
    }

    /// Eigenvalues (Schur) and real eigenvectors (SVD null direction of `A − λI`).
    pub fn eigen(&self) -> GeomResult<Eigen> {
        if self.rows() != self.cols() || self.rows() == 0 {
            return Err(GeomError::mismatch("eigen", self.shape(), self.shape()));
        }
        let n = self.rows();
        let values: Vec<Complex<f64>> = self.0.complex_eigenvalues().iter().copied().collect();
        if values.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
            return Err(GeomError::unstable("non-finite eigenvalue"));
        }
        let vectors = values
            .iter()
            .map(|z| {
                if z.im.abs() > REAL_EIG_EPS {
                    return None;
                }
                let shifted = &self.0 - DMatrix::identity(n, n) * z.re;
                let svd = shifted.svd(false, true);
                let vt = svd.v_t?;
                let (imin, _) = svd
                    .singular_values
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
                let v = vt.row(imin).transpose();
                let norm = v.norm();
                (norm > 0.0).then(|| Vector::from_raw(v / norm))
            })
            .collect();
        Ok(Eigen { values, vectors })
    }

    /// Tolerance comparison; matrices of different shape are never equal.
    pub fn approx_eq(&self, other: &Matrix, tol: f64) -> bool {
        self.shape() == other.shape() && (&self.0 - &other.0).amax() <= tol
    }

    /// Fixed-size view for 3×3 projective maps.
    pub fn to_matrix3(&self) -> GeomResult<Matrix3<f64>> {
        if self.shape() != (3, 3) {
            return Err(GeomError::mismatch("to_matrix3", self.shape(), (3, 3)));
        }
        Ok(Matrix3::from_fn(|r, c| self.0[(r, c)]))
    }
}

impl ApproxEq for Matrix {
    #[inline]
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        Matrix::approx_eq(self, other, tol)
    }
}

impl From<Matrix3<f64>> for Matrix {
    fn from(m: Matrix3<f64>) -> Self {
        Self(DMatrix::from_fn(3, 3, |r, c| m[(r, c)]))
    }
}

fn cofactor_det(m: &DMatrix<f64>) -> f64 {
    match m.nrows() {
        0 => 1.0,
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        n => {
            let mut det = 0.0;
            for j in 0..n {
                let a = m[(0, j)];
                if a == 0.0 {
                    continue;
                }
                let minor = m.clone().remove_row(0).remove_column(j);
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                det += sign * a * cofactor_det(&minor);
            }
            det
        }
    }
}
