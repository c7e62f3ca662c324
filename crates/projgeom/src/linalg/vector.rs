use std::ops::Index;

use nalgebra::{DVector, Vector2, Vector3};

use super::approx::ApproxEq;
use crate::cfg::HOMOGENIZE_EPS;
use crate::error::{GeomError, GeomResult};
use crate::Point2;

/// Column vector of runtime dimension with value semantics.
///
/// Invariants:
/// - Binary operations require equal dimensions (`DimensionMismatch` otherwise).
/// - Every operation returns a new vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector(DVector<f64>);

impl Vector {
    #[inline]
    pub fn new(coords: Vec<f64>) -> Self {
        Self(DVector::from_vec(coords))
    }
    #[inline]
    pub fn from_slice(coords: &[f64]) -> Self {
        Self(DVector::from_column_slice(coords))
    }
    #[inline]
    pub fn zeros(dim: usize) -> Self {
        Self(DVector::zeros(dim))
    }
    /// Homogeneous lift `(x, y, 1)` of an affine point.
    #[inline]
    pub fn lift(p: &Point2) -> Self {
        Self::new(vec![p.x, p.y, 1.0])
    }
    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }
    #[inline]
    pub(crate) fn raw(&self) -> &DVector<f64> {
        &self.0
    }
    #[inline]
    pub(crate) fn from_raw(v: DVector<f64>) -> Self {
        Self(v)
    }

    fn check_same(&self, other: &Vector, op: &'static str) -> GeomResult<()> {
        if self.dim() != other.dim() {
            return Err(GeomError::mismatch(op, (self.dim(), 1), (other.dim(), 1)));
        }
        Ok(())
    }

    pub fn add(&self, other: &Vector) -> GeomResult<Vector> {
        self.check_same(other, "vector add")?;
        Ok(Self(&self.0 + &other.0))
    }

    pub fn sub(&self, other: &Vector) -> GeomResult<Vector> {
        self.check_same(other, "vector sub")?;
        Ok(Self(&self.0 - &other.0))
    }

    #[inline]
    pub fn scale(&self, s: f64) -> Vector {
        Self(&self.0 * s)
    }

    pub fn dot(&self, other: &Vector) -> GeomResult<f64> {
        self.check_same(other, "vector dot")?;
        Ok(self.0.dot(&other.0))
    }

    /// Cross product; defined for 3-vectors only.
    pub fn cross(&self, other: &Vector) -> GeomResult<Vector> {
        if self.dim() != 3 || other.dim() != 3 {
            return Err(GeomError::mismatch(
                "vector cross",
                (self.dim(), 1),
                (other.dim(), 1),
            ));
        }
        let a = Vector3::new(self.0[0], self.0[1], self.0[2]);
        let b = Vector3::new(other.0[0], other.0[1], other.0[2]);
        Ok(Self::from(a.cross(&b)))
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Map a projective representative to the affine chart `v[idx] = 1`.
    ///
    /// If `|v[idx]| < HOMOGENIZE_EPS` the point is at (or numerically near)
    /// infinity: that coordinate is zeroed and the remainder normalized to unit
    /// length. An all-zero remainder stays zero. `idx` past the end is a
    /// `DimensionMismatch`.
    pub fn homogenize(&self, idx: usize) -> GeomResult<Vector> {
        if idx >= self.dim() {
            return Err(GeomError::mismatch("vector homogenize", (self.dim(), 1), (idx + 1, 1)));
        }
        Ok(self.chart(idx))
    }

    /// `homogenize` without the bounds check; `idx < dim()`.
    fn chart(&self, idx: usize) -> Vector {
        let pivot = self.0[idx];
        if pivot.abs() >= HOMOGENIZE_EPS {
            return Self(&self.0 / pivot);
        }
        let mut out = self.0.clone();
        out[idx] = 0.0;
        let n = out.norm();
        if n > 0.0 {
            out /= n;
        }
        Self(out)
    }

    /// First two coordinates as an affine point (dimension must be ≥ 2).
    pub fn xy(&self) -> GeomResult<Point2> {
        if self.dim() < 2 {
            return Err(GeomError::mismatch("vector xy", (self.dim(), 1), (2, 1)));
        }
        Ok(Point2::new(self.0[0], self.0[1]))
    }

    /// Tolerance comparison; vectors of different dimension are never equal.
    pub fn approx_eq(&self, other: &Vector, tol: f64) -> bool {
        self.dim() == other.dim() && (&self.0 - &other.0).amax() <= tol
    }
}

impl ApproxEq for Vector {
    #[inline]
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        Vector::approx_eq(self, other, tol)
    }
}

impl Index<usize> for Vector {
    type Output = f64;
    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl From<Vector2<f64>> for Vector {
    fn from(v: Vector2<f64>) -> Self {
        Self::new(vec![v.x, v.y])
    }
}

impl From<Vector3<f64>> for Vector {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(vec![v.x, v.y, v.z])
    }
}

/// Affine image of a homogeneous 3-vector under the `w = 1` chart
/// (same infinity policy as `Vector::homogenize`).
pub fn dehomogenize(v: &Vector3<f64>) -> Point2 {
    let h = Vector::from(*v).chart(2);
    Point2::new(h[0], h[1])
}
