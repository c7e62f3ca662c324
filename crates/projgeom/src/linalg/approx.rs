use nalgebra::{Matrix3, Vector2, Vector3};

/// Tolerance-aware equality (max-abs metric). `tol = 0.0` is exact equality.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self, tol: f64) -> bool;
}

impl ApproxEq for Vector2<f64> {
    #[inline]
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self - other).amax() <= tol
    }
}

impl ApproxEq for Vector3<f64> {
    #[inline]
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self - other).amax() <= tol
    }
}

impl ApproxEq for Matrix3<f64> {
    #[inline]
    fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self - other).amax() <= tol
    }
}

/// Snap a coordinate to an integer grid of spacing `tol` (hash keys for dedup).
#[inline]
pub fn grid_key(x: f64, tol: f64) -> i64 {
    (x / tol).round() as i64
}
