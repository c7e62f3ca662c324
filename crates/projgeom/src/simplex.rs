//! Edges, simplices, and metric circumcircles.
//!
//! `Simplex::circumcircle` works for any `DistanceFn`: the circumcenter and
//! radius come from the inverse of the Cayley–Menger bordered matrix of squared
//! pairwise distances, so Bowyer–Watson runs unchanged on Euclidean and
//! hyperbolic metrics.

use nalgebra::Vector3;

use crate::error::{GeomError, GeomResult};
use crate::linalg::{ApproxEq, Matrix, Vector};
use crate::Point2;

/// Unordered segment `{a, b}`.
#[derive(Clone, Copy, Debug)]
pub struct Edge<P = Point2> {
    pub a: P,
    pub b: P,
}

impl<P: ApproxEq> Edge<P> {
    #[inline]
    pub fn new(a: P, b: P) -> Self {
        Self { a, b }
    }

    /// Endpoint-order-independent comparison with tolerance `tol`.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        (self.a.approx_eq(&other.a, tol) && self.b.approx_eq(&other.b, tol))
            || (self.a.approx_eq(&other.b, tol) && self.b.approx_eq(&other.a, tol))
    }

    #[inline]
    pub fn has_endpoint(&self, p: &P, tol: f64) -> bool {
        self.a.approx_eq(p, tol) || self.b.approx_eq(p, tol)
    }
}

impl<P: ApproxEq> PartialEq for Edge<P> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, 0.0)
    }
}

impl Edge<Point2> {
    #[inline]
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }
    #[inline]
    pub fn midpoint(&self) -> Point2 {
        (self.a + self.b) * 0.5
    }
}

/// Metric used by circumcircles and Bowyer–Watson (homogeneous points, `w = 1`).
pub trait DistanceFn {
    fn distance(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> GeomResult<f64>;
}

impl<F> DistanceFn for F
where
    F: Fn(&Vector3<f64>, &Vector3<f64>) -> GeomResult<f64>,
{
    #[inline]
    fn distance(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> GeomResult<f64> {
        self(u, v)
    }
}

/// Euclidean distance of the affine parts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl DistanceFn for Euclidean {
    #[inline]
    fn distance(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> GeomResult<f64> {
        Ok((u.xy() - v.xy()).norm())
    }
}

/// Metric ball through a simplex's vertices.
#[derive(Clone, Copy, Debug)]
pub struct Circumcircle {
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl Circumcircle {
    /// Strict containment `d(center, p) < radius`.
    pub fn contains<D: DistanceFn + ?Sized>(&self, p: &Vector3<f64>, metric: &D) -> GeomResult<bool> {
        Ok(metric.distance(&self.center, p)? < self.radius)
    }
}

/// Ordered vertex list with its cyclic edge list.
#[derive(Clone, Debug)]
pub struct Simplex {
    vertices: Vec<Vector3<f64>>,
    edges: Vec<Edge<Vector3<f64>>>,
}

impl Simplex {
    /// Needs at least two vertices; edges are `[(v0,v1), (v1,v2), …, (vn,v0)]`.
    pub fn new(vertices: Vec<Vector3<f64>>) -> GeomResult<Self> {
        if vertices.len() < 2 {
            return Err(GeomError::degenerate("simplex needs at least two vertices"));
        }
        let n = vertices.len();
        let edges = (0..n)
            .map(|i| Edge::new(vertices[i], vertices[(i + 1) % n]))
            .collect();
        Ok(Self { vertices, edges })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Edge<Vector3<f64>>] {
        &self.edges
    }

    #[inline]
    pub fn has_vertex(&self, v: &Vector3<f64>, tol: f64) -> bool {
        self.vertices.iter().any(|w| w.approx_eq(v, tol))
    }

    /// Circumcenter and radius under `metric`.
    ///
    /// With `D_ij = d(v_i, v_j)²` and the bordered matrix `M = [[0, 1ᵀ], [1, D]]`,
    /// the first row of `M⁻¹` is `[−2R², λ_0, …, λ_n]`; the center is `Σ λ_i v_i`.
    pub fn circumcircle<D: DistanceFn + ?Sized>(&self, metric: &D) -> GeomResult<Circumcircle> {
        let n = self.vertices.len();
        let mut sq = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = metric.distance(&self.vertices[i], &self.vertices[j])?;
                sq[i * n + j] = d * d;
                sq[j * n + i] = d * d;
            }
        }
        let bordered = Matrix::from_fn(n + 1, n + 1, |r, c| match (r, c) {
            (0, 0) => 0.0,
            (0, _) | (_, 0) => 1.0,
            (r, c) => sq[(r - 1) * n + (c - 1)],
        });
        // det(M) ∝ volume², measured against the squared-diameter scale
        let scale = sq.iter().copied().fold(0.0, f64::max).powi(n as i32 - 1);
        if bordered.determinant()?.abs() <= 1e-12 * scale {
            return Err(GeomError::degenerate("simplex vertices are affinely dependent"));
        }
        let inv = bordered.inverse()?;
        let r2 = -0.5 * inv.get(0, 0).unwrap_or(f64::NAN);
        if !(r2.is_finite() && r2 >= 0.0) {
            return Err(GeomError::unstable(format!("invalid circumradius² {r2}")));
        }
        let mut center = Vector::zeros(3);
        for (i, v) in self.vertices.iter().enumerate() {
            let lambda = inv.get(0, i + 1).unwrap_or(0.0);
            center = center.add(&Vector::from(*v).scale(lambda))?;
        }
        let center = center.homogenize(2)?;
        Ok(Circumcircle {
            center: Vector3::new(center[0], center[1], center[2]),
            radius: r2.sqrt(),
        })
    }
}
