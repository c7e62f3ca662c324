//! Poincaré disk model.

use nalgebra::{Complex, Matrix2, Vector2};

use super::disk::UnitDisk;
use super::{wrap_angle, CanvasFrame, Geodesic, Model};
use crate::error::{GeomError, GeomResult};
use crate::linalg::{orbit, Mobius};
use crate::simplex::Edge;
use crate::Point2;

/// Below this `|det [p q]|` the two points are treated as collinear with the origin.
const COLLINEAR_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug)]
pub struct PoincareModel {
    disk: UnitDisk,
}

impl PoincareModel {
    #[inline]
    pub fn new(frame: CanvasFrame) -> Self {
        Self {
            disk: UnitDisk::new(frame),
        }
    }

    #[inline]
    pub fn disk(&self) -> &UnitDisk {
        &self.disk
    }

    /// Orbit of `seed` under words of length ≤ `depth` in the Möbius `generators`.
    pub fn orbit(&self, seed: &Point2, generators: &[Mobius], depth: usize) -> GeomResult<Vec<Point2>> {
        self.disk.require_inside(seed)?;
        let z = Complex::new(seed.x, seed.y);
        let pts = orbit(Mobius::identity(), generators, &z, depth, |a, b| {
            (a - b).norm() < 1e-9
        })?;
        Ok(pts.into_iter().map(|z| Point2::new(z.re, z.im)).collect())
    }
}

/// `acosh(1 + 2‖p−q‖² / ((1−‖p‖²)(1−‖q‖²)))`.
pub fn poincare_distance(p: &Point2, q: &Point2) -> f64 {
    let num = 2.0 * (p - q).norm_squared();
    let den = (1.0 - p.norm_squared()) * (1.0 - q.norm_squared());
    (1.0 + num / den).max(1.0).acosh()
}

impl Model for PoincareModel {
    #[inline]
    fn name(&self) -> &'static str {
        "poincare"
    }

    #[inline]
    fn frame(&self) -> &CanvasFrame {
        &self.disk.frame
    }

    #[inline]
    fn contains(&self, p: &Point2) -> bool {
        self.disk.contains(p)
    }

    fn distance(&self, p: &Point2, q: &Point2) -> GeomResult<f64> {
        self.disk.require_inside(p)?;
        self.disk.require_inside(q)?;
        Ok(poincare_distance(p, q))
    }

    /// Straight chord through the origin, else the arc of the circle orthogonal
    /// to the unit circle through `p` and `q` (shorter angular span).
    fn geodesic(&self, p: &Point2, q: &Point2) -> GeomResult<Geodesic> {
        self.disk.require_inside(p)?;
        self.disk.require_inside(q)?;
        let m = Matrix2::new(p.x, p.y, q.x, q.y);
        if m.determinant().abs() < COLLINEAR_EPS {
            return Ok(Geodesic::Segment(Edge::new(*p, *q)));
        }
        // 2 c·p = 1 + ‖p‖², 2 c·q = 1 + ‖q‖²
        let rhs = Vector2::new(1.0 + p.norm_squared(), 1.0 + q.norm_squared()) * 0.5;
        let center = m
            .try_inverse()
            .ok_or_else(|| GeomError::unstable("orthogonal circle system is singular"))?
            * rhs;
        let radius = (center.norm_squared() - 1.0).max(0.0).sqrt();
        let start = (p.y - center.y).atan2(p.x - center.x);
        let end = (q.y - center.y).atan2(q.x - center.x);
        Ok(Geodesic::Arc {
            center,
            radius,
            start,
            sweep: wrap_angle(end - start),
        })
    }
}
