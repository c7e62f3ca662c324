//! Metric models of the plane: Poincaré disk, Klein disk, convex-projective domain.
//!
//! Purpose
//! - One `Model` trait for distance, canvas⇄model mapping, containment and
//!   geodesic description; `AnyModel` is the closed sum used by callers that
//!   pick a model at runtime.
//! - Disk bookkeeping (containment, unit-circle chords) lives in `UnitDisk` and is
//!   composed into both disk models.
//!
//! Conventions
//! - Model coordinates are the intrinsic affine chart; canvas coordinates are
//!   pixels. `CanvasFrame` maps between them by an exact affine scaling.
//! - Distances of points outside the model are `DegenerateGeometry`.

mod convex;
mod disk;
mod klein;
mod poincare;

pub use convex::ConvexProjectiveModel;
pub use disk::UnitDisk;
pub use klein::{klein_to_poincare, poincare_to_klein, KleinModel};
pub use poincare::{poincare_distance, PoincareModel};

use nalgebra::Vector3;

use crate::error::{GeomError, GeomResult};
use crate::linalg::dehomogenize;
use crate::simplex::{DistanceFn, Edge};
use crate::Point2;

/// Pixel frame: `canvas = origin + scale · model`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasFrame {
    pub origin: Point2,
    pub scale: f64,
}

impl CanvasFrame {
    #[inline]
    pub fn new(origin: Point2, scale: f64) -> Self {
        Self { origin, scale }
    }

    /// Frame centered on a `width × height` canvas whose unit disk leaves a
    /// relative `margin` to the shorter side.
    pub fn centered(width: f64, height: f64, margin: f64) -> Self {
        Self {
            origin: Point2::new(width * 0.5, height * 0.5),
            scale: 0.5 * width.min(height) * (1.0 - margin),
        }
    }

    #[inline]
    pub fn to_model(&self, c: &Point2) -> Point2 {
        (c - self.origin) / self.scale
    }

    #[inline]
    pub fn to_canvas(&self, m: &Point2) -> Point2 {
        self.origin + m * self.scale
    }
}

impl Default for CanvasFrame {
    fn default() -> Self {
        Self::centered(400.0, 400.0, 0.05)
    }
}

/// Drawable description of a geodesic segment.
#[derive(Clone, Copy, Debug)]
pub enum Geodesic {
    Segment(Edge),
    /// Circular arc from angle `start` through signed `sweep` (|sweep| ≤ π).
    Arc {
        center: Point2,
        radius: f64,
        start: f64,
        sweep: f64,
    },
}

impl Geodesic {
    /// `n ≥ 2` evenly spaced points from the first to the second endpoint.
    pub fn sample(&self, n: usize) -> Vec<Point2> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let s = i as f64 / (n - 1) as f64;
                match *self {
                    Geodesic::Segment(e) => e.a + (e.b - e.a) * s,
                    Geodesic::Arc {
                        center,
                        radius,
                        start,
                        sweep,
                    } => {
                        let th = start + sweep * s;
                        center + Point2::new(th.cos(), th.sin()) * radius
                    }
                }
            })
            .collect()
    }

    /// Same curve in canvas coordinates.
    pub fn to_canvas(&self, frame: &CanvasFrame) -> Geodesic {
        match *self {
            Geodesic::Segment(e) => {
                Geodesic::Segment(Edge::new(frame.to_canvas(&e.a), frame.to_canvas(&e.b)))
            }
            Geodesic::Arc {
                center,
                radius,
                start,
                sweep,
            } => Geodesic::Arc {
                center: frame.to_canvas(&center),
                radius: radius * frame.scale,
                start,
                sweep,
            },
        }
    }
}

/// A metric geometry drawn on a canvas.
pub trait Model {
    fn name(&self) -> &'static str;

    fn frame(&self) -> &CanvasFrame;

    /// Metric in model coordinates.
    fn distance(&self, p: &Point2, q: &Point2) -> GeomResult<f64>;

    /// Open-domain membership in model coordinates.
    fn contains(&self, p: &Point2) -> bool;

    /// Geodesic between two interior points (straight unless overridden).
    fn geodesic(&self, p: &Point2, q: &Point2) -> GeomResult<Geodesic> {
        if !(self.contains(p) && self.contains(q)) {
            return Err(GeomError::degenerate("geodesic endpoint outside the model"));
        }
        Ok(Geodesic::Segment(Edge::new(*p, *q)))
    }

    #[inline]
    fn canvas_to_model(&self, c: &Point2) -> Point2 {
        self.frame().to_model(c)
    }

    #[inline]
    fn model_to_canvas(&self, m: &Point2) -> Point2 {
        self.frame().to_canvas(m)
    }

    fn canvas_distance(&self, a: &Point2, b: &Point2) -> GeomResult<f64> {
        self.distance(&self.canvas_to_model(a), &self.canvas_to_model(b))
    }

    fn canvas_geodesic(&self, a: &Point2, b: &Point2) -> GeomResult<Geodesic> {
        let g = self.geodesic(&self.canvas_to_model(a), &self.canvas_to_model(b))?;
        Ok(g.to_canvas(self.frame()))
    }
}

/// Runtime choice among the three models.
#[derive(Debug)]
pub enum AnyModel {
    Poincare(PoincareModel),
    Klein(KleinModel),
    Convex(ConvexProjectiveModel),
}

impl AnyModel {
    fn inner(&self) -> &dyn Model {
        match self {
            AnyModel::Poincare(m) => m,
            AnyModel::Klein(m) => m,
            AnyModel::Convex(m) => m,
        }
    }
}

impl Model for AnyModel {
    #[inline]
    fn name(&self) -> &'static str {
        self.inner().name()
    }
    #[inline]
    fn frame(&self) -> &CanvasFrame {
        self.inner().frame()
    }
    #[inline]
    fn distance(&self, p: &Point2, q: &Point2) -> GeomResult<f64> {
        self.inner().distance(p, q)
    }
    #[inline]
    fn contains(&self, p: &Point2) -> bool {
        self.inner().contains(p)
    }
    #[inline]
    fn geodesic(&self, p: &Point2, q: &Point2) -> GeomResult<Geodesic> {
        self.inner().geodesic(p, q)
    }
}

/// Adapter: a model's metric as a `DistanceFn` on homogeneous model points.
#[derive(Clone, Copy)]
pub struct ModelMetric<'a, M: ?Sized>(pub &'a M);

impl<M: Model + ?Sized> DistanceFn for ModelMetric<'_, M> {
    #[inline]
    fn distance(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> GeomResult<f64> {
        self.0.distance(&dehomogenize(u), &dehomogenize(v))
    }
}

#[inline]
pub(crate) fn wrap_angle(a: f64) -> f64 {
    let mut x = a;
    while x <= -std::f64::consts::PI {
        x += 2.0 * std::f64::consts::PI;
    }
    while x > std::f64::consts::PI {
        x -= 2.0 * std::f64::consts::PI;
    }
    x
}
