//! Hyperbolic and convex-projective geometry engine.
//!
//! Models points in the Poincaré and Klein disks and in properly convex domains
//! with the Hilbert metric, and computes geodesics, metric bisectors, and
//! Voronoi-style tessellations over these metrics.
//!
//! Layout
//! - `linalg`: runtime-dimension vectors/matrices, complex numbers, transformations.
//! - `model`: the `Model` trait and the Poincaré / Klein / convex-projective variants.
//! - `domain`: bulged reflection group, boundary polygon, chord and cross-ratio engine.
//! - `bisector`: adaptive box-walking bisector tracer.
//! - `simplex`, `tessellate`: metric Bowyer–Watson and nearest-site rasters.
//!
//! Coordinates
//! - Geometry hot paths use `Point2 = nalgebra::Vector2<f64>` (affine chart `w = 1`).
//! - Triangulation vertices are homogeneous `Vector3<f64>` with trailing `1`.

pub mod bisector;
pub mod cfg;
pub mod domain;
pub mod error;
pub mod linalg;
pub mod model;
pub mod simplex;
pub mod tessellate;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Affine point in a model's intrinsic chart (or in canvas pixels).
pub type Point2 = nalgebra::Vector2<f64>;

pub use error::{GeomError, GeomResult};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::bisector::{trace_bisector, BisectorCfg, BisectorTrace, TraceMode};
    pub use crate::cfg::{DomainCfg, TessellateCfg};
    pub use crate::domain::ConvexDomain;
    pub use crate::error::{GeomError, GeomResult};
    pub use crate::linalg::{ApproxEq, Complex, Matrix, Mobius, Transformation, Vector};
    pub use crate::model::{
        AnyModel, CanvasFrame, ConvexProjectiveModel, Geodesic, KleinModel, Model,
        PoincareModel,
    };
    pub use crate::simplex::{DistanceFn, Edge, Euclidean, Simplex};
    pub use crate::tessellate::{bowyer_watson, tessellate, NearestSiteRaster, Triangulation};
    pub use crate::Point2;
}
