//! Metric Delaunay triangulation and nearest-site (Voronoi) rasters.
//!
//! - `delaunay`: Bowyer–Watson over any `DistanceFn`, with a per-triangle
//!   Euclidean fallback where the metric has no circumcircle.
//! - `voronoi`: brute-force labelling of canvas pixels by nearest site, plus
//!   seeded site sampling.

mod delaunay;
mod voronoi;

pub use delaunay::{bowyer_watson, bowyer_watson_with, super_triangle, Triangulation};
pub use voronoi::{sample_sites, tessellate, NearestSiteRaster};
