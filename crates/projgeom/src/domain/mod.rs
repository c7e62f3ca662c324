//! Convex-projective domain of the bulged ideal-triangle group.
//!
//! Purpose
//! - Build the properly convex domain tiled by images of the reference
//!   triangle under words of bounded length, and evaluate its Hilbert metric.
//!
//! Pipeline
//! - `group`: Cartan matrix of the bulge → three reflections → BFS over words.
//! - `boundary`: tile sides → interior/boundary edge sets → closed polygon.
//! - `chord`: line/side intersection, a small recent-side cache, cross ratio.
//!
//! Conventions
//! - Everything lives in the affine chart `w = 1`; the bulge range used by the
//!   builders keeps the domain inside it.
//! - A rebuild bumps a generation counter; cached chord sides from an older
//!   generation are ignored even if `clear_chord_cache` was never called.

mod boundary;
mod chord;
mod group;

pub use boundary::EdgeSet;
pub use chord::{cross_ratio_of, ChordStats};
pub use group::{
    cartan_matrix, enumerate_words, mirror_functionals, reference_triangle,
    reflection_generators, GroupElement,
};

use std::cell::RefCell;

use nalgebra::{Matrix3, Vector3};
use tracing::{debug, trace};

use crate::cfg::{DomainCfg, PARALLEL_EPS};
use crate::error::{GeomError, GeomResult};
use crate::linalg::{orbit, Eigen, LinearMap, Matrix, Vector};
use crate::simplex::Edge;
use crate::Point2;

use boundary::{assemble, convex_contains, order_polygon};
use chord::{extreme_hits, intersect, ChordCache, ChordCounters};

/// Bulged domain with its boundary polygon and Hilbert metric.
#[derive(Debug)]
pub struct ConvexDomain {
    cfg: DomainCfg,
    generators: [Matrix3<f64>; 3],
    group_size: usize,
    interior: EdgeSet,
    boundary: EdgeSet,
    polygon: Vec<Point2>,
    generation: u64,
    cache: RefCell<ChordCache>,
    counters: ChordCounters,
}

impl ConvexDomain {
    pub fn new(cfg: DomainCfg) -> GeomResult<Self> {
        let built = Build::run(&cfg, cfg.bulge)?;
        Ok(Self {
            cfg,
            generators: built.generators,
            group_size: built.group_size,
            interior: built.interior,
            boundary: built.boundary,
            polygon: built.polygon,
            generation: 1,
            cache: RefCell::default(),
            counters: ChordCounters::default(),
        })
    }

    /// Rebuild for bulge `t`. On error the previous domain stays in place.
    pub fn set_bulge(&mut self, t: f64) -> GeomResult<()> {
        let built = Build::run(&self.cfg, t)?;
        self.cfg.bulge = t;
        self.generators = built.generators;
        self.group_size = built.group_size;
        self.interior = built.interior;
        self.boundary = built.boundary;
        self.polygon = built.polygon;
        self.generation += 1;
        Ok(())
    }

    /// Drop every cached chord side.
    pub fn clear_chord_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    #[inline]
    pub fn bulge(&self) -> f64 {
        self.cfg.bulge
    }

    #[inline]
    pub fn cfg(&self) -> &DomainCfg {
        &self.cfg
    }

    /// Elements enumerated for the current tiling (identity included).
    #[inline]
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    #[inline]
    pub fn generators(&self) -> &[Matrix3<f64>; 3] {
        &self.generators
    }

    /// Sides on the outer boundary.
    #[inline]
    pub fn boundary(&self) -> &[Edge] {
        self.boundary.as_slice()
    }

    /// Sides shared by two tiles.
    #[inline]
    pub fn interior(&self) -> &[Edge] {
        self.interior.as_slice()
    }

    /// Boundary vertices in counter-clockwise order.
    #[inline]
    pub fn polygon(&self) -> &[Point2] {
        &self.polygon
    }

    #[inline]
    pub fn is_boundary_edge(&self, e: &Edge) -> bool {
        self.boundary.contains(e)
    }

    #[inline]
    pub fn chord_stats(&self) -> ChordStats {
        self.counters.snapshot()
    }

    /// Strict interior of the boundary polygon.
    #[inline]
    pub fn contains(&self, p: &Point2) -> bool {
        convex_contains(&self.polygon, p)
    }

    /// Boundary points `(a, b)` on the line through `x` and `y`, `a` on the
    /// side of `x` (entry) and `b` on the side of `y` (exit).
    ///
    /// Recently hit sides are tried first; if they do not yield two distinct
    /// crossings, every boundary side is scanned and the crossing sides are
    /// remembered.
    pub fn chord(&self, x: &Point2, y: &Point2) -> GeomResult<Edge> {
        let d = y - x;
        if d.norm() < PARALLEL_EPS {
            return Err(GeomError::degenerate("chord of coincident points"));
        }
        {
            let cache = self.cache.borrow();
            let cached = cache
                .sides(self.generation)
                .filter_map(|s| intersect(x, &d, s));
            if let Some((lo, hi)) = extreme_hits(cached) {
                self.counters.hit();
                return Ok(Edge::new(lo.point, hi.point));
            }
        }
        self.counters.miss();
        let scanned = self.boundary.iter().filter_map(|s| intersect(x, &d, s));
        let (lo, hi) = extreme_hits(scanned).ok_or_else(|| {
            GeomError::degenerate(format!(
                "line through ({:.6}, {:.6}) and ({:.6}, {:.6}) misses the boundary",
                x.x, x.y, y.x, y.y
            ))
        })?;
        trace!(generation = self.generation, "chord cache miss, full scan");
        let mut cache = self.cache.borrow_mut();
        cache.remember(self.generation, lo.side);
        cache.remember(self.generation, hi.side);
        Ok(Edge::new(lo.point, hi.point))
    }

    /// Cross ratio of `x`, `y` with their chord.
    pub fn cross_ratio(&self, x: &Point2, y: &Point2) -> GeomResult<f64> {
        let ch = self.chord(x, y)?;
        cross_ratio_of(x, y, &ch.a, &ch.b)
    }

    /// Hilbert distance `½ ln CR`. Both points must be interior; coincident
    /// points are at distance 0.
    pub fn distance(&self, x: &Point2, y: &Point2) -> GeomResult<f64> {
        for p in [x, y] {
            if !self.contains(p) {
                return Err(GeomError::degenerate(format!(
                    "point ({:.6}, {:.6}) is not inside the domain",
                    p.x, p.y
                )));
            }
        }
        if x == y {
            return Ok(0.0);
        }
        Ok(0.5 * self.cross_ratio(x, y)?.ln())
    }

    /// Eigen-decomposition of each generator.
    pub fn generator_spectra(&self) -> GeomResult<Vec<Eigen>> {
        self.generators
            .iter()
            .map(|g| Matrix::from(*g).eigen())
            .collect()
    }

    /// Images of `seed` under words of length ≤ `depth`, deduplicated.
    pub fn orbit(&self, seed: &Point2, depth: usize) -> GeomResult<Vec<Point2>> {
        let gens: Vec<LinearMap> = self
            .generators
            .iter()
            .map(|g| LinearMap::new(Matrix::from(*g)))
            .collect();
        let pts = orbit(LinearMap::identity(3), &gens, &Vector::lift(seed), depth, |a, b| {
            match (a.homogenize(2), b.homogenize(2)) {
                (Ok(a), Ok(b)) => a.approx_eq(&b, 1e-9),
                _ => false,
            }
        })?;
        pts.iter().map(|v| v.homogenize(2)?.xy()).collect()
    }
}

/// Products of one rebuild, committed together.
struct Build {
    generators: [Matrix3<f64>; 3],
    group_size: usize,
    interior: EdgeSet,
    boundary: EdgeSet,
    polygon: Vec<Point2>,
}

impl Build {
    fn run(cfg: &DomainCfg, t: f64) -> GeomResult<Self> {
        if !t.is_finite() {
            return Err(GeomError::degenerate(format!("bulge {t} is not finite")));
        }
        let generators = reflection_generators(t)?;
        let elements = enumerate_words(&generators, cfg.max_word_len, cfg.group_tol);
        let tri = reference_triangle().map(|p| Vector3::new(p.x, p.y, 1.0));
        let mut tiles = Vec::with_capacity(elements.len());
        for g in &elements {
            let mut tile = [Point2::zeros(); 3];
            for (slot, v) in tile.iter_mut().zip(&tri) {
                let h = g.matrix * v;
                if h.z.abs() < PARALLEL_EPS {
                    return Err(GeomError::unstable(format!(
                        "tile vertex of word {:?} left the affine chart",
                        g.word
                    )));
                }
                *slot = h.xy() / h.z;
            }
            tiles.push(tile);
        }
        let tiling = assemble(tiles, cfg.edge_tol);
        let polygon = order_polygon(&tiling.boundary, cfg.edge_tol)?;
        debug!(
            bulge = t,
            elements = elements.len(),
            boundary = tiling.boundary.len(),
            interior = tiling.interior.len(),
            "domain rebuilt"
        );
        Ok(Self {
            generators,
            group_size: elements.len(),
            interior: tiling.interior,
            boundary: tiling.boundary,
            polygon,
        })
    }
}

#[cfg(test)]
mod tests;
