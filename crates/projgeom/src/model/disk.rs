//! Unit-disk logic shared by the Poincaré and Klein models.

use super::CanvasFrame;
use crate::error::{GeomError, GeomResult};
use crate::simplex::Edge;
use crate::Point2;

/// Open unit disk drawn through a canvas frame.
#[derive(Clone, Copy, Debug)]
pub struct UnitDisk {
    pub frame: CanvasFrame,
}

impl UnitDisk {
    #[inline]
    pub fn new(frame: CanvasFrame) -> Self {
        Self { frame }
    }

    #[inline]
    pub fn contains(&self, p: &Point2) -> bool {
        p.norm_squared() < 1.0
    }

    pub fn require_inside(&self, p: &Point2) -> GeomResult<()> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(GeomError::degenerate(format!(
                "point ({:.6}, {:.6}) is not inside the unit disk",
                p.x, p.y
            )))
        }
    }

    /// Intersections of the line through `x`, `y` with the unit circle; `a` lies
    /// beyond `x`, `b` beyond `y`.
    pub fn chord(&self, x: &Point2, y: &Point2) -> GeomResult<Edge> {
        let d = y - x;
        let qa = d.norm_squared();
        if qa == 0.0 {
            return Err(GeomError::degenerate("chord of coincident points"));
        }
        let qb = 2.0 * x.dot(&d);
        let qc = x.norm_squared() - 1.0;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc <= 0.0 {
            return Err(GeomError::degenerate("line misses the unit circle"));
        }
        let root = disc.sqrt();
        let u_lo = (-qb - root) / (2.0 * qa);
        let u_hi = (-qb + root) / (2.0 * qa);
        Ok(Edge::new(x + d * u_lo, x + d * u_hi))
    }
}
