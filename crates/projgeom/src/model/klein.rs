//! Klein (Beltrami–Klein) disk model: straight geodesics, cross-ratio metric.

use super::disk::UnitDisk;
use super::{CanvasFrame, Model};
use crate::domain::cross_ratio_of;
use crate::error::GeomResult;
use crate::Point2;

#[derive(Clone, Copy, Debug)]
pub struct KleinModel {
    disk: UnitDisk,
}

impl KleinModel {
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

    /// Cross ratio of `x`, `y` against the unit-circle chord through them.
    pub fn cross_ratio(&self, x: &Point2, y: &Point2) -> GeomResult<f64> {
        self.disk.require_inside(x)?;
        self.disk.require_inside(y)?;
        let chord = self.disk.chord(x, y)?;
        cross_ratio_of(x, y, &chord.a, &chord.b)
    }
}

/// `k = 2p / (1 + ‖p‖²)`.
#[inline]
pub fn poincare_to_klein(p: &Point2) -> Point2 {
    p * (2.0 / (1.0 + p.norm_squared()))
}

/// `p = k / (1 + √(1 − ‖k‖²))`.
#[inline]
pub fn klein_to_poincare(k: &Point2) -> Point2 {
    k / (1.0 + (1.0 - k.norm_squared()).max(0.0).sqrt())
}

impl Model for KleinModel {
    #[inline]
    fn name(&self) -> &'static str {
        "klein"
    }

    #[inline]
    fn frame(&self) -> &CanvasFrame {
        &self.disk.frame
    }

    #[inline]
    fn contains(&self, p: &Point2) -> bool {
        self.disk.contains(p)
    }

    /// `½ ln CR(x, y)`; coincident points are at distance 0.
    fn distance(&self, p: &Point2, q: &Point2) -> GeomResult<f64> {
        self.disk.require_inside(p)?;
        self.disk.require_inside(q)?;
        if p == q {
            return Ok(0.0);
        }
        Ok(0.5 * self.cross_ratio(p, q)?.ln())
    }
}
