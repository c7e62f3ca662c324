//! Convex-projective model: a bulged domain with its Hilbert metric.

use super::{CanvasFrame, Model};
use crate::cfg::DomainCfg;
use crate::domain::ConvexDomain;
use crate::error::GeomResult;
use crate::Point2;

#[derive(Debug)]
pub struct ConvexProjectiveModel {
    frame: CanvasFrame,
    domain: ConvexDomain,
}

impl ConvexProjectiveModel {
    pub fn new(frame: CanvasFrame, cfg: DomainCfg) -> GeomResult<Self> {
        Ok(Self {
            frame,
            domain: ConvexDomain::new(cfg)?,
        })
    }

    #[inline]
    pub fn domain(&self) -> &ConvexDomain {
        &self.domain
    }

    /// Rebuild for a new bulge and drop cached chords in the same step.
    pub fn set_bulge(&mut self, t: f64) -> GeomResult<()> {
        self.domain.set_bulge(t)?;
        self.domain.clear_chord_cache();
        Ok(())
    }
}

impl Model for ConvexProjectiveModel {
    #[inline]
    fn name(&self) -> &'static str {
        "hilbert"
    }

    #[inline]
    fn frame(&self) -> &CanvasFrame {
        &self.frame
    }

    #[inline]
    fn contains(&self, p: &Point2) -> bool {
        self.domain.contains(p)
    }

    #[inline]
    fn distance(&self, p: &Point2, q: &Point2) -> GeomResult<f64> {
        self.domain.distance(p, q)
    }
}
