//! Box-walking tracer for metric bisectors.
//!
//! Traces `{z : |d(p, z) − d(z, q)| < ε}` in canvas coordinates:
//! - seed: first grid point of the (inflated) bounding box of `p`, `q` inside
//!   the tolerance band, scanned column by column;
//! - walks: from the seed, repeatedly scan a small pixel box and move to the
//!   in-band point furthest along `±n`, where `n` is `q − p` turned by 90°;
//! - the band narrows as points accumulate: `ε ← ε − ε / count`.
//!
//! The shrinking band trades reach for accuracy: long walks end once no grid
//! point is close enough to the bisector.

use tracing::{debug, warn};

use crate::error::{GeomError, GeomResult};
use crate::model::Model;
use crate::Point2;

/// What the tracer records besides the accepted points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceMode {
    /// Accepted points only.
    #[default]
    Curve,
    /// Also every scanned grid point with its gap.
    Gradient,
}

#[derive(Clone, Copy, Debug)]
pub struct BisectorCfg {
    /// Initial tolerance on `|d(p, z) − d(z, q)|`.
    pub eps: f64,
    /// Pixel spacing of the seed scan.
    pub seed_step: f64,
    /// Half-width of the local box, in grid steps.
    pub box_radius: i32,
    /// Pixel spacing inside the local box.
    pub step: f64,
    /// Upper bound on accepted points per walk.
    pub max_steps: usize,
    pub mode: TraceMode,
}

impl Default for BisectorCfg {
    fn default() -> Self {
        Self {
            eps: 0.05,
            seed_step: 5.0,
            box_radius: 3,
            step: 1.0,
            max_steps: 500,
            mode: TraceMode::Curve,
        }
    }
}

/// Scanned grid point and its distance gap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub point: Point2,
    pub gap: f64,
}

/// Result of one trace, in canvas coordinates.
#[derive(Clone, Debug, Default)]
pub struct BisectorTrace {
    pub seed: Option<Point2>,
    /// Walk along `+n`, nearest the seed first.
    pub forward: Vec<Point2>,
    /// Walk along `−n`, nearest the seed first.
    pub backward: Vec<Point2>,
    /// Populated in `TraceMode::Gradient` only.
    pub samples: Vec<Sample>,
    /// Tolerance after the last accepted point.
    pub final_eps: f64,
}

impl BisectorTrace {
    /// One polyline: backward walk (reversed), seed, forward walk.
    pub fn points(&self) -> Vec<Point2> {
        let Some(seed) = self.seed else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.backward.iter().rev().copied());
        out.push(seed);
        out.extend(self.forward.iter().copied());
        out
    }

    /// Accepted points, seed included.
    pub fn len(&self) -> usize {
        self.seed.map_or(0, |_| 1 + self.forward.len() + self.backward.len())
    }

    pub fn is_empty(&self) -> bool {
        self.seed.is_none()
    }
}

struct Tracer<'a, M: ?Sized> {
    model: &'a M,
    p: Point2,
    q: Point2,
    cfg: &'a BisectorCfg,
    eps: f64,
    count: usize,
    samples: Vec<Sample>,
}

impl<M: Model + ?Sized> Tracer<'_, M> {
    /// Gap at a canvas point, `None` outside the model or where the metric fails.
    fn gap(&mut self, z: Point2) -> Option<f64> {
        if !self.model.contains(&self.model.canvas_to_model(&z)) {
            return None;
        }
        let dp = self.model.canvas_distance(&self.p, &z).ok()?;
        let dq = self.model.canvas_distance(&z, &self.q).ok()?;
        let gap = (dp - dq).abs();
        if self.cfg.mode == TraceMode::Gradient {
            self.samples.push(Sample { point: z, gap });
        }
        Some(gap)
    }

    fn seed(&mut self) -> Option<Point2> {
        let s = self.cfg.seed_step;
        let (x0, x1) = (self.p.x.min(self.q.x) - s, self.p.x.max(self.q.x) + s);
        let (y0, y1) = (self.p.y.min(self.q.y) - s, self.p.y.max(self.q.y) + s);
        let nx = ((x1 - x0) / s).floor() as usize;
        let ny = ((y1 - y0) / s).floor() as usize;
        for i in 0..=nx {
            for j in 0..=ny {
                let z = Point2::new(x0 + i as f64 * s, y0 + j as f64 * s);
                if self.gap(z).is_some_and(|g| g < self.eps) {
                    return Some(z);
                }
            }
        }
        None
    }

    /// One step: best in-band box point with positive displacement along `dir`.
    fn advance(&mut self, cur: Point2, dir: Point2) -> Option<Point2> {
        let r = self.cfg.box_radius;
        let mut best: Option<(f64, f64, Point2)> = None;
        for i in -r..=r {
            for j in -r..=r {
                if i == 0 && j == 0 {
                    continue;
                }
                let z = cur + Point2::new(i as f64, j as f64) * self.cfg.step;
                let Some(gap) = self.gap(z) else {
                    continue;
                };
                if gap >= self.eps {
                    continue;
                }
                let disp = dir.dot(&(z - cur));
                let better = match best {
                    None => true,
                    Some((bd, bg, _)) => disp > bd || (disp == bd && gap < bg),
                };
                if better {
                    best = Some((disp, gap, z));
                }
            }
        }
        best.filter(|(disp, _, _)| *disp > 0.0).map(|(_, _, z)| z)
    }

    fn walk(&mut self, seed: Point2, dir: Point2) -> Vec<Point2> {
        let mut out = Vec::new();
        let mut cur = seed;
        while out.len() < self.cfg.max_steps {
            let Some(next) = self.advance(cur, dir) else {
                break;
            };
            self.count += 1;
            self.eps -= self.eps / self.count as f64;
            out.push(next);
            cur = next;
        }
        out
    }
}

/// Trace the bisector of canvas points `p` and `q` under `model`'s metric.
///
/// Without a seed inside the tolerance band the trace is empty (and a warning
/// is logged). `p == q` or a point outside the model is `DegenerateGeometry`.
pub fn trace_bisector<M: Model + ?Sized>(
    model: &M,
    p: &Point2,
    q: &Point2,
    cfg: &BisectorCfg,
) -> GeomResult<BisectorTrace> {
    let pq = q - p;
    if pq.norm() == 0.0 {
        return Err(GeomError::degenerate("bisector of coincident points"));
    }
    for c in [p, q] {
        if !model.contains(&model.canvas_to_model(c)) {
            return Err(GeomError::degenerate(format!(
                "bisector site ({:.1}, {:.1}) is outside the {} model",
                c.x,
                c.y,
                model.name()
            )));
        }
    }
    let normal = Point2::new(-pq.y, pq.x).normalize();
    let mut tr = Tracer {
        model,
        p: *p,
        q: *q,
        cfg,
        eps: cfg.eps,
        count: 0,
        samples: Vec::new(),
    };
    let Some(seed) = tr.seed() else {
        warn!(
            model = model.name(),
            eps = cfg.eps,
            "no bisector seed inside the tolerance band"
        );
        return Ok(BisectorTrace {
            final_eps: tr.eps,
            samples: tr.samples,
            ..BisectorTrace::default()
        });
    };
    tr.count = 1;
    let forward = tr.walk(seed, normal);
    let backward = tr.walk(seed, -normal);
    debug!(
        model = model.name(),
        forward = forward.len(),
        backward = backward.len(),
        final_eps = tr.eps,
        "bisector traced"
    );
    Ok(BisectorTrace {
        seed: Some(seed),
        forward,
        backward,
        samples: tr.samples,
        final_eps: tr.eps,
    })
}
