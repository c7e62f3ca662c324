//! Nearest-site rasters: Voronoi cells of a site set under a model's metric.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::cfg::{TessellateCfg, RASTER_SITE_WARN};
use crate::error::{GeomError, GeomResult};
use crate::model::Model;
use crate::Point2;

/// Label grid sampled every `stride` pixels; `None` outside the model.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestSiteRaster {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    labels: Vec<Option<usize>>,
}

impl NearestSiteRaster {
    #[inline]
    pub fn cols(&self) -> usize {
        self.width.div_ceil(self.stride)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.height.div_ceil(self.stride)
    }

    /// Row-major labels, one per sampled cell.
    #[inline]
    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    /// Label of the cell covering canvas pixel `(x, y)`.
    pub fn label_at(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels[(y / self.stride) * self.cols() + x / self.stride]
    }

    /// Number of sampled cells per site index.
    pub fn cell_sizes(&self, n_sites: usize) -> Vec<usize> {
        let mut out = vec![0; n_sites];
        for l in self.labels.iter().flatten() {
            if let Some(c) = out.get_mut(*l) {
                *c += 1;
            }
        }
        out
    }
}

/// Label every `stride`-th canvas pixel with its nearest site under `model`.
///
/// `sites` are canvas points and must lie inside the model. Ties go to the
/// lower site index; pixels where every distance fails stay `None`.
pub fn tessellate<M: Model + ?Sized>(
    model: &M,
    cfg: &TessellateCfg,
    sites: &[Point2],
) -> GeomResult<NearestSiteRaster> {
    if cfg.stride == 0 {
        return Err(GeomError::degenerate("raster stride must be positive"));
    }
    if sites.len() > RASTER_SITE_WARN {
        warn!(
            sites = sites.len(),
            pixels = cfg.width * cfg.height / (cfg.stride * cfg.stride),
            "large site count, nearest-site raster will be slow"
        );
    }
    let mut model_sites = Vec::with_capacity(sites.len());
    for s in sites {
        let m = model.canvas_to_model(s);
        if !model.contains(&m) {
            return Err(GeomError::degenerate(format!(
                "site ({:.1}, {:.1}) is outside the {} model",
                s.x,
                s.y,
                model.name()
            )));
        }
        model_sites.push(m);
    }

    let (cols, rows) = (cfg.width.div_ceil(cfg.stride), cfg.height.div_ceil(cfg.stride));
    let mut labels = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let px = Point2::new((c * cfg.stride) as f64, (r * cfg.stride) as f64);
            let z = model.canvas_to_model(&px);
            if !model.contains(&z) {
                labels.push(None);
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for (i, s) in model_sites.iter().enumerate() {
                let Ok(d) = model.distance(&z, s) else {
                    continue;
                };
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((i, d));
                }
            }
            labels.push(best.map(|(i, _)| i));
        }
    }
    debug!(model = model.name(), sites = sites.len(), cols, rows, "raster labelled");
    Ok(NearestSiteRaster {
        width: cfg.width,
        height: cfg.height,
        stride: cfg.stride,
        labels,
    })
}

/// `n` points uniform in the disk of radius `radius` (model coordinates),
/// reproducible from `seed`.
pub fn sample_sites(n: usize, radius: f64, seed: u64) -> Vec<Point2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let r = radius * rng.gen::<f64>().sqrt();
            let th = rng.gen_range(0.0..std::f64::consts::TAU);
            Point2::new(r * th.cos(), r * th.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::DomainCfg;
    use crate::model::{CanvasFrame, ConvexProjectiveModel, KleinModel, PoincareModel};

    fn frame() -> CanvasFrame {
        CanvasFrame::new(Point2::new(200.0, 200.0), 150.0)
    }

    fn cfg(stride: usize) -> TessellateCfg {
        TessellateCfg {
            width: 400,
            height: 400,
            stride,
        }
    }

    #[test]
    fn symmetric_sites_split_the_disk() {
        let m = PoincareModel::new(frame());
        let sites = [Point2::new(140.0, 200.0), Point2::new(260.0, 200.0)];
        let r = tessellate(&m, &cfg(4), &sites).unwrap();
        assert_eq!((r.cols(), r.rows()), (100, 100));
        assert_eq!(r.label_at(0, 0), None);
        assert_eq!(r.label_at(120, 200), Some(0));
        assert_eq!(r.label_at(280, 200), Some(1));
        assert_eq!(r.label_at(180, 120), Some(0));
        assert_eq!(r.label_at(400, 200), None);
        let sizes = r.cell_sizes(2);
        let inside = r.labels().iter().flatten().count();
        assert_eq!(sizes.iter().sum::<usize>(), inside);
        // mirrored columns pair up; the x = 200 column ties and goes to site 0
        let middle = (0..r.rows()).filter(|&row| r.labels()[row * r.cols() + 50].is_some()).count();
        assert_eq!(sizes[0] - sizes[1], middle);
    }

    #[test]
    fn single_site_owns_the_model() {
        let m = KleinModel::new(frame());
        let r = tessellate(&m, &cfg(10), &[Point2::new(210.0, 190.0)]).unwrap();
        assert!(r.labels().iter().all(|l| l.is_none() || *l == Some(0)));
        assert!(r.cell_sizes(1)[0] > 0);
    }

    #[test]
    fn hilbert_raster_labels_every_site() {
        let m = ConvexProjectiveModel::new(
            frame(),
            DomainCfg {
                max_word_len: 4,
                ..DomainCfg::with_bulge(0.5)
            },
        )
        .unwrap();
        let sites: Vec<Point2> = [(0.0, 0.0), (0.3, 0.0), (-0.3, 0.0), (0.0, 0.3), (0.0, -0.3)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .map(|p| m.model_to_canvas(&p))
            .collect();
        let r = tessellate(&m, &cfg(8), &sites).unwrap();
        assert!(r.cell_sizes(sites.len()).iter().all(|n| *n > 0));
    }

    #[test]
    fn invalid_inputs() {
        let m = PoincareModel::new(frame());
        assert!(tessellate(&m, &cfg(0), &[]).is_err());
        assert!(tessellate(&m, &cfg(4), &[Point2::new(399.0, 399.0)])
            .unwrap_err()
            .is_degenerate());
        let empty = tessellate(&m, &cfg(20), &[]).unwrap();
        assert!(empty.labels().iter().all(Option::is_none));
    }

    #[test]
    fn sampled_sites_are_reproducible() {
        let a = sample_sites(16, 0.7, 9);
        assert_eq!(a, sample_sites(16, 0.7, 9));
        assert_ne!(a, sample_sites(16, 0.7, 10));
        assert!(a.iter().all(|p| p.norm() <= 0.7));
    }
}
