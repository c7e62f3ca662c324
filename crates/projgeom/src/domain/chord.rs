//! Chords through the boundary polygon and the cross ratio.

use std::cell::Cell;
use std::collections::VecDeque;

use crate::cfg::{CHORD_CACHE_CAP, CROSS_RATIO_EPS, HIT_EPS, PARALLEL_EPS};
use crate::error::{GeomError, GeomResult};
use crate::simplex::Edge;
use crate::Point2;

#[inline]
fn cross(a: &Point2, b: &Point2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Where the line `x + u·d` crosses a boundary side.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Hit {
    /// Line parameter: `u < 0` lies beyond `x`, `u > 1` beyond `y`.
    pub u: f64,
    pub point: Point2,
    pub side: Edge,
}

/// Intersection of the line through `x` with direction `d` and the side `e`.
///
/// The side parameter must land in `[−HIT_EPS, 1 + HIT_EPS]`; (near-)parallel
/// sides never hit.
pub(crate) fn intersect(x: &Point2, d: &Point2, e: &Edge) -> Option<Hit> {
    let ev = e.b - e.a;
    let denom = cross(&ev, d);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let w = x - e.a;
    let s = cross(&w, d) / denom;
    if !(-HIT_EPS..=1.0 + HIT_EPS).contains(&s) {
        return None;
    }
    let u = cross(&w, &ev) / denom;
    Some(Hit {
        u,
        point: e.a + ev * s,
        side: *e,
    })
}

/// Entry (minimal `u`) and exit (maximal `u`) among `hits`.
///
/// Needs two hits at distinct points; a line through a single vertex of the
/// polygon, or no hit at all, gives `None`.
pub(crate) fn extreme_hits<I>(hits: I) -> Option<(Hit, Hit)>
where
    I: IntoIterator<Item = Hit>,
{
    let mut it = hits.into_iter();
    let first = it.next()?;
    let (lo, hi) = it.fold((first, first), |(lo, hi), h| {
        (
            if h.u < lo.u { h } else { lo },
            if h.u > hi.u { h } else { hi },
        )
    });
    (hi.u - lo.u > HIT_EPS).then_some((lo, hi))
}

/// `CR(x, y; a, b) = (|y−a| |b−x|) / (|x−a| |b−y|)` with `a` the chord end
/// behind `x` along the direction `x → y`. Ends passed the other way round
/// are swapped.
pub fn cross_ratio_of(x: &Point2, y: &Point2, a: &Point2, b: &Point2) -> GeomResult<f64> {
    let d = y - x;
    let (a, b) = if (a - x).dot(&d) <= (b - x).dot(&d) {
        (a, b)
    } else {
        (b, a)
    };
    let den = (x - a).norm() * (b - y).norm();
    if den < CROSS_RATIO_EPS {
        return Err(GeomError::degenerate(
            "cross ratio with a point on the boundary",
        ));
    }
    Ok((y - a).norm() * (b - x).norm() / den)
}

/// Recently hit boundary sides, tagged with the boundary generation they
/// belong to. A generation mismatch reads as empty.
#[derive(Debug, Default)]
pub(crate) struct ChordCache {
    generation: u64,
    sides: VecDeque<Edge>,
}

impl ChordCache {
    pub fn clear(&mut self) {
        self.sides.clear();
    }

    pub fn sides(&self, generation: u64) -> impl Iterator<Item = &Edge> + '_ {
        let live = self.generation == generation;
        self.sides.iter().filter(move |_| live)
    }

    pub fn remember(&mut self, generation: u64, side: Edge) {
        if self.generation != generation {
            self.sides.clear();
            self.generation = generation;
        }
        if let Some(pos) = self.sides.iter().position(|s| s.equals(&side, 0.0)) {
            self.sides.remove(pos);
        }
        self.sides.push_front(side);
        self.sides.truncate(CHORD_CACHE_CAP);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sides.len()
    }
}

/// Lookup counters for the chord cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChordStats {
    /// Chords answered from cached sides alone.
    pub cached: u64,
    /// Chords that needed a scan of every boundary side.
    pub scanned: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ChordCounters {
    cached: Cell<u64>,
    scanned: Cell<u64>,
}

impl ChordCounters {
    pub fn hit(&self) {
        self.cached.set(self.cached.get() + 1);
    }

    pub fn miss(&self) {
        self.scanned.set(self.scanned.get() + 1);
    }

    pub fn snapshot(&self) -> ChordStats {
        ChordStats {
            cached: self.cached.get(),
            scanned: self.scanned.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_reports_line_and_side_parameters() {
        let side = Edge::new(Point2::new(1.0, -1.0), Point2::new(1.0, 1.0));
        let x = Point2::new(0.0, 0.0);
        let d = Point2::new(0.5, 0.25);
        let h = intersect(&x, &d, &side).unwrap();
        assert!((h.u - 2.0).abs() < 1e-12);
        assert!((h.point - Point2::new(1.0, 0.5)).norm() < 1e-12);

        // parallel and out-of-range sides miss
        assert!(intersect(&x, &Point2::new(0.0, 1.0), &side).is_none());
        assert!(intersect(&x, &Point2::new(0.25, 1.0), &side).is_none());
    }

    #[test]
    fn extreme_hits_need_two_distinct_points() {
        let side = Edge::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let h = |u: f64| Hit {
            u,
            point: Point2::new(u, 0.0),
            side,
        };
        let (lo, hi) = extreme_hits([h(0.5), h(-2.0), h(3.0), h(1.0)]).unwrap();
        assert_eq!((lo.u, hi.u), (-2.0, 3.0));
        assert!(extreme_hits([h(0.5), h(0.5)]).is_none());
        assert!(extreme_hits(Vec::new()).is_none());
    }

    #[test]
    fn cross_ratio_orders_chord_ends() {
        let x = Point2::new(-0.5, 0.0);
        let y = Point2::new(0.5, 0.0);
        let a = Point2::new(-1.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let cr = cross_ratio_of(&x, &y, &a, &b).unwrap();
        // (1.5 · 1.5) / (0.5 · 0.5)
        assert!((cr - 9.0).abs() < 1e-12);
        assert_eq!(cross_ratio_of(&x, &y, &b, &a).unwrap(), cr);
        assert!(cross_ratio_of(&a, &y, &a, &b).unwrap_err().is_degenerate());
    }

    #[test]
    fn cache_is_bounded_and_generation_scoped() {
        let mut c = ChordCache::default();
        for i in 0..(CHORD_CACHE_CAP + 3) {
            let s = Edge::new(Point2::new(i as f64, 0.0), Point2::new(i as f64, 1.0));
            c.remember(1, s);
        }
        assert_eq!(c.len(), CHORD_CACHE_CAP);
        assert_eq!(c.sides(1).count(), CHORD_CACHE_CAP);
        assert_eq!(c.sides(2).count(), 0);

        // re-remembering moves to the front without growing
        let again = Edge::new(Point2::new(5.0, 0.0), Point2::new(5.0, 1.0));
        c.remember(1, again);
        assert_eq!(c.len(), CHORD_CACHE_CAP);
        assert!(c.sides(1).next().unwrap().equals(&again, 0.0));

        c.remember(2, again);
        assert_eq!(c.len(), 1);
        c.clear();
        assert_eq!(c.sides(2).count(), 0);
    }
}
