//! Tiling edge bookkeeping and boundary polygon assembly.
//!
//! Every tile contributes its three sides. A side seen twice is shared by two
//! tiles and is interior; a side seen once lies on the outer boundary. Endpoints
//! are snapped to an `edge_tol` grid so sides computed through different group
//! words still meet.

use std::collections::HashMap;

use crate::error::{GeomError, GeomResult};
use crate::linalg::grid_key;
use crate::simplex::Edge;
use crate::Point2;

type PointKey = (i64, i64);
type EdgeKey = (PointKey, PointKey);

#[inline]
fn point_key(p: &Point2, tol: f64) -> PointKey {
    (grid_key(p.x, tol), grid_key(p.y, tol))
}

#[inline]
fn edge_key(e: &Edge, tol: f64) -> EdgeKey {
    let ka = point_key(&e.a, tol);
    let kb = point_key(&e.b, tol);
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Insertion-ordered edge set with tolerant, orientation-free membership.
#[derive(Clone, Debug)]
pub struct EdgeSet {
    edges: Vec<Edge>,
    index: HashMap<EdgeKey, usize>,
    tol: f64,
}

impl EdgeSet {
    pub fn new(tol: f64) -> Self {
        Self {
            edges: Vec::new(),
            index: HashMap::new(),
            tol,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    #[inline]
    pub fn contains(&self, e: &Edge) -> bool {
        self.index.contains_key(&edge_key(e, self.tol))
    }

    /// Returns `false` when an equal edge is already present.
    pub fn insert(&mut self, e: Edge) -> bool {
        let key = edge_key(&e, self.tol);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.edges.len());
        self.edges.push(e);
        true
    }

    /// Swap-removes the edge equal to `e`; returns whether one was present.
    pub fn remove(&mut self, e: &Edge) -> bool {
        let Some(idx) = self.index.remove(&edge_key(e, self.tol)) else {
            return false;
        };
        self.edges.swap_remove(idx);
        if let Some(moved) = self.edges.get(idx) {
            let key = edge_key(moved, self.tol);
            self.index.insert(key, idx);
        }
        true
    }
}

/// Interior and boundary sides of a tiling.
#[derive(Clone, Debug)]
pub(crate) struct Tiling {
    pub interior: EdgeSet,
    pub boundary: EdgeSet,
}

/// Classify the sides of `tiles`.
///
/// A side already recorded is dropped from the boundary; a new side goes into
/// both sets. Once all tiles are in, boundary sides are removed from the
/// interior so the two sets are disjoint.
pub(crate) fn assemble<I>(tiles: I, tol: f64) -> Tiling
where
    I: IntoIterator<Item = [Point2; 3]>,
{
    let mut interior = EdgeSet::new(tol);
    let mut boundary = EdgeSet::new(tol);
    for [p0, p1, p2] in tiles {
        for e in [Edge::new(p0, p1), Edge::new(p1, p2), Edge::new(p2, p0)] {
            if interior.contains(&e) {
                boundary.remove(&e);
            } else {
                interior.insert(e);
                boundary.insert(e);
            }
        }
    }
    for e in boundary.iter() {
        interior.remove(e);
    }
    Tiling { interior, boundary }
}

/// Walk the boundary sides into one closed counter-clockwise polygon.
///
/// Every vertex must carry exactly two sides and the walk must use every side;
/// anything else means the tiling did not close up.
pub(crate) fn order_polygon(boundary: &EdgeSet, tol: f64) -> GeomResult<Vec<Point2>> {
    let edges = boundary.as_slice();
    if edges.len() < 3 {
        return Err(GeomError::degenerate(format!(
            "boundary has {} sides",
            edges.len()
        )));
    }
    let mut incident: HashMap<PointKey, Vec<usize>> = HashMap::with_capacity(edges.len());
    for (i, e) in edges.iter().enumerate() {
        incident.entry(point_key(&e.a, tol)).or_default().push(i);
        incident.entry(point_key(&e.b, tol)).or_default().push(i);
    }
    if let Some((k, sides)) = incident.iter().find(|(_, s)| s.len() != 2) {
        return Err(GeomError::degenerate(format!(
            "boundary vertex near ({:.6}, {:.6}) has {} sides",
            k.0 as f64 * tol,
            k.1 as f64 * tol,
            sides.len()
        )));
    }

    let start = point_key(&edges[0].a, tol);
    let mut poly = Vec::with_capacity(edges.len());
    let (mut side, mut at) = (0usize, edges[0].a);
    loop {
        poly.push(at);
        let e = &edges[side];
        let next = if point_key(&e.a, tol) == point_key(&at, tol) {
            e.b
        } else {
            e.a
        };
        let key = point_key(&next, tol);
        if key == start {
            break;
        }
        if poly.len() > edges.len() {
            break;
        }
        let sides = &incident[&key];
        side = if sides[0] == side { sides[1] } else { sides[0] };
        at = next;
    }
    if poly.len() != edges.len() {
        return Err(GeomError::degenerate(format!(
            "boundary splits into several loops ({} of {} sides walked)",
            poly.len(),
            edges.len()
        )));
    }
    if signed_area(&poly) < 0.0 {
        poly.reverse();
    }
    Ok(poly)
}

/// Shoelace area, positive for counter-clockwise vertex order.
pub(crate) fn signed_area(poly: &[Point2]) -> f64 {
    let n = poly.len();
    0.5 * (0..n)
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % n]);
            a.x * b.y - a.y * b.x
        })
        .sum::<f64>()
}

/// Strict interior test for a convex counter-clockwise polygon.
pub(crate) fn convex_contains(poly: &[Point2], p: &Point2) -> bool {
    let n = poly.len();
    n >= 3
        && (0..n).all(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % n]);
            let e = b - a;
            let w = p - a;
            e.x * w.y - e.y * w.x > 0.0
        })
}
