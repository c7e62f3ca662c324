//! Bowyer–Watson triangulation under an arbitrary `DistanceFn`.
//!
//! Circumcircles come from `Simplex::circumcircle` with the caller's metric.
//! Where that metric cannot produce or evaluate a circumcircle (typically a
//! center or super vertex outside a bounded model) the Euclidean circumcircle
//! of the same triangle is used instead.
//!
//! Each cavity grows from the triangle that contains the new point, across
//! shared edges, while the neighbour's ball contains the point. A metric ball
//! is not a Euclidean disk, so the cavity is checked before it is replaced: it
//! must keep every old vertex on its rim, see every rim edge from the new point,
//! and keep its area. A cavity that fails is shrunk to the enclosing triangle
//! (plus the neighbour across an edge the point lies on).

use nalgebra::Vector3;
use tracing::debug;

use crate::error::{GeomError, GeomResult};
use crate::simplex::{Circumcircle, DistanceFn, Edge, Euclidean, Simplex};
use crate::Point2;

#[inline]
fn lift(p: &Point2) -> Vector3<f64> {
    Vector3::new(p.x, p.y, 1.0)
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
fn orient(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `v` on the line through `e`, relative to the edge length.
#[inline]
fn on_line(e: &Edge<Vector3<f64>>, v: &Vector3<f64>) -> bool {
    orient(&e.a, &e.b, v).abs() <= 1e-12 * (e.b - e.a).xy().norm_squared()
}

/// Triangle plus the circumcircle used for its in-circle test.
#[derive(Clone, Debug)]
struct Cell {
    simplex: Simplex,
    circle: Circumcircle,
    /// `true` when `circle` was computed with the caller's metric.
    metric: bool,
}

impl Cell {
    fn new<D: DistanceFn + ?Sized>(vertices: [Vector3<f64>; 3], metric: &D, fallbacks: &mut usize) -> GeomResult<Self> {
        let simplex = Simplex::new(vertices.to_vec())?;
        match Self::metric_circle(&simplex, metric) {
            Ok(circle) => Ok(Self {
                simplex,
                circle,
                metric: true,
            }),
            Err(_) => {
                *fallbacks += 1;
                let circle = simplex.circumcircle(&Euclidean)?;
                Ok(Self {
                    simplex,
                    circle,
                    metric: false,
                })
            }
        }
    }

    /// Cayley–Menger center, with the radius widened so every vertex lies on
    /// or inside its own ball.
    fn metric_circle<D: DistanceFn + ?Sized>(simplex: &Simplex, metric: &D) -> GeomResult<Circumcircle> {
        let mut circle = simplex.circumcircle(metric)?;
        for v in simplex.vertices() {
            circle.radius = circle.radius.max(metric.distance(&circle.center, v)?);
        }
        Ok(circle)
    }

    fn contains<D: DistanceFn + ?Sized>(&self, v: &Vector3<f64>, metric: &D, fallbacks: &mut usize) -> GeomResult<bool> {
        if self.metric {
            if let Ok(inside) = self.circle.contains(v, metric) {
                return Ok(inside);
            }
            *fallbacks += 1;
            let euclid = self.simplex.circumcircle(&Euclidean)?;
            return euclid.contains(v, &Euclidean);
        }
        self.circle.contains(v, &Euclidean)
    }

    #[inline]
    fn orientation(&self) -> f64 {
        let v = self.simplex.vertices();
        orient(&v[0], &v[1], &v[2])
    }

    /// Closed point-in-triangle test.
    fn encloses(&self, v: &Vector3<f64>) -> bool {
        let s = self.orientation().signum();
        self.simplex
            .edges()
            .iter()
            .all(|e| s * orient(&e.a, &e.b, v) >= 0.0)
    }
}

/// Index of the cell other than `i` that shares edge `e`.
fn neighbour(cells: &[Cell], i: usize, e: &Edge<Vector3<f64>>) -> Option<usize> {
    cells
        .iter()
        .enumerate()
        .find(|(j, c)| *j != i && c.simplex.edges().iter().any(|f| f.equals(e, 0.0)))
        .map(|(j, _)| j)
}

/// The enclosing cell plus the neighbours across edges `v` lies on.
fn minimal_cavity(cells: &[Cell], seed: usize, v: &Vector3<f64>) -> Vec<usize> {
    let mut bad = vec![seed];
    for e in cells[seed].simplex.edges() {
        if on_line(e, v) {
            if let Some(j) = neighbour(cells, seed, e) {
                bad.push(j);
            }
        }
    }
    bad
}

/// Cells reachable from the minimal cavity whose balls contain `v`.
fn grow_cavity<D: DistanceFn + ?Sized>(
    cells: &[Cell],
    seed: usize,
    v: &Vector3<f64>,
    metric: &D,
    fallbacks: &mut usize,
) -> GeomResult<Vec<usize>> {
    let mut bad = minimal_cavity(cells, seed, v);
    let mut queue = bad.clone();
    while let Some(i) = queue.pop() {
        for e in cells[i].simplex.edges() {
            let Some(j) = neighbour(cells, i, e) else {
                continue;
            };
            if !bad.contains(&j) && cells[j].contains(v, metric, fallbacks)? {
                bad.push(j);
                queue.push(j);
            }
        }
    }
    Ok(bad)
}

/// Triangles joining `v` to the rim of `bad`, or `None` when the cavity would
/// lose a vertex, has a rim edge facing away from `v`, or changes area.
fn cavity_fan(cells: &[Cell], bad: &[usize], v: &Vector3<f64>) -> Option<Vec<[Vector3<f64>; 3]>> {
    // rim: edges owned by exactly one bad triangle, with that triangle's orientation
    let mut rim: Vec<(Edge<Vector3<f64>>, usize, f64)> = Vec::new();
    let mut removed = 0.0;
    for &i in bad {
        let s = cells[i].orientation();
        removed += s.abs();
        for e in cells[i].simplex.edges() {
            match rim.iter_mut().find(|(f, _, _)| f.equals(e, 0.0)) {
                Some((_, n, _)) => *n += 1,
                None => rim.push((*e, 1, s.signum())),
            }
        }
    }
    rim.retain(|(_, n, _)| *n == 1);

    let on_rim = |u: &Vector3<f64>| rim.iter().any(|(e, _, _)| e.has_endpoint(u, 0.0));
    if !bad
        .iter()
        .all(|&i| cells[i].simplex.vertices().iter().all(|u| on_rim(u)))
    {
        return None;
    }

    let mut added = 0.0;
    let mut fan = Vec::with_capacity(rim.len());
    for (e, _, s) in &rim {
        let o = orient(&e.a, &e.b, v);
        if on_line(e, v) || o * s <= 0.0 {
            return None;
        }
        added += o.abs();
        fan.push([e.a, e.b, *v]);
    }
    ((added - removed).abs() <= 1e-9 * removed).then_some(fan)
}

/// Triangles retained after removing everything attached to the super triangle.
#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    triangles: Vec<Simplex>,
}

impl Triangulation {
    #[inline]
    pub fn triangles(&self) -> &[Simplex] {
        &self.triangles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Distinct undirected edges.
    pub fn edges(&self) -> Vec<Edge<Vector3<f64>>> {
        let mut out: Vec<Edge<Vector3<f64>>> = Vec::new();
        for e in self.triangles.iter().flat_map(|t| t.edges()) {
            if !out.iter().any(|f| f.equals(e, 0.0)) {
                out.push(*e);
            }
        }
        out
    }

    /// Circumcenters under `metric` (Euclidean where the metric fails); these
    /// are the vertices of the dual Voronoi diagram.
    pub fn circumcenters<D: DistanceFn + ?Sized>(&self, metric: &D) -> GeomResult<Vec<Point2>> {
        self.triangles
            .iter()
            .map(|t| {
                let c = match t.circumcircle(metric) {
                    Ok(c) => c,
                    Err(_) => t.circumcircle(&Euclidean)?,
                };
                Ok(c.center.xy())
            })
            .collect()
    }
}

/// Triangle enclosing the bounding box of `points` with a wide margin.
pub fn super_triangle(points: &[Point2]) -> GeomResult<[Point2; 3]> {
    let first = points
        .first()
        .ok_or_else(|| GeomError::degenerate("no points to triangulate"))?;
    let (mut lo, mut hi) = (*first, *first);
    for p in points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    let c = (lo + hi) * 0.5;
    let m = (hi - lo).amax().max(1.0);
    Ok([
        Point2::new(c.x - 20.0 * m, c.y - m),
        Point2::new(c.x, c.y + 20.0 * m),
        Point2::new(c.x + 20.0 * m, c.y - m),
    ])
}

/// Triangulate `points` under `metric` with a default super triangle.
pub fn bowyer_watson<D: DistanceFn + ?Sized>(points: &[Point2], metric: &D) -> GeomResult<Triangulation> {
    bowyer_watson_with(points, metric, super_triangle(points)?)
}

/// Triangulate `points` under `metric` starting from `super_tri`, which must
/// enclose every point.
///
/// Exact duplicate points are inserted once.
pub fn bowyer_watson_with<D: DistanceFn + ?Sized>(
    points: &[Point2],
    metric: &D,
    super_tri: [Point2; 3],
) -> GeomResult<Triangulation> {
    let sv = super_tri.map(|p| lift(&p));
    let mut fallbacks = 0usize;
    let mut cells = vec![Cell::new(sv, metric, &mut fallbacks)?];
    let mut inserted: Vec<Vector3<f64>> = Vec::with_capacity(points.len());

    for p in points {
        let v = lift(p);
        if inserted.contains(&v) {
            continue;
        }
        let seed = cells.iter().position(|c| c.encloses(&v)).ok_or_else(|| {
            GeomError::degenerate(format!(
                "point ({:.3}, {:.3}) lies outside the super triangle",
                p.x, p.y
            ))
        })?;

        let mut bad = grow_cavity(&cells, seed, &v, metric, &mut fallbacks)?;
        let fan = match cavity_fan(&cells, &bad, &v) {
            Some(fan) => fan,
            None => {
                debug!(x = p.x, y = p.y, cavity = bad.len(), "metric cavity rejected; using the enclosing triangle");
                bad = minimal_cavity(&cells, seed, &v);
                cavity_fan(&cells, &bad, &v).ok_or_else(|| {
                    GeomError::unstable(format!(
                        "point ({:.3}, {:.3}) nearly coincides with a vertex",
                        p.x, p.y
                    ))
                })?
            }
        };
        inserted.push(v);

        bad.sort_unstable();
        for &i in bad.iter().rev() {
            cells.swap_remove(i);
        }
        for tri in fan {
            match Cell::new(tri, metric, &mut fallbacks) {
                Ok(cell) => cells.push(cell),
                Err(err) => debug!(%err, "skipping degenerate cavity triangle"),
            }
        }
    }

    let triangles: Vec<Simplex> = cells
        .into_iter()
        .filter(|c| !sv.iter().any(|s| c.simplex.has_vertex(s, 0.0)))
        .map(|c| c.simplex)
        .collect();
    debug!(
        points = inserted.len(),
        triangles = triangles.len(),
        euclidean_fallbacks = fallbacks,
        "triangulated"
    );
    Ok(Triangulation { triangles })
}
