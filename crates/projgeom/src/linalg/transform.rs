//! Transformations, the frame stack, and depth-first orbit walks.

use nalgebra::Complex;

use super::matrix::Matrix;
use super::vector::Vector;
use crate::error::{GeomError, GeomResult};
use crate::Point2;

/// Something that acts on points and composes with its own kind.
pub trait Transformation: Clone {
    type Point: Clone;

    fn apply(&self, p: &Self::Point) -> GeomResult<Self::Point>;

    /// `self ∘ other` (apply `other` first).
    fn compose(&self, other: &Self) -> GeomResult<Self>;
}

/// Linear (projective when acting on homogeneous vectors) map `v ↦ M v`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearMap {
    pub m: Matrix,
}

impl LinearMap {
    #[inline]
    pub fn new(m: Matrix) -> Self {
        Self { m }
    }
    #[inline]
    pub fn identity(n: usize) -> Self {
        Self {
            m: Matrix::identity(n),
        }
    }
}

impl Transformation for LinearMap {
    type Point = Vector;

    #[inline]
    fn apply(&self, p: &Vector) -> GeomResult<Vector> {
        self.m.apply(p)
    }

    #[inline]
    fn compose(&self, other: &Self) -> GeomResult<Self> {
        Ok(Self {
            m: self.m.multiply(&other.m)?,
        })
    }
}

/// Fractional-linear map `z ↦ (a z + b) / (c z + d)` on the complex plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mobius {
    pub a: Complex<f64>,
    pub b: Complex<f64>,
    pub c: Complex<f64>,
    pub d: Complex<f64>,
}

impl Mobius {
    /// Rejects singular coefficient matrices (`ad − bc = 0`).
    pub fn new(
        a: Complex<f64>,
        b: Complex<f64>,
        c: Complex<f64>,
        d: Complex<f64>,
    ) -> GeomResult<Self> {
        let det = a * d - b * c;
        if det.norm() < 1e-15 {
            return Err(GeomError::degenerate("singular Möbius coefficients"));
        }
        Ok(Self { a, b, c, d })
    }

    pub fn identity() -> Self {
        let one = Complex::new(1.0, 0.0);
        let zero = Complex::new(0.0, 0.0);
        Self {
            a: one,
            b: zero,
            c: zero,
            d: one,
        }
    }

    /// Rotation of the unit disk about the origin by `theta`.
    pub fn disk_rotation(theta: f64) -> Self {
        Self {
            a: Complex::from_polar(1.0, theta),
            ..Self::identity()
        }
    }

    /// Disk isometry `z ↦ (z + w) / (w̄ z + 1)` sending `0` to `w` (requires `|w| < 1`).
    pub fn disk_translation(w: Complex<f64>) -> GeomResult<Self> {
        if w.norm() >= 1.0 {
            return Err(GeomError::degenerate("translation target outside the unit disk"));
        }
        Self::new(Complex::new(1.0, 0.0), w, w.conj(), Complex::new(1.0, 0.0))
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            a: self.d,
            b: -self.b,
            c: -self.c,
            d: self.a,
        }
    }

    /// Convenience action on an affine point `(x, y) ≅ x + iy`.
    pub fn apply_point(&self, p: &Point2) -> GeomResult<Point2> {
        let z = self.apply(&Complex::new(p.x, p.y))?;
        Ok(Point2::new(z.re, z.im))
    }
}

impl Transformation for Mobius {
    type Point = Complex<f64>;

    fn apply(&self, z: &Complex<f64>) -> GeomResult<Complex<f64>> {
        let den = self.c * z + self.d;
        if den.norm() < 1e-15 {
            return Err(GeomError::degenerate("Möbius pole"));
        }
        Ok((self.a * z + self.b) / den)
    }

    fn compose(&self, o: &Self) -> GeomResult<Self> {
        Ok(Self {
            a: self.a * o.a + self.b * o.c,
            b: self.a * o.b + self.b * o.d,
            c: self.c * o.a + self.d * o.c,
            d: self.c * o.b + self.d * o.d,
        })
    }
}

/// Arena of cumulative transformation frames.
///
/// Frame 0 is the base; `push(g)` appends `top ∘ g`, `pop` truncates. Frames are
/// owned values, so no frame aliases another.
#[derive(Clone, Debug)]
pub struct TransformStack<T> {
    frames: Vec<T>,
}

impl<T: Transformation> TransformStack<T> {
    pub fn new(base: T) -> Self {
        Self { frames: vec![base] }
    }

    #[inline]
    pub fn top(&self) -> &T {
        // frames is never empty: pop/truncate keep the base frame
        &self.frames[self.frames.len() - 1]
    }

    /// Append `top ∘ g`; returns the new frame index.
    pub fn push(&mut self, g: &T) -> GeomResult<usize> {
        let next = self.top().compose(g)?;
        self.frames.push(next);
        Ok(self.frames.len() - 1)
    }

    /// Drop the top frame; the base frame is never removed.
    pub fn pop(&mut self) -> Option<T> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of frames above the base.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    #[inline]
    pub fn frame(&self, idx: usize) -> Option<&T> {
        self.frames.get(idx)
    }

    /// Keep frames `0..=depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth + 1);
    }
}

/// Orbit of `seed` under all words of length `1..=depth` in `generators`
/// (plus the seed itself), walked depth-first with a `TransformStack`.
///
/// `same(a, b)` decides when two orbit points coincide; duplicates are skipped
/// but their subtrees are still explored.
pub fn orbit<T, F>(
    base: T,
    generators: &[T],
    seed: &T::Point,
    depth: usize,
    same: F,
) -> GeomResult<Vec<T::Point>>
where
    T: Transformation,
    F: Fn(&T::Point, &T::Point) -> bool,
{
    let mut stack = TransformStack::new(base);
    let mut out = vec![stack.top().apply(seed)?];
    walk(&mut stack, generators, seed, depth, &same, &mut out)?;
    Ok(out)
}

fn walk<T, F>(
    stack: &mut TransformStack<T>,
    generators: &[T],
    seed: &T::Point,
    depth: usize,
    same: &F,
    out: &mut Vec<T::Point>,
) -> GeomResult<()>
where
    T: Transformation,
    F: Fn(&T::Point, &T::Point) -> bool,
{
    if stack.depth() >= depth {
        return Ok(());
    }
    for g in generators {
        stack.push(g)?;
        let p = stack.top().apply(seed)?;
        if !out.iter().any(|q| same(q, &p)) {
            out.push(p);
        }
        walk(stack, generators, seed, depth, same, out)?;
        stack.pop();
    }
    Ok(())
}
