//! Bulged ideal-triangle reflection group.
//!
//! The three mirrors are the sides of the ideal triangle inscribed in the unit
//! circle. Row `i` of the mirror matrix is the functional
//! `αᵢ(x, y, w) = 2 pᵢ·(x, y) + w`, which vanishes on the side opposite `pᵢ`.
//! The Cartan matrix `A = (αᵢ(vⱼ))` fixes the reflection vectors `vⱼ`. The
//! bulge `t` scales the (0,1)/(1,0) entries by `e^{±t}`: each product
//! `Aᵢⱼ Aⱼᵢ = 4` is unchanged (pairs of mirrors stay parabolic) while the cyclic
//! product moves, deforming the domain away from the round disk.

use std::collections::HashSet;

use nalgebra::Matrix3;

use crate::error::GeomResult;
use crate::linalg::{grid_key, Matrix};
use crate::Point2;

/// Vertices `p_k` at angles `π/2 + 2πk/3` on the unit circle.
pub fn reference_triangle() -> [Point2; 3] {
    std::array::from_fn(|k| {
        let th = std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * k as f64 / 3.0;
        Point2::new(th.cos(), th.sin())
    })
}

/// Row `i` is the mirror functional `(2 pᵢ.x, 2 pᵢ.y, 1)`.
pub fn mirror_functionals() -> Matrix3<f64> {
    let p = reference_triangle();
    Matrix3::from_fn(|i, j| match j {
        0 => 2.0 * p[i].x,
        1 => 2.0 * p[i].y,
        _ => 1.0,
    })
}

/// Cartan matrix of the bulge `t`.
pub fn cartan_matrix(t: f64) -> Matrix3<f64> {
    let mut a = Matrix3::from_element(-2.0);
    a.fill_diagonal(2.0);
    a[(0, 1)] = -2.0 * t.exp();
    a[(1, 0)] = -2.0 * (-t).exp();
    a
}

/// Reflections `r_j = I − v_j α_jᵀ` with `V = α⁻¹ A`.
///
/// Each `r_j` fixes its mirror pointwise and sends `v_j` to `−v_j`. At `t = 0`
/// these are the Klein-model reflections in the sides of the ideal triangle.
pub fn reflection_generators(t: f64) -> GeomResult<[Matrix3<f64>; 3]> {
    let alpha = mirror_functionals();
    let v = Matrix::from(alpha)
        .inverse()?
        .multiply(&Matrix::from(cartan_matrix(t)))?
        .to_matrix3()?;
    Ok(std::array::from_fn(|j| {
        Matrix3::identity() - v.column(j) * alpha.row(j)
    }))
}

/// Group element reached by a reduced word in the generators.
#[derive(Clone, Debug)]
pub struct GroupElement {
    pub matrix: Matrix3<f64>,
    /// Generator indices, applied left to right.
    pub word: Vec<u8>,
}

impl GroupElement {
    #[inline]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            word: Vec::new(),
        }
    }

    #[inline]
    pub fn word_len(&self) -> usize {
        self.word.len()
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.word.is_empty()
    }
}

fn matrix_key(m: &Matrix3<f64>, tol: f64) -> [i64; 9] {
    std::array::from_fn(|i| grid_key(m[i], tol))
}

/// Breadth-first enumeration of all elements with word length ≤ `max_len`.
///
/// Words never repeat a letter back to back (generators are involutions).
/// Elements whose matrices agree on a `tol` grid are kept once, at their
/// shortest word. Output is ordered by word length, identity first.
pub fn enumerate_words(gens: &[Matrix3<f64>], max_len: usize, tol: f64) -> Vec<GroupElement> {
    let id = GroupElement::identity();
    let mut seen = HashSet::from([matrix_key(&id.matrix, tol)]);
    let mut out = vec![id.clone()];
    let mut frontier = vec![id];
    for _ in 0..max_len {
        let mut next = Vec::with_capacity(frontier.len() * 2);
        for el in &frontier {
            for (i, g) in gens.iter().enumerate() {
                let letter = i as u8;
                if el.word.last() == Some(&letter) {
                    continue;
                }
                let m = el.matrix * g;
                if !seen.insert(matrix_key(&m, tol)) {
                    continue;
                }
                let mut word = el.word.clone();
                word.push(letter);
                next.push(GroupElement { matrix: m, word });
            }
        }
        if next.is_empty() {
            break;
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::ApproxEq;

    #[test]
    fn mirrors_pass_through_the_opposite_vertices() {
        let p = reference_triangle();
        let a = mirror_functionals();
        for i in 0..3 {
            for j in 0..3 {
                let val = a[(i, 0)] * p[j].x + a[(i, 1)] * p[j].y + a[(i, 2)];
                if i == j {
                    assert!((val - 3.0).abs() < 1e-12);
                } else {
                    assert!(val.abs() < 1e-12, "mirror {i} misses vertex {j}: {val}");
                }
            }
        }
    }

    #[test]
    fn generators_are_involutions() {
        for t in [-1.0, -0.3, 0.0, 0.7, 1.5] {
            let gens = reflection_generators(t).unwrap();
            for g in &gens {
                assert!((g * g).approx_eq(&Matrix3::identity(), 1e-10));
                assert!((g.determinant() + 1.0).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn flat_generators_preserve_the_unit_circle() {
        let gens = reflection_generators(0.0).unwrap();
        for g in &gens {
            for k in 0..12 {
                let th = 0.3 + k as f64 * 0.5;
                let img = g * nalgebra::Vector3::new(th.cos(), th.sin(), 1.0);
                let q = img.xy() / img.z;
                assert!((q.norm() - 1.0).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn word_counts_follow_the_free_product() {
        let gens = reflection_generators(0.4).unwrap();
        // 1 + 3 + 6 + 12 + 24
        let els = enumerate_words(&gens, 4, 1e-6);
        assert_eq!(els.len(), 46);
        assert!(els[0].is_identity());
        assert!(els.windows(2).all(|w| w[0].word_len() <= w[1].word_len()));
        assert!(els
            .iter()
            .all(|e| e.word.windows(2).all(|w| w[0] != w[1])));
        assert_eq!(enumerate_words(&gens, 0, 1e-6).len(), 1);
    }
}
