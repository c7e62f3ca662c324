use super::*;
use crate::error::GeomError;
use crate::Point2;
use nalgebra::Matrix3;

#[test]
fn vector_ops_check_dimensions() {
    let a = Vector::new(vec![1.0, 2.0, 3.0]);
    let b = Vector::new(vec![4.0, 5.0]);
    assert!(matches!(
        a.add(&b),
        Err(GeomError::DimensionMismatch { .. })
    ));
    assert!(matches!(a.dot(&b), Err(GeomError::DimensionMismatch { .. })));
    assert!(a.cross(&b).is_err());

    let c = Vector::new(vec![0.0, 1.0, 0.0]);
    let x = Vector::new(vec![1.0, 0.0, 0.0]);
    assert_eq!(x.cross(&c).unwrap(), Vector::new(vec![0.0, 0.0, 1.0]));
    assert!((a.dot(&c).unwrap() - 2.0).abs() < 1e-15);
    assert_eq!(a.sub(&a).unwrap(), Vector::zeros(3));
    assert_eq!(a.scale(2.0)[2], 6.0);
}

#[test]
fn homogenize_is_idempotent() {
    let v = Vector::new(vec![2.0, -4.0, 2.0]);
    let h = v.homogenize(2).unwrap();
    assert_eq!(h, Vector::new(vec![1.0, -2.0, 1.0]));
    assert!(h.homogenize(2).unwrap().approx_eq(&h, 0.0));
}

#[test]
fn homogenize_past_the_end_is_a_mismatch() {
    let v = Vector::new(vec![1.0, 2.0]);
    assert!(matches!(
        v.homogenize(2),
        Err(GeomError::DimensionMismatch { op: "vector homogenize", .. })
    ));
    assert!(v.homogenize(1).is_ok());
}

#[test]
fn homogenize_at_infinity_normalizes_remainder() {
    let v = Vector::new(vec![3.0, 4.0, 1e-15]);
    let h = v.homogenize(2).unwrap();
    assert!(h.approx_eq(&Vector::new(vec![0.6, 0.8, 0.0]), 1e-12));
    // still a fixed point
    assert!(h.homogenize(2).unwrap().approx_eq(&h, 1e-15));
}

#[test]
fn approx_eq_defaults_to_exact() {
    let a = Vector::new(vec![1.0, 1.0]);
    let b = Vector::new(vec![1.0, 1.0 + 1e-6]);
    assert!(!a.approx_eq(&b, 0.0));
    assert!(a.approx_eq(&b, 1e-4));
    assert!(!a.approx_eq(&Vector::new(vec![1.0, 1.0, 1.0]), 1.0));
}

#[test]
fn multiply_requires_inner_dimensions() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    assert!(matches!(
        a.multiply(&b),
        Err(GeomError::DimensionMismatch { op: "matrix multiply", .. })
    ));
    let p = b.multiply(&a).unwrap();
    assert!(p.approx_eq(&a, 0.0));
    assert_eq!(a.transpose().shape(), (3, 2));
    assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
}

#[test]
fn determinant_cofactor_matches_known_values() {
    let m = Matrix::from_rows(&[
        vec![2.0, 0.0, 1.0],
        vec![1.0, 3.0, 2.0],
        vec![1.0, 1.0, 1.0],
    ])
    .unwrap();
    // 2(3-2) - 0 + 1(1-3) = 0
    assert!(m.determinant().unwrap().abs() < 1e-12);
    let n = Matrix::from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
    assert!((n.determinant().unwrap() - 10.0).abs() < 1e-12);
    let big = Matrix::identity(4).scale(2.0);
    assert!((big.determinant().unwrap() - 16.0).abs() < 1e-12);
    assert!(Matrix::zeros(2, 3).determinant().is_err());
}

#[test]
fn inverse_uses_solver_and_flags_singular() {
    let n = Matrix::from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
    let inv = n.inverse().unwrap();
    assert!(n.multiply(&inv).unwrap().approx_eq(&Matrix::identity(2), 1e-12));
    let singular = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
    assert!(matches!(
        singular.inverse(),
        Err(GeomError::NumericInstability { .. })
    ));
}

#[test]
fn eigen_of_diagonal_and_rotation() {
    let d = Matrix::from_rows(&[
        vec![3.0, 0.0, 0.0],
        vec![0.0, -1.0, 0.0],
        vec![0.0, 0.0, 2.0],
    ])
    .unwrap();
    let e = d.eigen().unwrap();
    let vals = e.real_values();
    assert!((vals[0] + 1.0).abs() < 1e-9);
    assert!((vals[1] - 2.0).abs() < 1e-9);
    assert!((vals[2] - 3.0).abs() < 1e-9);
    for (z, v) in e.values.iter().zip(&e.vectors) {
        let v = v.as_ref().expect("real eigenvector");
        let av = d.apply(v).unwrap();
        assert!(av.approx_eq(&v.scale(z.re), 1e-8));
    }

    let th = std::f64::consts::FRAC_PI_2;
    let rot = Matrix::from_rows(&[vec![th.cos(), -th.sin()], vec![th.sin(), th.cos()]]).unwrap();
    let e = rot.eigen().unwrap();
    assert!(e.real_values().is_empty());
    assert!(e.vectors.iter().all(Option::is_none));
}

#[test]
fn matrix3_round_trip_and_apply() {
    let m3 = Matrix3::new(1.0, 2.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
    let m = Matrix::from(m3);
    assert_eq!(m.to_matrix3().unwrap(), m3);
    let v = Vector::lift(&Point2::new(1.0, 1.0));
    assert_eq!(m.apply(&v).unwrap(), Vector::new(vec![3.0, 1.0, 1.0]));
    assert!(Matrix::identity(2).to_matrix3().is_err());
}

#[test]
fn mobius_translation_moves_origin_and_inverts() {
    let w = Complex::new(0.3, -0.2);
    let t = Mobius::disk_translation(w).unwrap();
    let z0 = t.apply(&Complex::new(0.0, 0.0)).unwrap();
    assert!((z0 - w).norm() < 1e-15);
    let back = t.inverse().apply(&z0).unwrap();
    assert!(back.norm() < 1e-15);
    assert!(Mobius::disk_translation(Complex::new(1.0, 0.0)).is_err());

    // composition order: (r ∘ t)(0) = r(w)
    let r = Mobius::disk_rotation(std::f64::consts::FRAC_PI_2);
    let rt = r.compose(&t).unwrap();
    let got = rt.apply(&Complex::new(0.0, 0.0)).unwrap();
    assert!((got - Complex::new(0.2, 0.3)).norm() < 1e-12);
}

#[test]
fn transform_stack_push_pop_truncate() {
    let g = LinearMap::new(Matrix::identity(3).scale(2.0));
    let mut stack = TransformStack::new(LinearMap::identity(3));
    assert_eq!(stack.depth(), 0);
    stack.push(&g).unwrap();
    stack.push(&g).unwrap();
    assert_eq!(stack.depth(), 2);
    assert!(stack
        .top()
        .m
        .approx_eq(&Matrix::identity(3).scale(4.0), 0.0));
    // earlier frames are untouched by later pushes
    assert!(stack
        .frame(1)
        .unwrap()
        .m
        .approx_eq(&Matrix::identity(3).scale(2.0), 0.0));
    stack.pop();
    assert_eq!(stack.depth(), 1);
    stack.truncate(0);
    assert!(stack.pop().is_none());
    assert!(stack.top().m.approx_eq(&Matrix::identity(3), 0.0));
}

#[test]
fn orbit_dedups_involutions() {
    // x ↦ −x generates {seed, −seed} only.
    let flip = LinearMap::new(Matrix::identity(2).scale(-1.0));
    let seed = Vector::new(vec![0.5, 0.25]);
    let pts = orbit(LinearMap::identity(2), &[flip], &seed, 4, |a, b| {
        a.approx_eq(b, 1e-12)
    })
    .unwrap();
    assert_eq!(pts.len(), 2);
}

#[test]
fn dehomogenize_maps_to_affine_chart() {
    let p = dehomogenize(&nalgebra::Vector3::new(2.0, 4.0, 2.0));
    assert_eq!(p, Point2::new(1.0, 2.0));
    assert_eq!(grid_key(0.000149, 1e-4), 1);
}
