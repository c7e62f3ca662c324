//! Linear algebra primitives (runtime dimension, explicit shape checks).
//!
//! Purpose
//! - `Vector` / `Matrix` wrap nalgebra's dynamic storage and report shape errors
//!   as `GeomError::DimensionMismatch` instead of panicking.
//! - `Transformation` abstracts "acts on a point and composes"; `LinearMap` and
//!   `Mobius` are the two concrete forms, `TransformStack` scopes cumulative
//!   group elements during orbit walks.
//!
//! Conventions
//! - Equality takes an explicit tolerance (`ApproxEq`); `0.0` means exact.
//! - Inverse and eigen-decomposition delegate to nalgebra (LU, Schur, SVD).

mod approx;
mod matrix;
mod transform;
mod vector;

pub use approx::{grid_key, ApproxEq};
pub use matrix::{Eigen, Matrix};
pub use nalgebra::Complex;
pub use transform::{orbit, LinearMap, Mobius, TransformStack, Transformation};
pub use vector::{dehomogenize, Vector};

#[cfg(test)]
mod tests;
