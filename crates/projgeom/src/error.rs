//! Error type shared by every module of the engine.

use std::fmt;

/// Errors surfaced by linear algebra, metric evaluation, and constructions.
#[derive(Clone, Debug, PartialEq)]
pub enum GeomError {
    /// Operand shapes are incompatible (rows × cols for each side).
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// The configuration has no well-defined answer (collinear points, points
    /// on or outside a boundary, an open boundary polygon, ...).
    DegenerateGeometry { reason: String },
    /// Ill-conditioned numerics (singular inverse, negative circumradius², NaN).
    NumericInstability { reason: String },
}

impl GeomError {
    pub(crate) fn mismatch(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        Self::DimensionMismatch { op, left, right }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn unstable(reason: impl Into<String>) -> Self {
        Self::NumericInstability {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { op, left, right } => write!(
                f,
                "dimension mismatch in {op}: {}x{} vs {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::DegenerateGeometry { reason } => write!(f, "degenerate geometry: {reason}"),
            Self::NumericInstability { reason } => write!(f, "numeric instability: {reason}"),
        }
    }
}

impl std::error::Error for GeomError {}

/// Result alias used across the crate.
pub type GeomResult<T> = Result<T, GeomError>;
