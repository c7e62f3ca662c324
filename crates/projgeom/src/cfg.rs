//! Tolerance defaults and configuration structs.
//!
//! Policy
//! - Tolerances are fixed constants; the few knobs a caller tunes per run live in
//!   small `Copy` configs with `Default`.

/// Pivot magnitude below which `homogenize` treats a point as lying at infinity.
pub const HOMOGENIZE_EPS: f64 = 1e-12;
/// Endpoint tolerance for edge dedup during boundary assembly.
pub const EDGE_TOL: f64 = 1e-4;
/// Rounding grid for the group-element seen-set.
pub const GROUP_TOL: f64 = 1e-6;
/// Cross products below this are treated as parallel lines.
pub const PARALLEL_EPS: f64 = 1e-12;
/// Cross-ratio denominators below this are rejected as degenerate.
pub const CROSS_RATIO_EPS: f64 = 1e-12;
/// Slack when accepting a line/edge hit at an edge endpoint.
pub const HIT_EPS: f64 = 1e-9;
/// Recently hit boundary edges kept by the chord cache.
pub const CHORD_CACHE_CAP: usize = 8;
/// Site count above which nearest-site rasters become slow.
pub const RASTER_SITE_WARN: usize = 100;

/// Convex-projective domain construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct DomainCfg {
    /// Bulge parameter `t` of the Cartan deformation.
    pub bulge: f64,
    /// Maximum word length in the generators (0 keeps only the reference triangle).
    pub max_word_len: usize,
    /// Endpoint tolerance for edge dedup.
    pub edge_tol: f64,
    /// Rounding grid for group-element dedup.
    pub group_tol: f64,
}

impl Default for DomainCfg {
    fn default() -> Self {
        Self {
            bulge: 0.0,
            max_word_len: 7,
            edge_tol: EDGE_TOL,
            group_tol: GROUP_TOL,
        }
    }
}

impl DomainCfg {
    #[inline]
    pub fn with_bulge(bulge: f64) -> Self {
        Self {
            bulge,
            ..Self::default()
        }
    }
}

/// Nearest-site raster parameters.
#[derive(Clone, Copy, Debug)]
pub struct TessellateCfg {
    pub width: usize,
    pub height: usize,
    /// Sample every `stride` pixels in both directions (1 = every pixel).
    pub stride: usize,
}

impl Default for TessellateCfg {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            stride: 1,
        }
    }
}
