//! Bulge sweep timing probe for the convex-projective domain.
//!
//! Purpose
//! - Reproducible data points for "how does the boundary polygon change, and
//!   how long does a rebuild take, as the bulge parameter moves?"
//! - One line per bulge value: polygon size, radial extent, rebuild time, and
//!   the Hilbert distance of a fixed pair of points.
//!
//! Run: `cargo run -p projgeom --example bulge_sweep`

use std::time::Instant;

use projgeom::cfg::DomainCfg;
use projgeom::domain::ConvexDomain;
use projgeom::Point2;

fn main() {
    let x = Point2::new(0.1, 0.2);
    let y = Point2::new(-0.3, 0.1);
    let mut dom = ConvexDomain::new(DomainCfg::default()).expect("flat domain builds");

    for step in -4..=4 {
        let t = step as f64 * 0.25;
        let start = Instant::now();
        dom.set_bulge(t).expect("bulge in the closed range rebuilds");
        let rebuild_ms = start.elapsed().as_secs_f64() * 1e3;

        let (rmin, rmax) = dom
            .polygon()
            .iter()
            .map(|p| p.norm())
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), r| (lo.min(r), hi.max(r)));
        let d = dom.distance(&x, &y).expect("sample points are interior");

        println!(
            "bulge={t:+.2} elements={} boundary={} r_min={rmin:.4} r_max={rmax:.4} distance={d:.6} rebuild_ms={rebuild_ms:.3}",
            dom.group_size(),
            dom.polygon().len(),
        );
    }
    let stats = dom.chord_stats();
    println!("chords cached={} scanned={}", stats.cached, stats.scanned);
}
