use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use projgeom::prelude::*;
use projgeom::model::{klein_to_poincare, poincare_to_klein};
use projgeom::tessellate::sample_sites;
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{ensure_parent, sibling, write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "projgeom")]
#[command(about = "Hyperbolic and Hilbert-metric geometry runner")]
struct Cmd {
    /// Optional run tag; propagated to provenance sidecars and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum ModelKind {
    Poincare,
    Klein,
    Hilbert,
}

/// Domain and canvas flags shared by the metric commands.
#[derive(clap::Args, Clone, Copy, Debug)]
struct Geometry {
    #[arg(long, value_enum, default_value_t = ModelKind::Hilbert)]
    model: ModelKind,
    /// Bulge parameter of the convex-projective domain (Hilbert model only)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    bulge: f64,
    /// Maximum word length of the reflection group
    #[arg(long, default_value_t = 7)]
    depth: usize,
    #[arg(long, default_value_t = 400)]
    width: usize,
    #[arg(long, default_value_t = 400)]
    height: usize,
}

impl Geometry {
    fn frame(&self) -> CanvasFrame {
        CanvasFrame::centered(self.width as f64, self.height as f64, 0.05)
    }

    fn domain_cfg(&self) -> DomainCfg {
        DomainCfg {
            max_word_len: self.depth,
            ..DomainCfg::with_bulge(self.bulge)
        }
    }

    fn build(&self) -> Result<AnyModel> {
        let frame = self.frame();
        Ok(match self.model {
            ModelKind::Poincare => AnyModel::Poincare(PoincareModel::new(frame)),
            ModelKind::Klein => AnyModel::Klein(KleinModel::new(frame)),
            ModelKind::Hilbert => AnyModel::Convex(
                ConvexProjectiveModel::new(frame, self.domain_cfg())
                    .with_context(|| format!("building domain for bulge {}", self.bulge))?,
            ),
        })
    }
}

#[derive(Subcommand)]
enum Action {
    /// Write the boundary polygon of the bulged domain (CSV, or Parquet by extension)
    Boundary {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        bulge: f64,
        #[arg(long, default_value_t = 7)]
        depth: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the distance of two model points as JSON
    Distance {
        #[command(flatten)]
        geo: Geometry,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p: Point2,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        q: Point2,
    },
    /// Trace the bisector of two model points; writes canvas points as CSV
    Bisector {
        #[command(flatten)]
        geo: Geometry,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        p: Point2,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        q: Point2,
        #[arg(long, default_value_t = 0.05)]
        eps: f64,
        /// Also write every scanned sample with its gap to `<stem>.samples.csv`
        #[arg(long)]
        gradient: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Label a canvas raster by nearest site; writes JSON
    Voronoi {
        #[command(flatten)]
        geo: Geometry,
        /// Number of random sites (ignored with --orbit-depth)
        #[arg(long, default_value_t = 12)]
        sites: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Radius of the disk random sites are drawn from (model units)
        #[arg(long, default_value_t = 0.7)]
        radius: f64,
        /// Use the orbit of --seed-point under the reflection group as sites
        #[arg(long)]
        orbit_depth: Option<usize>,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true, default_value = "0.05,0.1")]
        seed_point: Point2,
        #[arg(long, default_value_t = 2)]
        stride: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let tag = cmd.tag;
    match cmd.action {
        Action::Boundary { bulge, depth, out } => boundary(bulge, depth, &out, tag),
        Action::Distance { geo, p, q } => {
            let report = distance(&geo, &p, &q)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Action::Bisector {
            geo,
            p,
            q,
            eps,
            gradient,
            out,
        } => bisector(&geo, &p, &q, eps, gradient, &out, tag),
        Action::Voronoi {
            geo,
            sites,
            seed,
            radius,
            orbit_depth,
            seed_point,
            stride,
            out,
        } => {
            let sites = match orbit_depth {
                Some(depth) => orbit_sites(&geo, &seed_point, depth)?,
                None => sample_sites(sites, radius, seed),
            };
            voronoi(&geo, &sites, stride, &out, tag)
        }
        Action::Report => report(tag),
    }
}

fn parse_point(s: &str) -> Result<Point2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Point2::new(parse(x)?, parse(y)?))
}

fn write_frame(df: &mut DataFrame, out: &Path) -> Result<()> {
    ensure_parent(out)?;
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if out.extension().is_some_and(|e| e == "parquet") {
        ParquetWriter::new(file).finish(df)?;
    } else {
        let mut file = file;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }
    Ok(())
}

fn boundary(bulge: f64, depth: usize, out: &Path, tag: Option<String>) -> Result<()> {
    tracing::info!(bulge, depth, out = %out.display(), tag = ?tag, "boundary");
    let cfg = DomainCfg {
        max_word_len: depth,
        ..DomainCfg::with_bulge(bulge)
    };
    let dom = ConvexDomain::new(cfg).with_context(|| format!("building domain for bulge {bulge}"))?;
    let poly = dom.polygon();
    let mut df = df!(
        "vertex" => (0..poly.len() as u32).collect::<Vec<_>>(),
        "x" => poly.iter().map(|p| p.x).collect::<Vec<_>>(),
        "y" => poly.iter().map(|p| p.y).collect::<Vec<_>>()
    )?;
    write_frame(&mut df, out)?;
    tracing::info!(
        vertices = poly.len(),
        interior_edges = dom.interior().len(),
        group_size = dom.group_size(),
        "boundary_written"
    );
    write_sidecar(
        out,
        Payload::new(
            json!({
                "command": "boundary",
                "bulge": bulge,
                "depth": depth,
                "vertices": poly.len(),
                "group_size": dom.group_size()
            }),
            tag,
        ),
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct DistanceReport {
    model: ModelKind,
    p: [f64; 2],
    q: [f64; 2],
    distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    chord: Option<[[f64; 2]; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cross_ratio: Option<f64>,
}

fn distance(geo: &Geometry, p: &Point2, q: &Point2) -> Result<DistanceReport> {
    tracing::info!(model = ?geo.model, p = ?(p.x, p.y), q = ?(q.x, q.y), "distance");
    let model = geo.build()?;
    let d = model
        .distance(p, q)
        .with_context(|| format!("{} distance", model.name()))?;
    let (chord, cross_ratio) = match &model {
        AnyModel::Convex(m) if p != q => {
            let ch = m.domain().chord(p, q)?;
            (
                Some([[ch.a.x, ch.a.y], [ch.b.x, ch.b.y]]),
                Some(m.domain().cross_ratio(p, q)?),
            )
        }
        AnyModel::Klein(m) if p != q => {
            let ch = m.disk().chord(p, q)?;
            (
                Some([[ch.a.x, ch.a.y], [ch.b.x, ch.b.y]]),
                Some(m.cross_ratio(p, q)?),
            )
        }
        _ => (None, None),
    };
    Ok(DistanceReport {
        model: geo.model,
        p: [p.x, p.y],
        q: [q.x, q.y],
        distance: d,
        chord,
        cross_ratio,
    })
}

fn bisector(
    geo: &Geometry,
    p: &Point2,
    q: &Point2,
    eps: f64,
    gradient: bool,
    out: &Path,
    tag: Option<String>,
) -> Result<()> {
    tracing::info!(model = ?geo.model, eps, gradient, out = %out.display(), tag = ?tag, "bisector");
    let model = geo.build()?;
    let cfg = BisectorCfg {
        eps,
        mode: if gradient {
            TraceMode::Gradient
        } else {
            TraceMode::Curve
        },
        ..BisectorCfg::default()
    };
    let (cp, cq) = (model.model_to_canvas(p), model.model_to_canvas(q));
    let trace = trace_bisector(&model, &cp, &cq, &cfg).context("tracing bisector")?;

    let mut walk = Vec::with_capacity(trace.len());
    let mut xs = Vec::with_capacity(trace.len());
    let mut ys = Vec::with_capacity(trace.len());
    let backward = trace.backward.iter().rev().map(|z| ("backward", z));
    let seed = trace.seed.iter().map(|z| ("seed", z));
    let forward = trace.forward.iter().map(|z| ("forward", z));
    for (w, z) in backward.chain(seed).chain(forward) {
        walk.push(w);
        xs.push(z.x);
        ys.push(z.y);
    }
    let mut df = df!("walk" => walk, "x" => xs, "y" => ys)?;
    write_frame(&mut df, out)?;

    let mut outputs = vec![out.to_string_lossy().into_owned()];
    if gradient {
        let samples_path = sibling(out, ".samples.csv");
        let mut sdf = df!(
            "x" => trace.samples.iter().map(|s| s.point.x).collect::<Vec<_>>(),
            "y" => trace.samples.iter().map(|s| s.point.y).collect::<Vec<_>>(),
            "gap" => trace.samples.iter().map(|s| s.gap).collect::<Vec<_>>()
        )?;
        write_frame(&mut sdf, &samples_path)?;
        outputs.push(samples_path.to_string_lossy().into_owned());
    }
    tracing::info!(points = trace.len(), final_eps = trace.final_eps, "bisector_written");
    write_sidecar(
        out,
        Payload::new(
            json!({
                "command": "bisector",
                "model": geo.model,
                "bulge": geo.bulge,
                "p": [p.x, p.y],
                "q": [q.x, q.y],
                "eps": eps,
                "points": trace.len(),
                "outputs": outputs
            }),
            tag,
        ),
    )?;
    Ok(())
}

/// Orbit of `seed` (model coordinates) under the reflection group of the
/// model: the bulged group for Hilbert, the flat one (in Klein coordinates)
/// for the disk models.
fn orbit_sites(geo: &Geometry, seed: &Point2, depth: usize) -> Result<Vec<Point2>> {
    let flat = DomainCfg {
        max_word_len: 0,
        ..DomainCfg::default()
    };
    let pts = match geo.model {
        ModelKind::Hilbert => ConvexDomain::new(geo.domain_cfg())?.orbit(seed, depth)?,
        ModelKind::Klein => ConvexDomain::new(flat)?.orbit(seed, depth)?,
        ModelKind::Poincare => ConvexDomain::new(flat)?
            .orbit(&poincare_to_klein(seed), depth)?
            .iter()
            .map(klein_to_poincare)
            .collect(),
    };
    Ok(pts)
}

#[derive(Debug, Serialize)]
struct VoronoiReport {
    model: ModelKind,
    width: usize,
    height: usize,
    stride: usize,
    cols: usize,
    rows: usize,
    /// Canvas coordinates.
    sites: Vec<[f64; 2]>,
    cell_sizes: Vec<usize>,
    labels: Vec<Option<usize>>,
}

fn voronoi(geo: &Geometry, sites: &[Point2], stride: usize, out: &Path, tag: Option<String>) -> Result<()> {
    tracing::info!(model = ?geo.model, sites = sites.len(), stride, out = %out.display(), tag = ?tag, "voronoi");
    let model = geo.build()?;
    let canvas_sites: Vec<Point2> = sites
        .iter()
        .filter(|s| model.contains(s))
        .map(|s| model.model_to_canvas(s))
        .collect();
    if canvas_sites.is_empty() {
        bail!("no site lies inside the {} model", model.name());
    }
    let cfg = TessellateCfg {
        width: geo.width,
        height: geo.height,
        stride,
    };
    let raster = tessellate(&model, &cfg, &canvas_sites).context("labelling raster")?;
    let report = VoronoiReport {
        model: geo.model,
        width: raster.width,
        height: raster.height,
        stride: raster.stride,
        cols: raster.cols(),
        rows: raster.rows(),
        sites: canvas_sites.iter().map(|s| [s.x, s.y]).collect(),
        cell_sizes: raster.cell_sizes(canvas_sites.len()),
        labels: raster.labels().to_vec(),
    };
    ensure_parent(out)?;
    std::fs::write(out, serde_json::to_vec(&report)?)
        .with_context(|| format!("writing {}", out.display()))?;
    write_sidecar(
        out,
        Payload::new(
            json!({
                "command": "voronoi",
                "model": geo.model,
                "bulge": geo.bulge,
                "sites": canvas_sites.len(),
                "stride": stride
            }),
            tag,
        ),
    )?;
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "projgeom": projgeom::VERSION,
        "tag": tag,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn geo(model: ModelKind) -> Geometry {
        Geometry {
            model,
            bulge: 0.3,
            depth: 4,
            width: 200,
            height: 200,
        }
    }

    #[test]
    fn parse_point_accepts_signed_pairs() {
        assert_eq!(parse_point("-0.4, 0.25").unwrap(), Point2::new(-0.4, 0.25));
        assert!(parse_point("0.4").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn cli_parses_negative_points() {
        let cmd = Cmd::try_parse_from([
            "projgeom", "distance", "--model", "klein", "--p", "-0.4,0", "--q", "0.3,-0.1",
        ])
        .unwrap();
        match cmd.action {
            Action::Distance { geo, p, q } => {
                assert_eq!(geo.model, ModelKind::Klein);
                assert_eq!(p, Point2::new(-0.4, 0.0));
                assert_eq!(q, Point2::new(0.3, -0.1));
            }
            _ => panic!("expected distance"),
        }
    }

    #[test]
    fn boundary_csv_round_trips() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("data").join("boundary.csv");
        boundary(0.5, 3, &out, Some("t".into())).unwrap();
        let df = LazyCsvReader::new(&out)
            .with_infer_schema_length(Some(100))
            .finish()
            .unwrap()
            .collect()
            .unwrap();
        let dom = ConvexDomain::new(DomainCfg {
            max_word_len: 3,
            ..DomainCfg::with_bulge(0.5)
        })
        .unwrap();
        assert_eq!(df.height(), dom.polygon().len());
        let x0 = df.column("x").unwrap().f64().unwrap().get(0).unwrap();
        assert!((x0 - dom.polygon()[0].x).abs() < 1e-12);
        assert!(dir.path().join("data").join("boundary.provenance.json").exists());
    }

    #[test]
    fn distance_reports_chords_for_projective_models() {
        let p = Point2::new(0.1, 0.0);
        let q = Point2::new(-0.2, 0.1);
        let hil = distance(&geo(ModelKind::Hilbert), &p, &q).unwrap();
        assert!(hil.distance > 0.0 && hil.chord.is_some());
        assert!((0.5 * hil.cross_ratio.unwrap().ln() - hil.distance).abs() < 1e-12);
        let poi = distance(&geo(ModelKind::Poincare), &p, &q).unwrap();
        assert!(poi.chord.is_none());
        assert!(distance(&geo(ModelKind::Klein), &p, &Point2::new(1.5, 0.0)).is_err());
    }

    #[test]
    fn bisector_writes_curve_and_samples() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("bis.csv");
        let g = geo(ModelKind::Poincare);
        bisector(&g, &Point2::new(-0.4, 0.0), &Point2::new(0.4, 0.0), 0.2, true, &out, None).unwrap();
        let df = LazyCsvReader::new(&out).finish().unwrap().collect().unwrap();
        assert!(df.height() > 3);
        assert!(dir.path().join("bis.samples.csv").exists());
        assert!(dir.path().join("bis.provenance.json").exists());
    }

    #[test]
    fn voronoi_json_has_a_label_per_cell() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("cells.json");
        let g = geo(ModelKind::Klein);
        let sites = orbit_sites(&g, &Point2::new(0.05, 0.1), 1).unwrap();
        assert_eq!(sites.len(), 4);
        voronoi(&g, &sites, 10, &out, None).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        let cells = v["cols"].as_u64().unwrap() * v["rows"].as_u64().unwrap();
        assert_eq!(v["labels"].as_array().unwrap().len() as u64, cells);
        assert_eq!(v["sites"].as_array().unwrap().len(), 4);
    }
}
