//! strata CLI - slice solid models into layered surfaces
//!
//! Loads bodies from STL files or box specs, slices them into layer and
//! contour surfaces, and reports or exports the result.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Deserialize;
use strata_math::Point3;
use strata_mesh::TriangleMesh;
use strata_slicer::{plan_layers, run_slice, Design, SliceReport, SliceSettings};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

mod units;

use units::{parse_cuboid, parse_length};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Slice solid models into layered surfaces", long_about = None)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Slice the model into layer and contour surfaces
    Slice {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Write the slice report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write every created surface to one binary STL
        #[arg(long)]
        stl: Option<PathBuf>,
    },
    /// Print the model bounds and the layer heights that would be sliced
    Plan {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// STL file to add as a body (repeatable)
    #[arg(short, long = "mesh")]
    meshes: Vec<PathBuf>,

    /// Box body as x0,y0,z0,x1,y1,z1 (repeatable)
    #[arg(long = "cuboid", value_parser = parse_cuboid)]
    cuboids: Vec<[f64; 6]>,

    /// TOML file with a [settings] table and optional mesh list
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct SettingsArgs {
    /// Distance between layer planes, e.g. 0.2 or 0.01in
    #[arg(long, value_parser = parse_length)]
    layer_height: Option<f64>,

    /// Contours per profile, including the base surface
    #[arg(short = 'n', long)]
    contours: Option<u32>,

    /// Distance between nested contours
    #[arg(short = 'w', long, value_parser = parse_length)]
    contour_width: Option<f64>,

    /// Gap between a layer's surface and the next plane
    #[arg(long, value_parser = parse_length)]
    margin: Option<f64>,

    /// Name of the component that receives created geometry
    #[arg(long)]
    container: Option<String>,
}

impl SettingsArgs {
    fn apply(&self, settings: &mut SliceSettings) {
        if let Some(h) = self.layer_height {
            settings.layer_height = h;
        }
        if let Some(n) = self.contours {
            settings.num_contours = n;
        }
        if let Some(w) = self.contour_width {
            settings.contour_width = w;
        }
        if let Some(m) = self.margin {
            settings.extrude_margin = m;
        }
        if let Some(name) = &self.container {
            settings.container_name = name.clone();
        }
    }
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    settings: SliceSettings,
    /// Meshes to load, relative to the config file.
    meshes: Vec<PathBuf>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new(""));
        for mesh in &mut config.meshes {
            if mesh.is_relative() {
                *mesh = base.join(&*mesh);
            }
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Slice {
            model,
            settings,
            report,
            stl,
        } => {
            let (mut design, settings) = load(&model, &settings)?;
            let result = run_slice(&mut design, &settings)?;
            print_summary(&result);
            if let Some(path) = report {
                write_report(&result, &path)?;
            }
            if let Some(path) = stl {
                export_surfaces(&design, &result, &path)?;
            }
        }
        Commands::Plan { model, settings } => {
            let (design, settings) = load(&model, &settings)?;
            show_plan(&design, &settings)?;
        }
    }

    Ok(())
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = level_for(verbose, quiet);
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("strata_slicer", level)
        .with_target("strata_mesh", level)
        .with_target("strata", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the design and settings from the command line and config file.
fn load(model: &ModelArgs, args: &SettingsArgs) -> Result<(Design, SliceSettings)> {
    let config = match &model.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let mut settings = config.settings;
    args.apply(&mut settings);
    settings.validate()?;

    let mut design = Design::new();
    for path in config.meshes.iter().chain(&model.meshes) {
        let mesh = read_mesh(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mesh")
            .to_string();
        debug!(%name, triangles = mesh.num_triangles(), "loaded mesh");
        design.add_body(name, mesh)?;
    }
    for (i, c) in model.cuboids.iter().enumerate() {
        let mesh = TriangleMesh::cuboid(Point3::new(c[0], c[1], c[2]), Point3::new(c[3], c[4], c[5]))?;
        design.add_body(format!("cuboid{i}"), mesh)?;
    }
    if design.body_count() == 0 {
        bail!("no bodies given; use --mesh, --cuboid or a config with meshes");
    }
    Ok((design, settings))
}

fn read_mesh(path: &Path) -> Result<TriangleMesh> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mesh = strata_mesh::read_stl(&mut BufReader::new(file))
        .with_context(|| format!("failed to read STL {}", path.display()))?;
    Ok(mesh)
}

fn show_plan(design: &Design, settings: &SliceSettings) -> Result<()> {
    let (bounds, heights) = plan_layers(design, settings)?;
    println!("Bodies: {}", design.body_count());
    println!(
        "Bounds: ({:.4}, {:.4}, {:.4}) .. ({:.4}, {:.4}, {:.4})",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );
    println!("Layers: {}", heights.len());
    for (i, z) in heights.iter().enumerate() {
        println!("  {i:4}  z = {z:.4}");
    }
    Ok(())
}

fn print_summary(report: &SliceReport) {
    let stats = &report.stats;
    println!(
        "Layers: {} ({} populated)",
        stats.layer_count, stats.populated_layers
    );
    println!("Layer surfaces: {}", stats.layer_surfaces);
    println!("Contour surfaces: {}", stats.offset_surfaces);
    if stats.skipped_profiles > 0 {
        println!("Skipped profiles: {}", stats.skipped_profiles);
    }
    if stats.degenerate_offsets > 0 {
        println!("Degenerate contours: {}", stats.degenerate_offsets);
    }
}

fn write_report(report: &SliceReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    println!("Wrote report to {}", path.display());
    Ok(())
}

fn export_surfaces(design: &Design, report: &SliceReport, path: &Path) -> Result<()> {
    let container = design
        .component(report.container)
        .context("slice container is missing")?;
    let file = fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    strata_mesh::write_stl(&mut writer, container.surfaces.iter().map(|s| &s.mesh))?;
    println!(
        "Exported {} surfaces to {}",
        container.surfaces.len(),
        path.display()
    );
    Ok(())
}
