use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use wallkit::{init_logging, Config, PenSlot, WallPlotter, BUILD_DATE, VERSION};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input SVG drawing
    #[arg(value_name = "SVG")]
    svg: PathBuf,

    /// Configuration file (.toml or .json); defaults to the user config if present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Distance between the two cable anchors (mm)
    #[arg(long, value_name = "MM")]
    span: Option<f64>,

    /// Fraction of the span the drawing's larger side is scaled to
    #[arg(long, value_name = "FRACTION")]
    fit_fraction: Option<f64>,

    /// Maximum pen-down step (mm)
    #[arg(long, value_name = "MM")]
    step: Option<f64>,

    /// Maximum pen-up step (mm)
    #[arg(long, value_name = "MM")]
    travel_step: Option<f64>,

    /// Feed rate for pen-down moves
    #[arg(long, value_name = "FEED")]
    draw_feed: Option<u32>,

    /// Feed rate for pen-up moves
    #[arg(long, value_name = "FEED")]
    travel_feed: Option<u32>,

    /// Feed rate for carousel moves
    #[arg(long, value_name = "FEED")]
    carousel_feed: Option<u32>,

    /// Dwell at each calibration dot (seconds)
    #[arg(long, value_name = "SECONDS")]
    dot_dwell: Option<f64>,

    /// Pen slot (1-4) used for the calibration dots
    #[arg(long, value_name = "SLOT")]
    calibration_pen: Option<u8>,

    /// Do not home the carousel at program start
    #[arg(long)]
    no_home_carousel: bool,

    /// Lift the pen for every travel move
    #[arg(long)]
    lift_between_paths: bool,

    /// Drawing program output file
    #[arg(long, value_name = "FILE")]
    out_draw: Option<PathBuf>,

    /// Calibration program output file
    #[arg(long, value_name = "FILE")]
    out_bbox: Option<PathBuf>,

    /// Also write the conversion summary as JSON
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Save the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

impl Cli {
    /// Apply command line overrides on top of a loaded configuration.
    fn apply(&self, config: &mut Config) -> Result<()> {
        let plotter = &mut config.plotter;
        if let Some(v) = self.span {
            plotter.span_mm = v;
        }
        if let Some(v) = self.fit_fraction {
            plotter.fit_fraction = v;
        }
        if let Some(v) = self.step {
            plotter.draw_step_mm = v;
        }
        if let Some(v) = self.travel_step {
            plotter.travel_step_mm = v;
        }
        if let Some(v) = self.draw_feed {
            plotter.draw_feed = v;
        }
        if let Some(v) = self.travel_feed {
            plotter.travel_feed = v;
        }
        if let Some(v) = self.carousel_feed {
            plotter.carousel_feed = v;
        }
        if let Some(v) = self.dot_dwell {
            plotter.dot_dwell_s = v;
        }
        if let Some(n) = self.calibration_pen {
            plotter.calibration_pen = PenSlot::try_from(n).map_err(anyhow::Error::msg)?;
        }
        if self.no_home_carousel {
            plotter.home_carousel = false;
        }
        if self.lift_between_paths {
            plotter.lift_between_paths = true;
        }
        if let Some(path) = &self.out_draw {
            config.output.drawing = path.clone();
        }
        if let Some(path) = &self.out_bbox {
            config.output.calibration = path.clone();
        }
        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(_) => Ok(Config::default()),
        },
    }
}

/// Write every output or none of them: files already written are removed
/// when a later write fails.
fn write_outputs(files: &[(&PathBuf, String)]) -> Result<()> {
    for (i, (path, text)) in files.iter().enumerate() {
        if let Err(e) = std::fs::write(path, text) {
            for (written, _) in &files[..i] {
                if let Err(e) = std::fs::remove_file(written) {
                    warn!("Failed to remove {}: {}", written.display(), e);
                }
            }
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
    }
    for (path, _) in files {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    info!("wallkit {} (built {})", VERSION, BUILD_DATE);

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    config.validate().context("Invalid configuration")?;

    if let Some(path) = &cli.write_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        info!("Wrote config {}", path.display());
        return Ok(());
    }

    let output = WallPlotter::from_file(&cli.svg, config.plotter.clone())
        .with_context(|| format!("Failed to read {}", cli.svg.display()))?
        .generate()
        .with_context(|| format!("Failed to convert {}", cli.svg.display()))?;

    if output.drawing.is_empty() {
        warn!("{} has no drawable strokes", cli.svg.display());
    }

    // Nothing is written unless the whole conversion succeeded.
    write_outputs(&[
        (&config.output.calibration, output.calibration.render()),
        (&config.output.drawing, output.drawing.render()),
    ])?;

    let summary = &output.summary;
    if let Some(scale) = summary.scale {
        info!(
            "span={:.1} mm scale={:.6} fit_fraction={} step={} travel_step={}",
            config.plotter.span_mm,
            scale,
            config.plotter.fit_fraction,
            config.plotter.draw_step_mm,
            config.plotter.travel_step_mm
        );
    }
    for pen in &summary.pens {
        info!("{} -> pen {} ({} paths)", pen.color, pen.pen, pen.paths);
    }

    if let Some(path) = &cli.summary {
        let json = summary.to_json().context("Failed to serialize summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
