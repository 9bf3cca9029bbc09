//! SVG to wall plotter conversion.
//!
//! [`WallPlotter`] runs the whole pipeline for one document: extraction,
//! pen assignment, fitting, densification and emission of both the drawing
//! and the calibration program.

use crate::densifier::PathDensifier;
use crate::emitter::{emit_calibration, GCodeEmitter};
use crate::error::PlotterResult;
use crate::fitter::GeometryFitter;
use crate::pen_classifier::PenClassifier;
use crate::program::{MotionProgram, MoveKind};
use crate::svg_import::SvgImporter;
use serde::Serialize;
use std::path::Path as StdPath;
use tracing::{debug, info, warn};
use wallkit_core::{DrawablePath, PenSlot, PlotterParameters};

/// Pen table entry of a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenUsage {
    pub color: String,
    pub pen: u8,
    pub paths: usize,
}

/// What a conversion produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotSummary {
    pub path_count: usize,
    /// Source to wall scale, absent for an empty drawing.
    pub scale: Option<f64>,
    /// Fitted bounds as `[min_x, min_y, max_x, max_y]` in wall mm.
    pub wall_bounds: Option<[f64; 4]>,
    pub pens: Vec<PenUsage>,
    pub draw_segments: usize,
    pub travel_segments: usize,
    pub draw_distance_mm: f64,
    pub travel_distance_mm: f64,
    /// Rough run time of the drawing program from the feed rates.
    pub estimated_seconds: f64,
}

impl PlotSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Both programs and the summary of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotterOutput {
    pub drawing: MotionProgram,
    pub calibration: MotionProgram,
    pub summary: PlotSummary,
}

/// Converter for one SVG document.
#[derive(Debug, Clone)]
pub struct WallPlotter {
    params: PlotterParameters,
    paths: Vec<DrawablePath>,
}

impl WallPlotter {
    /// Create a plotter from SVG content.
    pub fn from_str(svg_content: &str, params: PlotterParameters) -> PlotterResult<Self> {
        params.validate()?;
        let paths = SvgImporter::new().import_str(svg_content);
        Ok(Self { params, paths })
    }

    /// Create a plotter from an SVG file.
    pub fn from_file<P: AsRef<StdPath>>(path: P, params: PlotterParameters) -> PlotterResult<Self> {
        params.validate()?;
        let paths = SvgImporter::new().import_file(path.as_ref())?;
        debug!("Loaded {} paths from {}", paths.len(), path.as_ref().display());
        Ok(Self { params, paths })
    }

    /// Create a plotter from already extracted paths.
    pub fn from_paths(paths: Vec<DrawablePath>, params: PlotterParameters) -> PlotterResult<Self> {
        params.validate()?;
        Ok(Self { params, paths })
    }

    pub fn paths(&self) -> &[DrawablePath] {
        &self.paths
    }

    /// Run the conversion.
    ///
    /// Pen assignment covers every path before anything is emitted, so a
    /// document with too many colors fails without producing output.
    pub fn generate(&self) -> PlotterResult<PlotterOutput> {
        let mut pens = PenClassifier::new();
        let slots = self
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| pens.classify_path(path, i))
            .collect::<PlotterResult<Vec<PenSlot>>>()?;

        let fitter = GeometryFitter::new(self.params.span_mm, self.params.fit_fraction);
        let Some(layout) = fitter.fit(&self.paths) else {
            warn!("No drawable strokes found; programs are empty");
            return Ok(PlotterOutput {
                drawing: MotionProgram::new(),
                calibration: MotionProgram::new(),
                summary: PlotSummary::default(),
            });
        };

        let densifier = PathDensifier::from_params(&self.params);
        let mut emitter = GCodeEmitter::new(&self.params);
        emitter.begin();
        for (path, &slot) in layout.apply(&self.paths).iter().zip(&slots) {
            emitter.draw_path(slot, &densifier.densify(path));
        }
        let stats = emitter.stats();
        let drawing = emitter.finish();
        let calibration = emit_calibration(&self.params, &layout.corners());

        let pen_table = pens
            .assignments()
            .into_iter()
            .map(|(color, slot)| PenUsage {
                color,
                pen: slot.number(),
                paths: slots.iter().filter(|s| **s == slot).count(),
            })
            .collect();

        let b = layout.wall_bounds;
        let summary = PlotSummary {
            path_count: self.paths.len(),
            scale: Some(layout.transform.scale),
            wall_bounds: Some([b.min.x, b.min.y, b.max.x, b.max.y]),
            pens: pen_table,
            draw_segments: drawing.move_count(MoveKind::Draw),
            travel_segments: drawing.move_count(MoveKind::Travel),
            draw_distance_mm: stats.draw_distance_mm,
            travel_distance_mm: stats.travel_distance_mm,
            estimated_seconds: self.estimate_time(stats.draw_distance_mm, stats.travel_distance_mm),
        };
        info!(
            "Converted {} paths: {} draw / {} travel moves, ~{:.0} s",
            summary.path_count,
            summary.draw_segments,
            summary.travel_segments,
            summary.estimated_seconds
        );

        Ok(PlotterOutput {
            drawing,
            calibration,
            summary,
        })
    }

    /// Seconds needed to cover the distances at the configured feeds
    /// (mm/min), ignoring carousel moves.
    fn estimate_time(&self, draw_mm: f64, travel_mm: f64) -> f64 {
        let drawing = draw_mm / f64::from(self.params.draw_feed) * 60.0;
        let travel = travel_mm / f64::from(self.params.travel_feed) * 60.0;
        drawing + travel
    }
}
