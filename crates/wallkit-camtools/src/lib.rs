//! # WallKit CAM Tools
//!
//! Compiles SVG line art into relative G-code for a two-cable wall drawing
//! robot with a four-pen carousel.
//!
//! ## Pipeline
//!
//! - **SVG Import**: stroked shapes to analytic paths, with stroke colors
//! - **Fitter**: uniform scale and centering onto the wall
//! - **Densifier**: bounded-length re-sampling of lines and curves
//! - **Kinematics**: wall points to left/right cable length deltas
//! - **Pen Classifier**: stroke colors to carousel slots
//! - **Emitter**: drawing and calibration programs
//!
//! [`WallPlotter`] ties the stages together.

pub mod densifier;
pub mod emitter;
pub mod error;
pub mod fitter;
pub mod kinematics;
pub mod pen_classifier;
pub mod program;
pub mod svg_import;
pub mod wall_plotter;

// Re-export commonly used items
pub use densifier::{piece_count, PathDensifier};
pub use emitter::{emit_calibration, CarouselState, EmitStats, GCodeEmitter};
pub use error::{PlotterError, PlotterResult};
pub use fitter::{FitLayout, FitTransform, GeometryFitter, MIN_SOURCE_EXTENT};
pub use kinematics::KinematicsMapper;
pub use pen_classifier::{normalize_color, PenClassifier};
pub use program::{Instruction, MotionProgram, MoveKind, CAROUSEL_HOME_Z};
pub use svg_import::{SvgImporter, DEFAULT_STROKE};
pub use wall_plotter::{PenUsage, PlotSummary, PlotterOutput, WallPlotter};
