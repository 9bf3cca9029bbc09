//! # WallKit Core
//!
//! Core types shared by every stage of the wall plotter compiler:
//!
//! - **Geometry**: wall points, source primitives and drawable paths
//! - **Cable state**: the dual-cable-length frame of the robot
//! - **Pens**: carousel slot identifiers
//! - **Parameters**: validated conversion settings
//! - **Errors**: parameter validation errors

pub mod cable;
pub mod error;
pub mod geometry;
pub mod params;
pub mod pen;

pub use cable::{CableDelta, CableState};
pub use error::{ParameterError, ParameterResult};
pub use geometry::{bounds_of, merge_boxes, DrawablePath, Segment, WallPoint};
pub use params::PlotterParameters;
pub use pen::{PenSlot, PEN_SLOT_COUNT};
