//! Error types for the conversion pipeline.
//!
//! Only problems that must stop a conversion live here. Malformed documents
//! and degenerate geometry are recovered from (logged, empty or fallback
//! result) and never surface as errors.

use std::io;
use thiserror::Error;
use wallkit_core::ParameterError;

/// Errors that can stop a wall plotter conversion.
#[derive(Error, Debug)]
pub enum PlotterError {
    /// A conversion parameter failed validation.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The document uses more stroke colors than the carousel has pens.
    #[error(
        "Pen slots exhausted: color '{color}' of path {path_index} ({origin}) needs a 5th pen; \
         slots already hold {assigned:?}"
    )]
    PenSlotsExhausted {
        /// Canonical color that could not be assigned.
        color: String,
        /// Index of the first path using that color, in document order.
        path_index: usize,
        /// Element the path came from.
        origin: String,
        /// Colors holding slots 1 to 4, in slot order.
        assigned: Vec<String>,
    },

    /// I/O error while reading the source document.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for conversion operations.
pub type PlotterResult<T> = Result<T, PlotterError>;
