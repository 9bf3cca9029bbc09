//! # WallKit
//!
//! Converts stroked SVG line art into relative G-code for a wall-hung drawing
//! robot that moves by changing the length of two cables anchored at the top
//! corners of the wall, and carries four pens on a rotating carousel.
//!
//! ## Architecture
//!
//! WallKit is organized as a workspace with multiple crates:
//!
//! 1. **wallkit-core** - Geometry, cable state, pen slots and parameters
//! 2. **wallkit-camtools** - The SVG to G-code pipeline
//! 3. **wallkit-settings** - TOML/JSON configuration files
//! 4. **wallkit** - Command line tool that integrates all crates
//!
//! ## Outputs
//!
//! - **Drawing program**: every stroke, with pen changes by color
//! - **Calibration program**: a dot at each corner of the fitted drawing

pub use wallkit_camtools::{
    emit_calibration, normalize_color, FitLayout, GCodeEmitter, GeometryFitter, Instruction,
    KinematicsMapper, MotionProgram, PathDensifier, PenClassifier, PlotSummary, PlotterError,
    PlotterOutput, SvgImporter, WallPlotter,
};
pub use wallkit_core::{
    CableDelta, CableState, DrawablePath, ParameterError, PenSlot, PlotterParameters, Segment,
    WallPoint,
};
pub use wallkit_settings::{Config, OutputSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr at INFO unless `RUST_LOG` says otherwise, keeping
/// stdout free for program text.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
