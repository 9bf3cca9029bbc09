//! Conversion parameters.
//!
//! One [`PlotterParameters`] value drives a whole conversion run. Defaults
//! match a stock robot on a 1860 mm anchor span.

use crate::error::{ParameterError, ParameterResult};
use crate::pen::PenSlot;
use serde::{Deserialize, Serialize};

/// Wall plotter conversion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterParameters {
    /// Distance between the two cable anchors (mm)
    pub span_mm: f64,
    /// Fraction of the span the drawing's larger dimension is scaled to
    pub fit_fraction: f64,
    /// Maximum wall-space length of one pen-down move (mm)
    pub draw_step_mm: f64,
    /// Maximum wall-space length of one pen-up move (mm)
    pub travel_step_mm: f64,
    /// Feed rate for pen-down moves
    pub draw_feed: u32,
    /// Feed rate for pen-up moves
    pub travel_feed: u32,
    /// Feed rate for carousel rotation (pen select / pen up)
    pub carousel_feed: u32,
    /// Dwell at each calibration dot (seconds)
    pub dot_dwell_s: f64,
    /// Pen used for the calibration dots
    pub calibration_pen: PenSlot,
    /// Home the carousel at the start of every program
    pub home_carousel: bool,
    /// Number of pen-down pulses needed to latch the pen against the wall
    pub pen_down_pulses: u32,
    /// Lift the pen for every travel move, even between strokes of one pen
    pub lift_between_paths: bool,
    /// Chord tolerance used when measuring curve length (mm)
    pub flatten_tolerance_mm: f64,
}

impl Default for PlotterParameters {
    fn default() -> Self {
        Self {
            span_mm: 1860.0,
            fit_fraction: 0.70,
            draw_step_mm: 1.0,
            travel_step_mm: 5.0,
            draw_feed: 300,
            travel_feed: 600,
            carousel_feed: 600,
            dot_dwell_s: 0.20,
            calibration_pen: PenSlot::FIRST,
            home_carousel: true,
            pen_down_pulses: 3,
            lift_between_paths: false,
            flatten_tolerance_mm: 0.01,
        }
    }
}

impl PlotterParameters {
    /// Reject any value that would make the conversion meaningless.
    pub fn validate(&self) -> ParameterResult<()> {
        if !self.span_mm.is_finite() || self.span_mm <= 0.0 {
            return Err(ParameterError::out_of_range("span_mm", self.span_mm, "> 0"));
        }
        if !(self.fit_fraction > 0.0 && self.fit_fraction <= 1.0) {
            return Err(ParameterError::out_of_range(
                "fit_fraction",
                self.fit_fraction,
                "(0, 1]",
            ));
        }
        positive("draw_step_mm", self.draw_step_mm)?;
        positive("travel_step_mm", self.travel_step_mm)?;
        positive("flatten_tolerance_mm", self.flatten_tolerance_mm)?;

        for (name, feed) in [
            ("draw_feed", self.draw_feed),
            ("travel_feed", self.travel_feed),
            ("carousel_feed", self.carousel_feed),
        ] {
            if feed == 0 {
                return Err(ParameterError::out_of_range(name, 0.0, "> 0"));
            }
        }

        if !self.dot_dwell_s.is_finite() || self.dot_dwell_s < 0.0 {
            return Err(ParameterError::out_of_range(
                "dot_dwell_s",
                self.dot_dwell_s,
                ">= 0",
            ));
        }
        if self.pen_down_pulses == 0 {
            return Err(ParameterError::InvalidValue {
                name: "pen_down_pulses".to_string(),
                reason: "at least one pulse is needed to lower the pen".to_string(),
            });
        }
        Ok(())
    }

    /// Center of the working rectangle, where the robot is parked at start.
    pub fn wall_center(&self) -> crate::WallPoint {
        lyon::geom::point(self.span_mm / 2.0, self.span_mm / 2.0)
    }
}

fn positive(name: &str, value: f64) -> ParameterResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::out_of_range(name, value, "> 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = PlotterParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.wall_center(), lyon::geom::point(930.0, 930.0));
    }

    #[test]
    fn test_rejects_non_positive_span() {
        for span in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let params = PlotterParameters {
                span_mm: span,
                ..Default::default()
            };
            let err = params.validate().unwrap_err();
            assert_eq!(err.parameter(), "span_mm");
        }
    }

    #[test]
    fn test_rejects_fit_fraction_outside_unit_interval() {
        for fraction in [0.0, -0.5, 1.01] {
            let params = PlotterParameters {
                fit_fraction: fraction,
                ..Default::default()
            };
            assert_eq!(params.validate().unwrap_err().parameter(), "fit_fraction");
        }
        let full = PlotterParameters {
            fit_fraction: 1.0,
            ..Default::default()
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_steps_and_feeds() {
        let params = PlotterParameters {
            draw_step_mm: 0.0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().parameter(), "draw_step_mm");

        let params = PlotterParameters {
            travel_step_mm: -1.0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().parameter(), "travel_step_mm");

        let params = PlotterParameters {
            travel_feed: 0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().parameter(), "travel_feed");

        let params = PlotterParameters {
            pen_down_pulses: 0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().parameter(), "pen_down_pulses");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: PlotterParameters =
            serde_json::from_str(r#"{ "span_mm": 2000.0, "calibration_pen": 2 }"#).unwrap();
        assert_eq!(params.span_mm, 2000.0);
        assert_eq!(params.calibration_pen.number(), 2);
        assert_eq!(params.draw_step_mm, 1.0);
    }
}
