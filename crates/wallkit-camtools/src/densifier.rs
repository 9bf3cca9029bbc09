//! Re-sampling wall-space paths into short straight moves.
//!
//! Lines are split into equal pieces. Curves are pre-flattened at a fine
//! chord tolerance to measure their length, then re-sampled at equal
//! arc-length intervals along that flattening. Either way no two
//! consecutive points are further apart than the step.

use wallkit_core::{DrawablePath, PlotterParameters, Segment, WallPoint};

/// Slack so that a length which is an exact multiple of the step (up to
/// floating-point noise) does not gain an extra piece.
const PIECE_EPSILON: f64 = 1e-9;

/// Lengths at or below this are treated as zero.
const MIN_LENGTH: f64 = 1e-9;

/// Number of equal pieces needed so that each piece is at most `step` long.
pub fn piece_count(length: f64, step: f64) -> usize {
    ((length / step - PIECE_EPSILON).ceil() as usize).max(1)
}

#[derive(Debug, Clone, Copy)]
pub struct PathDensifier {
    draw_step: f64,
    travel_step: f64,
    tolerance: f64,
}

impl PathDensifier {
    pub fn new(draw_step: f64, travel_step: f64, tolerance: f64) -> Self {
        Self {
            draw_step,
            travel_step,
            tolerance,
        }
    }

    pub fn from_params(params: &PlotterParameters) -> Self {
        Self::new(
            params.draw_step_mm,
            params.travel_step_mm,
            params.flatten_tolerance_mm,
        )
    }

    /// Points to visit with the pen down, starting with the path start.
    ///
    /// A path made only of zero-length segments yields its start point alone.
    pub fn densify(&self, path: &DrawablePath) -> Vec<WallPoint> {
        let Some(start) = path.start() else {
            return Vec::new();
        };
        let mut points = vec![start];
        for segment in &path.segments {
            match segment {
                Segment::Line(line) => {
                    split_line(line.from, line.to, self.draw_step, &mut points)
                }
                curve => self.resample_curve(curve, &mut points),
            }
        }
        points
    }

    /// Points of a straight pen-up move, starting with `from`.
    ///
    /// Returns `from` alone when the move has no length.
    pub fn travel(&self, from: WallPoint, to: WallPoint) -> Vec<WallPoint> {
        let mut points = vec![from];
        split_line(from, to, self.travel_step, &mut points);
        points
    }

    fn resample_curve(&self, curve: &Segment, points: &mut Vec<WallPoint>) {
        let mut polyline = vec![curve.from()];
        curve.for_each_flattened(self.tolerance, &mut |p| polyline.push(p));

        let mut cumulative = Vec::with_capacity(polyline.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in polyline.windows(2) {
            total += (pair[1] - pair[0]).length();
            cumulative.push(total);
        }
        if total <= MIN_LENGTH {
            return;
        }

        let n = piece_count(total, self.draw_step);
        let mut index = 1;
        for i in 1..n {
            let target = total * i as f64 / n as f64;
            while index < cumulative.len() - 1 && cumulative[index] < target {
                index += 1;
            }
            let (a, b) = (polyline[index - 1], polyline[index]);
            let span = cumulative[index] - cumulative[index - 1];
            let t = if span > 0.0 {
                (target - cumulative[index - 1]) / span
            } else {
                1.0
            };
            points.push(a.lerp(b, t));
        }
        points.push(curve.to());
    }
}

/// Append the points splitting `from -> to` into equal pieces of at most
/// `step`, ending exactly on `to`. Zero-length lines add nothing.
fn split_line(from: WallPoint, to: WallPoint, step: f64, points: &mut Vec<WallPoint>) {
    let length = (to - from).length();
    if length <= MIN_LENGTH {
        return;
    }
    let n = piece_count(length, step);
    for i in 1..n {
        points.push(from.lerp(to, i as f64 / n as f64));
    }
    points.push(to);
}
