//! G-code emission for the wall plotter.
//!
//! [`GCodeEmitter`] sequences pen changes, segmented travel and drawing moves
//! for the drawing program. [`emit_calibration`] builds the companion program
//! that dots the corners of the fitted drawing so its placement can be
//! checked on the wall before drawing.
//!
//! All cable moves are relative. Each move is printed with three decimals
//! and the rounding error is carried into the next move, so the printed
//! deltas never drift from the true cable lengths by more than half a
//! micron.

use crate::densifier::PathDensifier;
use crate::kinematics::KinematicsMapper;
use crate::program::{Instruction, MotionProgram, MoveKind, CAROUSEL_HOME_Z};
use tracing::debug;
use wallkit_core::{CableDelta, PenSlot, PlotterParameters, WallPoint};

/// Commanded carousel angle, used to keep every rotation counter-clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarouselState {
    /// Last absolute Z, `None` until the carousel is homed or first moved.
    pub z: Option<f64>,
}

impl CarouselState {
    pub fn homed() -> Self {
        Self {
            z: Some(CAROUSEL_HOME_Z),
        }
    }

    /// Absolute Z that brings `slot` to the wall without turning clockwise,
    /// recorded as the new commanded angle.
    pub fn rotate_to(&mut self, slot: PenSlot) -> f64 {
        let mut target = slot.carousel_angle();
        if let Some(current) = self.z {
            while target < current {
                target += 360.0;
            }
        }
        self.z = Some(target);
        target
    }
}

/// Rounds cable deltas to printed precision, carrying the residual.
#[derive(Debug, Clone, Copy, Default)]
struct DeltaRounder {
    residual_x: f64,
    residual_y: f64,
}

impl DeltaRounder {
    fn round(&mut self, delta: CableDelta) -> (f64, f64) {
        let want_x = delta.x() + self.residual_x;
        let want_y = delta.y() + self.residual_y;
        let x = quantize(want_x);
        let y = quantize(want_y);
        self.residual_x = want_x - x;
        self.residual_y = want_y - y;
        (x, y)
    }
}

fn quantize(value: f64) -> f64 {
    let q = (value * 1000.0).round() / 1000.0;
    if q == 0.0 {
        0.0
    } else {
        q
    }
}

/// Wall-space distances covered by an emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmitStats {
    pub draw_distance_mm: f64,
    pub travel_distance_mm: f64,
}

/// Builds one motion program from a start at the wall center.
#[derive(Debug, Clone)]
pub struct GCodeEmitter {
    params: PlotterParameters,
    densifier: PathDensifier,
    mapper: KinematicsMapper,
    rounder: DeltaRounder,
    carousel: CarouselState,
    lowered: Option<PenSlot>,
    program: MotionProgram,
    stats: EmitStats,
}

impl GCodeEmitter {
    pub fn new(params: &PlotterParameters) -> Self {
        Self {
            params: params.clone(),
            densifier: PathDensifier::from_params(params),
            mapper: KinematicsMapper::new(params.span_mm),
            rounder: DeltaRounder::default(),
            carousel: CarouselState::default(),
            lowered: None,
            program: MotionProgram::new(),
            stats: EmitStats::default(),
        }
    }

    /// Program header, followed by carousel homing when enabled.
    pub fn begin(&mut self) {
        self.program.extend([
            Instruction::UnitsMm,
            Instruction::Relative,
            Instruction::MotorsOn,
        ]);
        if self.params.home_carousel {
            self.program.extend([
                Instruction::Absolute,
                Instruction::HomeCarousel,
                Instruction::SetCarouselHome,
                Instruction::Relative,
            ]);
            self.carousel = CarouselState::homed();
        }
    }

    /// Draw one densified wall-space path with the pen in `slot`.
    ///
    /// A pen change happens only when `slot` is not the pen currently on
    /// the wall. With the same pen the robot travels to the new start with
    /// the pen down, unless `lift_between_paths` is set.
    pub fn draw_path(&mut self, slot: PenSlot, points: &[WallPoint]) {
        let Some((&start, rest)) = points.split_first() else {
            return;
        };

        match self.lowered {
            Some(current) if current == slot => {
                if self.params.lift_between_paths {
                    self.pen_up(current);
                    self.travel(start);
                    self.pen_down();
                } else {
                    self.travel(start);
                }
            }
            current => {
                if let Some(current) = current {
                    self.pen_up(current);
                }
                self.travel(start);
                self.select(slot);
                self.pen_down();
                self.lowered = Some(slot);
            }
        }

        for &point in rest {
            self.cable_move(point, MoveKind::Draw);
        }
    }

    pub fn position(&self) -> WallPoint {
        self.mapper.position()
    }

    pub fn stats(&self) -> EmitStats {
        self.stats
    }

    /// Lift the pen still on the wall, if any, and return the program.
    pub fn finish(mut self) -> MotionProgram {
        if let Some(current) = self.lowered.take() {
            self.pen_up(current);
        }
        debug!(
            "Program finished: {} instructions, {} draw moves, {} travel moves",
            self.program.len(),
            self.program.move_count(MoveKind::Draw),
            self.program.move_count(MoveKind::Travel)
        );
        self.program
    }

    fn select(&mut self, slot: PenSlot) {
        let angle = self.carousel.rotate_to(slot);
        self.program.extend([
            Instruction::Absolute,
            Instruction::CarouselMove {
                angle,
                feed: self.params.carousel_feed,
            },
            Instruction::Relative,
        ]);
    }

    /// Re-seating the slot angle releases the latched pen.
    fn pen_up(&mut self, slot: PenSlot) {
        self.select(slot);
    }

    fn pen_down(&mut self) {
        for _ in 0..self.params.pen_down_pulses {
            self.program.push(Instruction::PenDownPulse);
        }
    }

    fn dwell(&mut self) {
        self.program.push(Instruction::Dwell {
            seconds: self.params.dot_dwell_s,
        });
    }

    fn travel(&mut self, to: WallPoint) {
        let points = self.densifier.travel(self.mapper.position(), to);
        for &point in points.iter().skip(1) {
            self.cable_move(point, MoveKind::Travel);
        }
    }

    fn cable_move(&mut self, to: WallPoint, kind: MoveKind) {
        let distance = (to - self.mapper.position()).length();
        let delta = self.mapper.step_to(to);
        let (x, y) = self.rounder.round(delta);
        let feed = match kind {
            MoveKind::Draw => {
                self.stats.draw_distance_mm += distance;
                self.params.draw_feed
            }
            MoveKind::Travel => {
                self.stats.travel_distance_mm += distance;
                self.params.travel_feed
            }
        };
        self.program.push(Instruction::CableMove { x, y, feed, kind });
    }
}

/// Calibration program: a dot at each corner, in the given order, drawn
/// with the calibration pen.
pub fn emit_calibration(params: &PlotterParameters, corners: &[WallPoint]) -> MotionProgram {
    let mut emitter = GCodeEmitter::new(params);
    if corners.is_empty() {
        return emitter.program;
    }
    let pen = params.calibration_pen;

    emitter.begin();
    emitter.select(pen);
    for &corner in corners {
        emitter.travel(corner);
        emitter.pen_down();
        emitter.dwell();
        emitter.pen_up(pen);
    }
    emitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::geom::point;

    fn lines(program: &MotionProgram) -> Vec<String> {
        program.instructions().iter().map(|i| i.to_string()).collect()
    }

    fn slot(n: u8) -> PenSlot {
        PenSlot::new(n).unwrap()
    }

    #[test]
    fn test_carousel_only_turns_counter_clockwise() {
        let mut carousel = CarouselState::homed();
        assert_eq!(carousel.rotate_to(slot(2)), 161.0);
        assert_eq!(carousel.rotate_to(slot(1)), 449.0);
        assert_eq!(carousel.rotate_to(slot(1)), 449.0);
        assert_eq!(carousel.rotate_to(slot(4)), 665.0);

        let mut unhomed = CarouselState::default();
        assert_eq!(unhomed.rotate_to(slot(3)), 233.0);
    }

    #[test]
    fn test_rounder_carries_residual() {
        let mut rounder = DeltaRounder::default();
        let delta = CableDelta {
            left: 0.0004,
            right: -0.0004,
        };
        let mut printed = 0.0;
        for _ in 0..10 {
            printed += rounder.round(delta).0;
        }
        assert!((printed - 0.004).abs() < 0.0005 + 1e-12);
    }

    #[test]
    fn test_header_and_homing() {
        let mut emitter = GCodeEmitter::new(&PlotterParameters::default());
        emitter.begin();
        let program = emitter.finish();
        assert_eq!(lines(&program), vec!["G21", "G91", "M17", "G90", "G77", "G92 Z-56", "G91"]);

        let params = PlotterParameters {
            home_carousel: false,
            ..Default::default()
        };
        let mut emitter = GCodeEmitter::new(&params);
        emitter.begin();
        assert_eq!(lines(&emitter.finish()), vec!["G21", "G91", "M17"]);
    }

    #[test]
    fn test_first_path_selects_and_lowers_pen() {
        let params = PlotterParameters::default();
        let mut emitter = GCodeEmitter::new(&params);
        emitter.begin();
        emitter.draw_path(slot(1), &[point(930.0, 933.0), point(931.0, 933.0)]);
        let text = lines(&emitter.finish());

        // one travel move, within a single travel step
        let body = &text[7..];
        assert!(body[0].starts_with("G1 X") && body[0].ends_with("F600"));
        assert_eq!(&body[1..4], &["G90", "G1 Z89.000 F600", "G91"]);
        assert_eq!(&body[4..7], &["G101", "G101", "G101"]);
        assert!(body[7].ends_with("F300"));
        assert_eq!(&body[8..], &["G90", "G1 Z89.000 F600", "G91"]);
    }

    #[test]
    fn test_same_pen_keeps_pen_down_for_travel() {
        let params = PlotterParameters::default();
        let mut emitter = GCodeEmitter::new(&params);
        emitter.draw_path(slot(1), &[point(930.0, 930.0), point(931.0, 930.0)]);
        emitter.draw_path(slot(1), &[point(935.0, 930.0), point(936.0, 930.0)]);
        let program = emitter.finish();
        let text = lines(&program);
        assert_eq!(text.iter().filter(|l| *l == "G101").count(), 3);
        assert_eq!(program.move_count(MoveKind::Travel), 1);
        assert_eq!(program.move_count(MoveKind::Draw), 2);
    }

    #[test]
    fn test_lift_between_paths() {
        let params = PlotterParameters {
            lift_between_paths: true,
            ..Default::default()
        };
        let mut emitter = GCodeEmitter::new(&params);
        emitter.draw_path(slot(2), &[point(930.0, 930.0), point(931.0, 930.0)]);
        emitter.draw_path(slot(2), &[point(935.0, 930.0), point(936.0, 930.0)]);
        let text = lines(&emitter.finish());
        assert_eq!(text.iter().filter(|l| *l == "G101").count(), 6);
        assert_eq!(text.iter().filter(|l| l.starts_with("G1 Z")).count(), 3);
    }

    #[test]
    fn test_pen_change_lifts_previous_pen() {
        let mut emitter = GCodeEmitter::new(&PlotterParameters::default());
        emitter.begin();
        emitter.draw_path(slot(1), &[point(930.0, 930.0), point(931.0, 930.0)]);
        emitter.draw_path(slot(3), &[point(931.0, 930.0), point(932.0, 930.0)]);
        let z: Vec<String> = lines(&emitter.finish())
            .into_iter()
            .filter(|l| l.starts_with("G1 Z"))
            .collect();
        // select 1, lift 1, select 3, lift 3
        assert_eq!(
            z,
            vec![
                "G1 Z89.000 F600",
                "G1 Z89.000 F600",
                "G1 Z233.000 F600",
                "G1 Z233.000 F600"
            ]
        );
    }

    #[test]
    fn test_calibration_program_shape() {
        let params = PlotterParameters {
            dot_dwell_s: 0.5,
            calibration_pen: slot(2),
            ..Default::default()
        };
        let corners = [
            point(900.0, 900.0),
            point(960.0, 900.0),
            point(960.0, 960.0),
            point(900.0, 960.0),
        ];
        let program = emit_calibration(&params, &corners);
        let text = lines(&program);
        assert_eq!(text.iter().filter(|l| *l == "G4 S0.500").count(), 4);
        assert_eq!(text.iter().filter(|l| *l == "G101").count(), 12);
        assert_eq!(&text[7..10], &["G90", "G1 Z161.000 F600", "G91"]);
        assert_eq!(program.move_count(MoveKind::Draw), 0);
        assert!(program.move_count(MoveKind::Travel) > 0);
        assert!(emit_calibration(&params, &[]).is_empty());
    }
}
