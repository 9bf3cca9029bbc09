//! Motion program instructions and rendering.

use std::fmt;

/// Absolute carousel Z (degrees) established by homing.
pub const CAROUSEL_HOME_Z: f64 = -56.0;

/// What a cable move is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Pen on the wall.
    Draw,
    /// Repositioning without ink.
    Travel,
}

/// One line of a motion program.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `G21`
    UnitsMm,
    /// `G91`
    Relative,
    /// `G90`
    Absolute,
    /// `M17`
    MotorsOn,
    /// `G77`
    HomeCarousel,
    /// `G92 Z-56`
    SetCarouselHome,
    /// Absolute carousel rotation, `G1 Z<deg> F<feed>`.
    CarouselMove { angle: f64, feed: u32 },
    /// `G101`, one pen-down pulse.
    PenDownPulse,
    /// `G4 S<seconds>`
    Dwell { seconds: f64 },
    /// Relative cable move, `G1 X<dL> Y<-dR> F<feed>`.
    CableMove {
        x: f64,
        y: f64,
        feed: u32,
        kind: MoveKind,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitsMm => f.write_str("G21"),
            Self::Relative => f.write_str("G91"),
            Self::Absolute => f.write_str("G90"),
            Self::MotorsOn => f.write_str("M17"),
            Self::HomeCarousel => f.write_str("G77"),
            Self::SetCarouselHome => write!(f, "G92 Z{}", CAROUSEL_HOME_Z),
            Self::CarouselMove { angle, feed } => {
                write!(f, "G1 Z{} F{}", Millis(*angle), feed)
            }
            Self::PenDownPulse => f.write_str("G101"),
            Self::Dwell { seconds } => write!(f, "G4 S{}", Millis(*seconds)),
            Self::CableMove { x, y, feed, .. } => {
                write!(f, "G1 X{} Y{} F{}", Millis(*x), Millis(*y), feed)
            }
        }
    }
}

/// Three-decimal number that never prints as `-0.000`.
struct Millis(f64);

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = (self.0 * 1000.0).round() / 1000.0;
        let v = if v == 0.0 { 0.0 } else { v };
        write!(f, "{:.3}", v)
    }
}

/// Append-only instruction sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionProgram {
    instructions: Vec<Instruction>,
}

impl MotionProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn extend<I: IntoIterator<Item = Instruction>>(&mut self, instructions: I) {
        self.instructions.extend(instructions);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of cable moves of the given kind.
    pub fn move_count(&self, kind: MoveKind) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::CableMove { kind: k, .. } if *k == kind))
            .count()
    }

    /// Program text: one instruction per line with a trailing newline, or the
    /// empty string for an empty program.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            out.push_str(&instruction.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for MotionProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        assert_eq!(Instruction::UnitsMm.to_string(), "G21");
        assert_eq!(Instruction::SetCarouselHome.to_string(), "G92 Z-56");
        assert_eq!(
            Instruction::CarouselMove {
                angle: 449.0,
                feed: 600
            }
            .to_string(),
            "G1 Z449.000 F600"
        );
        assert_eq!(Instruction::Dwell { seconds: 0.2 }.to_string(), "G4 S0.200");
        assert_eq!(
            Instruction::CableMove {
                x: 1.23456,
                y: -0.5,
                feed: 300,
                kind: MoveKind::Draw
            }
            .to_string(),
            "G1 X1.235 Y-0.500 F300"
        );
    }

    #[test]
    fn test_negative_zero_is_printed_as_zero() {
        let text = Instruction::CableMove {
            x: -0.0,
            y: -0.0004,
            feed: 600,
            kind: MoveKind::Travel,
        }
        .to_string();
        assert_eq!(text, "G1 X0.000 Y0.000 F600");
    }

    #[test]
    fn test_render() {
        let mut program = MotionProgram::new();
        assert_eq!(program.render(), "");
        program.extend([Instruction::UnitsMm, Instruction::Relative]);
        program.push(Instruction::CableMove {
            x: 1.0,
            y: 2.0,
            feed: 300,
            kind: MoveKind::Draw,
        });
        assert_eq!(program.render(), "G21\nG91\nG1 X1.000 Y2.000 F300\n");
        assert_eq!(program.to_string(), program.render());
        assert_eq!(program.move_count(MoveKind::Draw), 1);
        assert_eq!(program.move_count(MoveKind::Travel), 0);
        assert_eq!(program.len(), 3);
    }
}
