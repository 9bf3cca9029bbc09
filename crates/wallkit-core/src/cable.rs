//! Dual-cable coordinate frame.
//!
//! The robot hangs from two anchors at `(0, 0)` and `(D, 0)`; its position is
//! expressed by the lengths of the left and right cables.

use crate::geometry::WallPoint;

/// Left and right cable lengths (mm) for one wall position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableState {
    pub left: f64,
    pub right: f64,
}

impl CableState {
    /// Cable lengths at `point` for anchors separated by `span` mm.
    pub fn at(point: WallPoint, span: f64) -> Self {
        Self {
            left: point.x.hypot(point.y),
            right: (span - point.x).hypot(point.y),
        }
    }

    /// Change in cable lengths needed to move from `self` to `next`.
    pub fn delta_to(&self, next: &CableState) -> CableDelta {
        CableDelta {
            left: next.left - self.left,
            right: next.right - self.right,
        }
    }
}

/// Relative change of both cable lengths for one move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CableDelta {
    pub left: f64,
    pub right: f64,
}

impl CableDelta {
    /// Firmware X axis: the left cable change.
    pub fn x(&self) -> f64 {
        self.left
    }

    /// Firmware Y axis: the right cable change, inverted to match the motor
    /// wiring (longer right cable is negative Y).
    pub fn y(&self) -> f64 {
        -self.right
    }
}

impl std::ops::Add for CableDelta {
    type Output = CableDelta;

    fn add(self, rhs: CableDelta) -> CableDelta {
        CableDelta {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl std::iter::Sum for CableDelta {
    fn sum<I: Iterator<Item = CableDelta>>(iter: I) -> Self {
        iter.fold(CableDelta::default(), |acc, d| acc + d)
    }
}
