//! Pen carousel slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of physical pen positions on the carousel.
pub const PEN_SLOT_COUNT: u8 = 4;

/// Carousel angle (degrees) at which each slot's pen faces the wall, indexed
/// by `slot - 1`.
const SLOT_ANGLES: [f64; PEN_SLOT_COUNT as usize] = [89.0, 161.0, 233.0, 305.0];

/// A pen slot in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PenSlot(u8);

impl PenSlot {
    pub const FIRST: PenSlot = PenSlot(1);

    /// Returns `None` unless `1 <= number <= 4`.
    pub fn new(number: u8) -> Option<Self> {
        (1..=PEN_SLOT_COUNT).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Carousel angle for this slot in degrees.
    pub fn carousel_angle(self) -> f64 {
        SLOT_ANGLES[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for PenSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("pen slot must be 1..={}, got {}", PEN_SLOT_COUNT, value))
    }
}

impl From<PenSlot> for u8 {
    fn from(slot: PenSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for PenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pen {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range() {
        assert!(PenSlot::new(0).is_none());
        assert!(PenSlot::new(5).is_none());
        assert_eq!(PenSlot::new(4).map(PenSlot::number), Some(4));
        assert_eq!(PenSlot::FIRST.number(), 1);
    }

    #[test]
    fn test_carousel_angles() {
        let angles: Vec<f64> = (1..=4)
            .filter_map(PenSlot::new)
            .map(PenSlot::carousel_angle)
            .collect();
        assert_eq!(angles, vec![89.0, 161.0, 233.0, 305.0]);
    }

    #[test]
    fn test_serde_rejects_invalid_slot() {
        let ok: PenSlot = serde_json::from_str("3").unwrap();
        assert_eq!(ok.number(), 3);
        assert!(serde_json::from_str::<PenSlot>("7").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "3");
    }
}
