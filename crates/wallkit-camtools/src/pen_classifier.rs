//! Stroke color to pen slot assignment.

use crate::error::{PlotterError, PlotterResult};
use std::str::FromStr;
use tracing::debug;
use wallkit_core::{DrawablePath, PenSlot, PEN_SLOT_COUNT};

/// Canonical form of a stroke color token.
///
/// Hex (`#rgb`, `#rrggbb`), functional (`rgb(...)`) and named colors become
/// lowercase `#rrggbb`. `none` and `transparent` mean "no stroke" and give
/// `None`. Anything else is kept as trimmed lowercase text so that distinct
/// unknown tokens still get distinct pens.
pub fn normalize_color(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty()
        || token.eq_ignore_ascii_case("none")
        || token.eq_ignore_ascii_case("transparent")
    {
        return None;
    }
    let token = token.to_ascii_lowercase();
    match svgtypes::Color::from_str(&token) {
        Ok(c) => Some(format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)),
        Err(_) => Some(token),
    }
}

/// Assigns pen slots to colors in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct PenClassifier {
    /// Canonical colors; position `i` holds slot `i + 1`.
    assigned: Vec<String>,
}

impl PenClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for a color token seen on path `path_index`.
    pub fn classify(&mut self, color: &str, path_index: usize) -> PlotterResult<PenSlot> {
        self.assign(color, path_index, "")
    }

    /// Slot for a path's stroke, naming the path's element on failure.
    pub fn classify_path(
        &mut self,
        path: &DrawablePath,
        path_index: usize,
    ) -> PlotterResult<PenSlot> {
        self.assign(&path.stroke, path_index, &path.origin)
    }

    /// Slot already holding `color`, if any.
    pub fn slot_of(&self, color: &str) -> Option<PenSlot> {
        let key = canonical(color);
        self.assigned
            .iter()
            .position(|c| *c == key)
            .and_then(slot_at)
    }

    /// Color to slot table in slot order.
    pub fn assignments(&self) -> Vec<(String, PenSlot)> {
        self.assigned
            .iter()
            .enumerate()
            .filter_map(|(i, c)| slot_at(i).map(|slot| (c.clone(), slot)))
            .collect()
    }

    fn assign(&mut self, color: &str, path_index: usize, origin: &str) -> PlotterResult<PenSlot> {
        let key = canonical(color);
        if let Some(i) = self.assigned.iter().position(|c| *c == key) {
            if let Some(slot) = slot_at(i) {
                return Ok(slot);
            }
        }

        match slot_at(self.assigned.len()) {
            Some(slot) => {
                debug!("Color {} -> {} (first used by path {})", key, slot, path_index);
                self.assigned.push(key);
                Ok(slot)
            }
            None => Err(PlotterError::PenSlotsExhausted {
                color: key,
                path_index,
                origin: origin.to_string(),
                assigned: self.assigned.clone(),
            }),
        }
    }
}

fn canonical(color: &str) -> String {
    normalize_color(color).unwrap_or_else(|| color.trim().to_ascii_lowercase())
}

fn slot_at(index: usize) -> Option<PenSlot> {
    u8::try_from(index + 1)
        .ok()
        .filter(|n| *n <= PEN_SLOT_COUNT)
        .and_then(PenSlot::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_color_forms() {
        assert_eq!(normalize_color("#F00").as_deref(), Some("#ff0000"));
        assert_eq!(normalize_color(" #00FF7f ").as_deref(), Some("#00ff7f"));
        assert_eq!(normalize_color("rgb(0, 0, 255)").as_deref(), Some("#0000ff"));
        assert_eq!(normalize_color("Red").as_deref(), Some("#ff0000"));
        assert_eq!(normalize_color("black").as_deref(), Some("#000000"));
        assert_eq!(normalize_color("none"), None);
        assert_eq!(normalize_color("Transparent"), None);
        assert_eq!(normalize_color(""), None);
    }

    #[test]
    fn test_unknown_token_is_kept_lowercase() {
        assert_eq!(
            normalize_color("url(#Gradient)").as_deref(),
            Some("url(#gradient)")
        );
    }

    #[test]
    fn test_first_appearance_order() {
        let mut pens = PenClassifier::new();
        let slots: Vec<u8> = ["#a00", "#0b0", "#a00", "#00c"]
            .iter()
            .enumerate()
            .map(|(i, c)| pens.classify(c, i).unwrap().number())
            .collect();
        assert_eq!(slots, vec![1, 2, 1, 3]);
        assert_eq!(pens.slot_of("#aa0000"), PenSlot::new(1));
        assert_eq!(pens.slot_of("#123456"), None);
    }

    #[test]
    fn test_equivalent_spellings_share_a_slot() {
        let mut pens = PenClassifier::new();
        let a = pens.classify("red", 0).unwrap();
        let b = pens.classify("#FF0000", 1).unwrap();
        let c = pens.classify("rgb(255,0,0)", 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(pens.assignments().len(), 1);
    }

    #[test]
    fn test_fifth_color_is_rejected() {
        let mut pens = PenClassifier::new();
        for (i, c) in ["#000", "#f00", "#0f0", "#00f"].iter().enumerate() {
            pens.classify(c, i).unwrap();
        }
        // known colors still resolve once full
        assert_eq!(pens.classify("#00f", 4).unwrap().number(), 4);

        let path = DrawablePath::new(vec![], "magenta", "path#e");
        match pens.classify_path(&path, 5) {
            Err(PlotterError::PenSlotsExhausted {
                color,
                path_index,
                origin,
                assigned,
            }) => {
                assert_eq!(color, "#ff00ff");
                assert_eq!(path_index, 5);
                assert_eq!(origin, "path#e");
                assert_eq!(assigned.len(), 4);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(pens.assignments().len(), 4);
    }
}
