//! Wall position to cable-length deltas.

use wallkit_core::{CableDelta, CableState, WallPoint};

/// Tracks the robot position through one conversion and turns each target
/// point into the change of both cable lengths.
#[derive(Debug, Clone)]
pub struct KinematicsMapper {
    span: f64,
    position: WallPoint,
    state: CableState,
}

impl KinematicsMapper {
    /// Start at the center of the working square, where the robot is parked.
    pub fn new(span: f64) -> Self {
        Self::starting_at(span, lyon::geom::point(span / 2.0, span / 2.0))
    }

    pub fn starting_at(span: f64, position: WallPoint) -> Self {
        Self {
            span,
            position,
            state: CableState::at(position, span),
        }
    }

    /// Move to `target`, returning the exact cable change.
    pub fn step_to(&mut self, target: WallPoint) -> CableDelta {
        let next = CableState::at(target, self.span);
        let delta = self.state.delta_to(&next);
        self.state = next;
        self.position = target;
        delta
    }

    pub fn position(&self) -> WallPoint {
        self.position
    }

    pub fn state(&self) -> CableState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::geom::point;

    #[test]
    fn test_starts_at_wall_center() {
        let mapper = KinematicsMapper::new(1860.0);
        assert_eq!(mapper.position(), point(930.0, 930.0));
        let state = mapper.state();
        assert!((state.left - state.right).abs() < 1e-12);
        assert!((state.left - 930.0 * 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_move_right_shortens_right_cable() {
        let mut mapper = KinematicsMapper::new(1000.0);
        let delta = mapper.step_to(point(600.0, 500.0));
        assert!(delta.left > 0.0);
        assert!(delta.right < 0.0);
        assert!(delta.x() > 0.0 && delta.y() > 0.0);
        assert_eq!(mapper.position(), point(600.0, 500.0));
    }

    #[test]
    fn test_steps_reconstruct_state_difference() {
        let mut mapper = KinematicsMapper::new(1860.0);
        let start = mapper.state();
        let targets = [point(100.0, 200.0), point(1500.0, 30.0), point(900.0, 1800.0)];
        let total: CableDelta = targets.iter().map(|&t| mapper.step_to(t)).sum();
        let end = mapper.state();
        assert!((total.left - (end.left - start.left)).abs() < 1e-9);
        assert!((total.right - (end.right - start.right)).abs() < 1e-9);
    }

    #[test]
    fn test_staying_put_is_zero_delta() {
        let mut mapper = KinematicsMapper::new(1860.0);
        let here = mapper.position();
        assert_eq!(mapper.step_to(here), CableDelta::default());
    }
}
