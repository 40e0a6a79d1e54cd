use std::sync::Arc;

use glam::Vec2;
use parking_lot::RwLock;

use crate::model::SceneModel;

/// Radians of rotation per pixel of drag.
const ROTATE_SENSITIVITY: f32 = 0.01;
/// Zoom factor change per pixel of pinch distance.
const ZOOM_SENSITIVITY: f32 = 0.005;
const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 2.0;

#[derive(Debug, Default)]
struct GestureState {
    drag_from: Option<Vec2>,
    pinch_distance: Option<f32>,
    zoom: f32,
}

/// Translates drag and pinch gestures into rotation and zoom on one bound
/// model. Mouse drags map onto the single-touch path.
pub struct ManipulationController {
    model: Arc<SceneModel>,
    state: RwLock<GestureState>,
}

impl ManipulationController {
    pub fn new(model: Arc<SceneModel>) -> Self {
        Self {
            model,
            state: RwLock::new(GestureState {
                zoom: 1.0,
                ..GestureState::default()
            }),
        }
    }

    /// Start of a mouse drag or single-touch drag.
    pub fn pointer_pressed(&self, position: Vec2) {
        let mut state = self.state.write();
        state.drag_from = Some(position);
    }

    /// Pointer movement while a drag is in progress.
    pub fn pointer_moved(&self, position: Vec2) {
        let mut state = self.state.write();
        let Some(previous) = state.drag_from else {
            return;
        };
        let delta = position - previous;
        state.drag_from = Some(position);
        drop(state);
        self.model
            .rotate_by(delta.x * ROTATE_SENSITIVITY, delta.y * ROTATE_SENSITIVITY);
    }

    /// Two-finger positions changed. Starting a pinch cancels any drag;
    /// later moves zoom relative to the previous distance.
    pub fn pinch_moved(&self, first: Vec2, second: Vec2) {
        let distance = first.distance(second);
        let mut state = self.state.write();
        state.drag_from = None;
        let Some(previous) = state.pinch_distance else {
            state.pinch_distance = Some(distance);
            return;
        };
        let delta = (distance - previous) * ZOOM_SENSITIVITY;
        state.zoom = (state.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        state.pinch_distance = Some(distance);
        let zoom = state.zoom;
        drop(state);
        self.model.set_zoom(zoom);
    }

    /// Pointer or touch released: cancels the drag and resets the pinch
    /// baseline so the next pinch starts fresh instead of jumping.
    pub fn gesture_ended(&self) {
        let mut state = self.state.write();
        state.drag_from = None;
        state.pinch_distance = None;
    }

    pub fn zoom(&self) -> f32 {
        self.state.read().zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn model() -> Arc<SceneModel> {
        Arc::new(SceneModel::new(vec![], Vec3::ZERO, Vec3::splat(0.4)))
    }

    #[test]
    fn drag_rotates_yaw_and_pitch() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pointer_pressed(Vec2::new(100.0, 100.0));
        controller.pointer_moved(Vec2::new(150.0, 80.0));

        let transform = model.transform();
        assert!((transform.rotation.y - 0.5).abs() < 1e-5);
        assert!((transform.rotation.x + 0.2).abs() < 1e-5);
    }

    #[test]
    fn move_without_press_does_nothing() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pointer_moved(Vec2::new(150.0, 80.0));
        assert_eq!(model.transform().rotation, Vec3::ZERO);
    }

    #[test]
    fn pinch_zooms_relative_to_previous_distance() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0));

        assert!((controller.zoom() - 1.5).abs() < 1e-5);
        assert_eq!(model.transform().scale, Vec3::splat(0.4 * 1.5));
    }

    #[test]
    fn zoom_is_clamped() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(2000.0, 0.0));
        assert_eq!(controller.zoom(), MAX_ZOOM);

        controller.gesture_ended();
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(2000.0, 0.0));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        assert_eq!(controller.zoom(), MIN_ZOOM);
    }

    #[test]
    fn gesture_end_resets_pinch_baseline() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(120.0, 0.0));
        let zoom_before = controller.zoom();
        controller.gesture_ended();

        // First move after the gap only re-establishes the baseline, so the
        // scale must not jump from the stale distance.
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0));
        assert_eq!(controller.zoom(), zoom_before);
    }

    #[test]
    fn pinch_cancels_an_active_drag() {
        let model = model();
        let controller = ManipulationController::new(Arc::clone(&model));
        controller.pointer_pressed(Vec2::new(100.0, 100.0));
        controller.pinch_moved(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        controller.pointer_moved(Vec2::new(150.0, 80.0));
        assert_eq!(model.transform().rotation, Vec3::ZERO);
    }
}
