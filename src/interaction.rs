use std::sync::Arc;

use glam::Vec2;
use parking_lot::RwLock;

use crate::audio::AudioChannel;
use crate::camera::{CameraParams, Ray};
use crate::registry::ActiveModelRegistry;
use crate::viewport::ViewportProvider;

/// Translates pointer taps into hit tests against the active model and
/// triggers its interaction sound (and, per page policy, an animation
/// restart).
pub struct InteractionRouter {
    registry: ActiveModelRegistry,
    viewport: Arc<dyn ViewportProvider>,
    // Last interaction sound started; only one plays at a time globally.
    playing_sound: RwLock<Option<AudioChannel>>,
}

impl InteractionRouter {
    pub fn new(registry: ActiveModelRegistry, viewport: Arc<dyn ViewportProvider>) -> Self {
        Self {
            registry,
            viewport,
            playing_sound: RwLock::new(None),
        }
    }

    /// Handles a pointer-down/tap at the given screen position in pixels.
    /// Returns whether the active model was hit.
    pub fn pointer_down(&self, pixel: Vec2, camera: &CameraParams) -> bool {
        let Some(entry) = self.registry.current() else {
            return false;
        };

        let ndc = self.to_ndc(pixel);
        let ray = Ray::from_ndc(ndc, camera);
        if !entry.model.scene.intersects_ray(&ray) {
            return false;
        }

        if let Some(previous) = self.playing_sound.write().take() {
            previous.stop();
        }
        if let Some(sound) = &entry.interaction_sound {
            sound.start_from_zero();
            *self.playing_sound.write() = Some(sound.clone());
        }
        if entry.retrigger_on_tap {
            entry.mixer.restart_all();
        }
        true
    }

    fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        let (width, height) = self.viewport.viewport_size();
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Vec2::new(
            (pixel.x / width) * 2.0 - 1.0,
            -(pixel.y / height) * 2.0 + 1.0,
        )
    }
}
