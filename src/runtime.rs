use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use log::debug;

use crate::anchor::PageAnchorController;
use crate::assets::{AssetCache, AssetLoader};
use crate::audio::AudioOutput;
use crate::camera::CameraParams;
use crate::interaction::InteractionRouter;
use crate::manipulate::ManipulationController;
use crate::page::{Page, PageId};
use crate::registry::ActiveModelRegistry;
use crate::viewport::ViewportProvider;

/// Wires one anchor controller per configured page and exposes the event
/// entry points the host's marker tracker, pointer source, and render loop
/// call into.
pub struct Storybook {
    pages: HashMap<PageId, Arc<PageAnchorController>>,
    registry: ActiveModelRegistry,
    router: InteractionRouter,
}

impl Storybook {
    pub fn new(
        pages: Vec<Page>,
        loader: Arc<dyn AssetLoader>,
        audio: &dyn AudioOutput,
        viewport: Arc<dyn ViewportProvider>,
    ) -> Self {
        let registry = ActiveModelRegistry::new();
        let cache = AssetCache::new(loader);
        let controllers = pages
            .into_iter()
            .map(|page| {
                let id = page.id;
                let controller =
                    PageAnchorController::new(page, cache.clone(), registry.clone(), audio);
                (id, Arc::new(controller))
            })
            .collect();
        let router = InteractionRouter::new(registry.clone(), viewport);
        Self {
            pages: controllers,
            registry,
            router,
        }
    }

    /// Marker tracker reported the page's marker entering the view.
    pub async fn marker_found(&self, id: PageId) {
        match self.pages.get(&id) {
            Some(controller) => controller.marker_found().await,
            None => debug!("found event for unknown {id}; ignoring"),
        }
    }

    /// Marker tracker reported the page's marker leaving the view.
    pub fn marker_lost(&self, id: PageId) {
        match self.pages.get(&id) {
            Some(controller) => controller.marker_lost(),
            None => debug!("lost event for unknown {id}; ignoring"),
        }
    }

    /// Pointer tap in screen pixels. Returns whether the active model was
    /// hit.
    pub fn pointer_down(&self, pixel: Vec2, camera: &CameraParams) -> bool {
        self.router.pointer_down(pixel, camera)
    }

    /// Per-frame tick: advances the active presentation's mixer. Drawing
    /// stays with the host renderer.
    pub fn tick(&self, delta: f32) {
        if let Some(entry) = self.registry.current() {
            entry.mixer.update(delta);
        }
    }

    /// Binds a gesture controller to the page's currently attached model.
    /// None until the page is active.
    pub fn manipulator_for(&self, id: PageId) -> Option<ManipulationController> {
        let controller = self.pages.get(&id)?;
        let asset = controller.active_asset()?;
        Some(ManipulationController::new(Arc::clone(&asset.scene)))
    }

    pub fn registry(&self) -> &ActiveModelRegistry {
        &self.registry
    }

    pub fn controller(&self, id: PageId) -> Option<&Arc<PageAnchorController>> {
        self.pages.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationClip;
    use crate::assets::test_support::CountingLoader;
    use crate::audio::test_support::RecordingOutput;
    use crate::viewport::StaticViewport;
    use glam::Vec3;
    use pollster::block_on;

    fn page(id: u32) -> Page {
        Page {
            id: PageId(id),
            model_path: format!("assets/models/pg{id}.glb"),
            scale: Vec3::splat(0.5),
            position: Vec3::ZERO,
            narration_path: format!("assets/audio/pg{id}.mp3"),
            interaction_sound_path: (id == 2).then(|| "assets/audio/sfx/thunder.mp3".to_string()),
            retrigger_on_tap: false,
        }
    }

    fn book(audio: &RecordingOutput) -> Storybook {
        let loader = Arc::new(CountingLoader {
            clips: vec![AnimationClip {
                name: "main".to_string(),
                duration: 1.0,
                looping: true,
            }],
            ..CountingLoader::default()
        });
        Storybook::new(
            vec![page(0), page(1), page(2)],
            loader,
            audio,
            Arc::new(StaticViewport::new(800, 600)),
        )
    }

    #[test]
    fn two_page_scenario_follows_the_ownership_rules() {
        let audio = RecordingOutput::default();
        let book = book(&audio);

        block_on(book.marker_found(PageId(0)));
        let first = book.registry().current().unwrap();
        assert!(audio.sink_for("assets/audio/pg0.mp3").unwrap().state.read().playing);

        block_on(book.marker_found(PageId(1)));
        let second = book.registry().current().unwrap();
        assert!(!Arc::ptr_eq(&first.model, &second.model));
        assert!(!audio.sink_for("assets/audio/pg0.mp3").unwrap().state.read().playing);
        assert!(audio.sink_for("assets/audio/pg1.mp3").unwrap().state.read().playing);

        book.marker_lost(PageId(0));
        let still = book.registry().current().unwrap();
        assert!(Arc::ptr_eq(&still.model, &second.model));

        book.marker_lost(PageId(1));
        assert!(book.registry().is_empty());
        assert!(!audio.sink_for("assets/audio/pg1.mp3").unwrap().state.read().playing);
    }

    #[test]
    fn tap_scenario_plays_interaction_sound_once_from_zero() {
        let audio = RecordingOutput::default();
        let book = book(&audio);
        block_on(book.marker_found(PageId(2)));

        let camera = CameraParams::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 800.0 / 600.0);
        assert!(book.pointer_down(Vec2::new(400.0, 300.0), &camera));
        let sfx = audio.sink_for("assets/audio/sfx/thunder.mp3").unwrap();
        assert_eq!(sfx.state.read().play_calls, 1);
        assert!(sfx.state.read().playing);

        // Second tap before the sound finishes restarts it from zero.
        sfx.state.write().position = 0.9;
        assert!(book.pointer_down(Vec2::new(400.0, 300.0), &camera));
        assert_eq!(sfx.state.read().play_calls, 2);
        assert_eq!(sfx.state.read().position, 0.0);
    }

    #[test]
    fn tick_only_advances_the_active_mixer() {
        let audio = RecordingOutput::default();
        let book = book(&audio);
        book.tick(0.5);
        assert!(book.registry().is_empty());

        block_on(book.marker_found(PageId(0)));
        book.tick(0.25);
        let entry = book.registry().current().unwrap();
        assert_eq!(entry.mixer.clip_time("main"), Some(0.25));
    }

    #[test]
    fn manipulator_binds_to_the_attached_model() {
        let audio = RecordingOutput::default();
        let book = book(&audio);
        assert!(book.manipulator_for(PageId(0)).is_none());

        block_on(book.marker_found(PageId(0)));
        let manipulator = book.manipulator_for(PageId(0)).unwrap();
        manipulator.pointer_pressed(Vec2::new(0.0, 0.0));
        manipulator.pointer_moved(Vec2::new(10.0, 0.0));

        let entry = book.registry().current().unwrap();
        assert!((entry.model.scene.transform().rotation.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn unknown_page_events_are_ignored() {
        let audio = RecordingOutput::default();
        let book = book(&audio);
        block_on(book.marker_found(PageId(42)));
        book.marker_lost(PageId(42));
        assert!(book.registry().is_empty());
    }
}
