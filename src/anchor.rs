use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::animation::AnimationMixer;
use crate::assets::{AssetCache, LoadedAsset};
use crate::audio::{AudioChannel, AudioOutput};
use crate::page::Page;
use crate::registry::{ActiveEntry, ActiveModelRegistry};

/// What an anchor holds while its marker is detected.
#[derive(Debug)]
struct Attached {
    asset: Arc<LoadedAsset>,
    mixer: Arc<AnimationMixer>,
}

/// Owns the show/hide and audio/animation lifecycle for exactly one marker
/// id. Oscillates between idle (marker not detected) and active for the
/// whole session; the attached slot encodes the state.
pub struct PageAnchorController {
    page: Page,
    cache: AssetCache,
    registry: ActiveModelRegistry,
    narration: AudioChannel,
    interaction_sound: Option<AudioChannel>,
    attached: RwLock<Option<Attached>>,
}

impl PageAnchorController {
    /// Audio channels open eagerly at setup; the model itself loads lazily
    /// on first detection.
    pub fn new(
        page: Page,
        cache: AssetCache,
        registry: ActiveModelRegistry,
        audio: &dyn AudioOutput,
    ) -> Self {
        let narration = AudioChannel::new(audio.open(&page.narration_path), true);
        let interaction_sound = page
            .interaction_sound_path
            .as_deref()
            .map(|path| AudioChannel::new(audio.open(path), false));
        Self {
            page,
            cache,
            registry,
            narration,
            interaction_sound,
            attached: RwLock::new(None),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn is_active(&self) -> bool {
        self.attached.read().is_some()
    }

    /// The asset currently attached to this anchor, while active.
    pub fn active_asset(&self) -> Option<Arc<LoadedAsset>> {
        self.attached.read().as_ref().map(|a| Arc::clone(&a.asset))
    }

    /// Marker entered the camera's view. Idempotent while already active.
    pub async fn marker_found(&self) {
        let asset = match self.cache.resolve(&self.page).await {
            Ok(asset) => asset,
            Err(err) => {
                warn!("{} left idle: {err}", self.page.id);
                return;
            }
        };

        // Only one narration plays at a time, even when the previous page
        // never reported lost.
        if let Some(current) = self.registry.current() {
            if !Arc::ptr_eq(&current.model, &asset) {
                current.narration.stop();
            }
        }

        asset.scene.set_visible(true);

        let mixer = {
            let mut attached = self.attached.write();
            let mixer = match attached.as_ref() {
                Some(existing) => Arc::clone(&existing.mixer),
                None => Arc::new(AnimationMixer::new(&asset.clips)),
            };
            *attached = Some(Attached {
                asset: Arc::clone(&asset),
                mixer: Arc::clone(&mixer),
            });
            mixer
        };
        mixer.restart_all();

        self.narration.start_from_zero();

        self.registry.publish(ActiveEntry {
            model: asset,
            mixer,
            narration: self.narration.clone(),
            interaction_sound: self.interaction_sound.clone(),
            retrigger_on_tap: self.page.retrigger_on_tap,
        });
    }

    /// Marker left the camera's view. No-op while idle, which also covers a
    /// lost event racing ahead of the first load.
    pub fn marker_lost(&self) {
        let Some(attached) = self.attached.write().take() else {
            debug!("{} lost while idle; ignoring", self.page.id);
            return;
        };

        attached.asset.scene.set_visible(false);
        attached.mixer.stop_all();

        // A page's own narration always stops on its own lost, regardless
        // of who owns the registry.
        self.narration.stop();

        self.registry.clear_if_owner(&attached.asset);

        if let Some(sound) = &self.interaction_sound {
            sound.stop();
        }
    }
}
