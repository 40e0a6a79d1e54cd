use std::sync::Arc;

use parking_lot::RwLock;

use crate::animation::AnimationMixer;
use crate::assets::LoadedAsset;
use crate::audio::AudioChannel;

/// Everything the interaction and render paths need about the model that is
/// currently presented.
#[derive(Debug, Clone)]
pub struct ActiveEntry {
    pub model: Arc<LoadedAsset>,
    pub mixer: Arc<AnimationMixer>,
    pub narration: AudioChannel,
    pub interaction_sound: Option<AudioChannel>,
    pub retrigger_on_tap: bool,
}

/// Process-wide single-slot register for the active presentation. Mutated
/// only by page anchor transitions; a page may clear the slot only while it
/// still owns it, so a late lost event for a superseded page cannot evict
/// the newer active model.
#[derive(Debug, Default)]
pub struct ActiveModelRegistry {
    slot: Arc<RwLock<Option<ActiveEntry>>>,
}

impl Clone for ActiveModelRegistry {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl ActiveModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the entry, overwriting whatever was previously active.
    pub fn publish(&self, entry: ActiveEntry) {
        *self.slot.write() = Some(entry);
    }

    /// Clears the slot only if `model` is the one currently stored
    /// (pointer identity). Returns whether the slot was cleared.
    pub fn clear_if_owner(&self, model: &Arc<LoadedAsset>) -> bool {
        let mut guard = self.slot.write();
        match guard.as_ref() {
            Some(entry) if Arc::ptr_eq(&entry.model, model) => {
                *guard = None;
                true
            }
            _ => false,
        }
    }

    /// Snapshot of the entry at this moment; handles inside are shared.
    pub fn current(&self) -> Option<ActiveEntry> {
        self.slot.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}
