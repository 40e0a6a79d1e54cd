use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::{LocalBoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use thiserror::Error;

use crate::animation::AnimationClip;
use crate::model::SceneModel;
use crate::page::{Page, PageId};

/// Recoverable per-page load failure. The page stays idle and the load is
/// retried on the next marker detection.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// A decoded model: scene graph plus its animation clip list.
#[derive(Debug)]
pub struct LoadedAsset {
    pub scene: Arc<SceneModel>,
    pub clips: Vec<AnimationClip>,
}

/// Asynchronous fetch-and-decode collaborator supplied by the host.
pub trait AssetLoader {
    fn load(&self, page: &Page) -> LocalBoxFuture<'static, Result<LoadedAsset, AssetError>>;
}

type SharedLoad = Shared<LocalBoxFuture<'static, Result<Arc<LoadedAsset>, AssetError>>>;

enum Slot {
    Ready(Arc<LoadedAsset>),
    Pending { load: SharedLoad, generation: u64 },
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<PageId, Slot>,
    next_generation: u64,
}

/// Memoizes loaded assets by page id. A load in flight is shared by every
/// concurrent resolver, so the loader is called at most once per page per
/// session (failed loads vacate the slot for a retry).
#[derive(Clone)]
pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    state: Arc<Mutex<CacheState>>,
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Resolves the page's asset, starting a load on first use. Never holds
    /// the cache lock across the await.
    pub async fn resolve(&self, page: &Page) -> Result<Arc<LoadedAsset>, AssetError> {
        let (load, generation) = {
            let mut state = self.state.lock();
            match state.slots.get(&page.id) {
                Some(Slot::Ready(asset)) => return Ok(Arc::clone(asset)),
                Some(Slot::Pending { load, generation }) => (load.clone(), *generation),
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    let inner = self.loader.load(page);
                    let load = async move { inner.await.map(Arc::new) }.boxed_local().shared();
                    state.slots.insert(
                        page.id,
                        Slot::Pending {
                            load: load.clone(),
                            generation,
                        },
                    );
                    (load, generation)
                }
            }
        };

        match load.await {
            Ok(asset) => {
                let mut state = self.state.lock();
                if slot_has_generation(state.slots.get(&page.id), generation) {
                    state.slots.insert(page.id, Slot::Ready(Arc::clone(&asset)));
                }
                Ok(asset)
            }
            Err(err) => {
                let mut state = self.state.lock();
                if slot_has_generation(state.slots.get(&page.id), generation) {
                    state.slots.remove(&page.id);
                }
                Err(err)
            }
        }
    }

    /// The cached asset, if its load has completed.
    pub fn loaded(&self, id: PageId) -> Option<Arc<LoadedAsset>> {
        match self.state.lock().slots.get(&id) {
            Some(Slot::Ready(asset)) => Some(Arc::clone(asset)),
            _ => None,
        }
    }
}

fn slot_has_generation(slot: Option<&Slot>, generation: u64) -> bool {
    matches!(slot, Some(Slot::Pending { generation: stored, .. }) if *stored == generation)
}
