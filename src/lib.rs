//! Anchor lifecycle core of the AR storybook, rewritten in Rust.
//!
//! The crate exposes the per-page state machinery that decides when a
//! marker-bound model is shown, animated, and narrated, and keeps the
//! single shared active-model slot consistent as markers come and go in
//! arbitrary order.  Marker tracking, asset decoding, audio playback, and
//! rendering are intentionally kept outside of the crate behind traits so
//! that the code remains testable and easy to embed in any AR host.

pub mod anchor;
pub mod animation;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod interaction;
pub mod manipulate;
pub mod model;
pub mod page;
pub mod registry;
pub mod runtime;
pub mod viewport;

pub use anchor::PageAnchorController;
pub use animation::{AnimationClip, AnimationMixer};
pub use assets::{AssetCache, AssetError, AssetLoader, LoadedAsset};
pub use audio::{AudioChannel, AudioOutput, AudioSink, PlaybackRejected};
pub use camera::{CameraParams, Ray};
pub use interaction::InteractionRouter;
pub use manipulate::ManipulationController;
pub use model::{ModelNode, SceneModel, Transform};
pub use page::{parse_pages, Page, PageId};
pub use registry::{ActiveEntry, ActiveModelRegistry};
pub use runtime::Storybook;
pub use viewport::{StaticViewport, ViewportProvider};
