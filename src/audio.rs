use std::sync::Arc;

use log::debug;
use thiserror::Error;

/// Raised by a sink when the host refuses to start playback, typically an
/// autoplay policy. Expected and non-fatal.
#[derive(Debug, Clone, Error)]
#[error("playback start rejected by the audio host")]
pub struct PlaybackRejected;

/// Controllable playback primitive supplied by the host platform.
pub trait AudioSink {
    fn play(&self) -> Result<(), PlaybackRejected>;
    fn pause(&self);
    /// Seeks to the given playback position in seconds.
    fn set_position(&self, seconds: f32);
    fn set_loop(&self, looped: bool);
}

/// Factory the host provides to open one sink per audio path.
pub trait AudioOutput {
    fn open(&self, path: &str) -> Arc<dyn AudioSink>;
}

/// One playable audio resource with explicit stop/reset/play semantics.
#[derive(Clone)]
pub struct AudioChannel {
    sink: Arc<dyn AudioSink>,
}

impl AudioChannel {
    pub fn new(sink: Arc<dyn AudioSink>, looped: bool) -> Self {
        sink.set_loop(looped);
        Self { sink }
    }

    /// Rewinds to the start and plays. Autoplay rejection is swallowed.
    pub fn start_from_zero(&self) {
        self.sink.set_position(0.0);
        if self.sink.play().is_err() {
            debug!("audio playback rejected; continuing without sound");
        }
    }

    /// Pauses and resets the playback position to the start.
    pub fn stop(&self) {
        self.sink.pause();
        self.sink.set_position(0.0);
    }
}

impl std::fmt::Debug for AudioChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChannel").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use parking_lot::RwLock;

    /// Records sink calls so lifecycle tests can assert on audio behavior.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub state: RwLock<SinkState>,
        pub reject_play: bool,
    }

    #[derive(Debug, Default, Clone)]
    pub struct SinkState {
        pub playing: bool,
        pub position: f32,
        pub looped: bool,
        pub play_calls: usize,
    }

    impl AudioSink for RecordingSink {
        fn play(&self) -> Result<(), PlaybackRejected> {
            let mut state = self.state.write();
            state.play_calls += 1;
            if self.reject_play {
                return Err(PlaybackRejected);
            }
            state.playing = true;
            Ok(())
        }

        fn pause(&self) {
            self.state.write().playing = false;
        }

        fn set_position(&self, seconds: f32) {
            self.state.write().position = seconds;
        }

        fn set_loop(&self, looped: bool) {
            self.state.write().looped = looped;
        }
    }

    /// Opens a fresh recording sink per path and remembers each one.
    #[derive(Default)]
    pub struct RecordingOutput {
        pub opened: RwLock<Vec<(String, Arc<RecordingSink>)>>,
    }

    impl RecordingOutput {
        pub fn sink_for(&self, path: &str) -> Option<Arc<RecordingSink>> {
            self.opened
                .read()
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, sink)| Arc::clone(sink))
        }
    }

    impl AudioOutput for RecordingOutput {
        fn open(&self, path: &str) -> Arc<dyn AudioSink> {
            let sink = Arc::new(RecordingSink::default());
            self.opened
                .write()
                .push((path.to_string(), Arc::clone(&sink)));
            sink
        }
    }
}
