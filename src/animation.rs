use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A single animation clip baked into a loaded asset. Looping is a property
/// of the clip itself and is never overridden by the lifecycle code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub looping: bool,
}

/// Playback state for one clip bound to a mixer.
#[derive(Debug, Clone)]
struct ClipAction {
    clip: AnimationClip,
    time: f32,
    playing: bool,
}

impl ClipAction {
    fn restart(&mut self) {
        self.time = 0.0;
        self.playing = true;
    }

    fn advance(&mut self, delta: f32) {
        if !self.playing {
            return;
        }
        self.time += delta;
        if self.time < self.clip.duration {
            return;
        }
        if self.clip.looping {
            if self.clip.duration > 0.0 {
                self.time %= self.clip.duration;
            } else {
                self.time = 0.0;
            }
        } else {
            self.time = self.clip.duration;
            self.playing = false;
        }
    }
}

/// Advances every clip of one model by elapsed time each frame.
#[derive(Debug)]
pub struct AnimationMixer {
    actions: RwLock<Vec<ClipAction>>,
}

impl AnimationMixer {
    /// Binds an action for every clip on the asset. Actions start stopped;
    /// the found transition restarts them.
    pub fn new(clips: &[AnimationClip]) -> Self {
        let actions = clips
            .iter()
            .map(|clip| ClipAction {
                clip: clip.clone(),
                time: 0.0,
                playing: false,
            })
            .collect();
        Self {
            actions: RwLock::new(actions),
        }
    }

    /// Resets every action to time zero and plays it. Safe to call on
    /// already-playing actions.
    pub fn restart_all(&self) {
        for action in self.actions.write().iter_mut() {
            action.restart();
        }
    }

    /// Halts all clip playback.
    pub fn stop_all(&self) {
        for action in self.actions.write().iter_mut() {
            action.playing = false;
        }
    }

    /// Per-frame tick.
    pub fn update(&self, delta: f32) {
        for action in self.actions.write().iter_mut() {
            action.advance(delta);
        }
    }

    pub fn playing_count(&self) -> usize {
        self.actions.read().iter().filter(|a| a.playing).count()
    }

    /// Playback position of the named clip, if it is bound.
    pub fn clip_time(&self, name: &str) -> Option<f32> {
        self.actions
            .read()
            .iter()
            .find(|action| action.clip.name == name)
            .map(|action| action.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str, duration: f32, looping: bool) -> AnimationClip {
        AnimationClip {
            name: name.to_string(),
            duration,
            looping,
        }
    }

    #[test]
    fn looping_clip_wraps_around() {
        let mixer = AnimationMixer::new(&[clip("walk", 1.0, true)]);
        mixer.restart_all();
        mixer.update(2.25);
        let time = mixer.clip_time("walk").unwrap();
        assert!((time - 0.25).abs() < 1e-5);
        assert_eq!(mixer.playing_count(), 1);
    }

    #[test]
    fn one_shot_clip_stops_at_end() {
        let mixer = AnimationMixer::new(&[clip("wave", 0.5, false)]);
        mixer.restart_all();
        mixer.update(1.0);
        assert_eq!(mixer.playing_count(), 0);
        assert_eq!(mixer.clip_time("wave"), Some(0.5));
    }

    #[test]
    fn restart_is_idempotent_for_playing_actions() {
        let mixer = AnimationMixer::new(&[clip("walk", 1.0, true), clip("blink", 0.2, true)]);
        mixer.restart_all();
        mixer.update(0.4);
        mixer.restart_all();
        assert_eq!(mixer.playing_count(), 2);
        assert_eq!(mixer.clip_time("walk"), Some(0.0));
    }

    #[test]
    fn stopped_mixer_does_not_advance() {
        let mixer = AnimationMixer::new(&[clip("walk", 1.0, true)]);
        mixer.restart_all();
        mixer.stop_all();
        mixer.update(0.5);
        assert_eq!(mixer.clip_time("walk"), Some(0.0));
    }
}
