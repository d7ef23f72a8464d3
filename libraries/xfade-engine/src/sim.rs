//! In-memory playback backend driven by a shared clock
//!
//! Used by tests and the simulator host. Nothing is decoded; a channel's
//! cursor is simply the clock time elapsed since it started playing.

use crate::channel::PlaybackBackend;
use crate::error::{CrossfadeError, Result};
use crate::types::ClipRef;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monotonic clock shared by every simulated channel
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    nanos: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, delta: Duration) {
        let delta = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }

    /// Current clock time
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Simulated playback output
///
/// Knows a library of clip lengths. Playback stops by itself once the cursor
/// reaches the end of the loaded clip.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    clock: SimClock,
    library: HashMap<ClipRef, Duration>,
    loaded: Option<(ClipRef, Duration)>,
    volume: f32,
    /// Cursor at the last play/stop/seek
    anchor_cursor: Duration,
    /// Clock time at the last play/seek while playing
    playing_since: Option<Duration>,
}

impl SimulatedBackend {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            library: HashMap::new(),
            loaded: None,
            volume: 0.0,
            anchor_cursor: Duration::ZERO,
            playing_since: None,
        }
    }

    /// Register a clip the backend can load
    pub fn with_clip(mut self, id: impl Into<ClipRef>, length: Duration) -> Self {
        self.library.insert(id.into(), length);
        self
    }

    /// Register several clips at once
    pub fn with_library<I, C>(mut self, clips: I) -> Self
    where
        I: IntoIterator<Item = (C, Duration)>,
        C: Into<ClipRef>,
    {
        self.library
            .extend(clips.into_iter().map(|(id, length)| (id.into(), length)));
        self
    }

    /// Last volume set by the engine
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Clip currently loaded
    pub fn loaded_clip(&self) -> Option<&ClipRef> {
        self.loaded.as_ref().map(|(clip, _)| clip)
    }

    fn length(&self) -> Duration {
        self.loaded
            .as_ref()
            .map(|(_, length)| *length)
            .unwrap_or(Duration::ZERO)
    }
}

impl PlaybackBackend for SimulatedBackend {
    fn load_clip(&mut self, clip: &ClipRef) -> Result<()> {
        let length = self
            .library
            .get(clip)
            .copied()
            .ok_or_else(|| CrossfadeError::UnknownClip(clip.to_string()))?;

        self.loaded = Some((clip.clone(), length));
        self.anchor_cursor = Duration::ZERO;
        self.playing_since = None;
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.anchor_cursor = self.cursor();
        self.playing_since = Some(self.clock.now());
    }

    fn stop(&mut self) {
        self.anchor_cursor = self.cursor();
        self.playing_since = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn seek_to_start(&mut self) {
        self.anchor_cursor = Duration::ZERO;
        if self.playing_since.is_some() {
            self.playing_since = Some(self.clock.now());
        }
    }

    fn cursor(&self) -> Duration {
        let played = self
            .playing_since
            .map(|since| self.clock.now().saturating_sub(since))
            .unwrap_or(Duration::ZERO);
        (self.anchor_cursor + played).min(self.length())
    }

    fn clip_length(&self) -> Option<Duration> {
        self.loaded.as_ref().map(|(_, length)| *length)
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && self.cursor() < self.length()
    }
}
