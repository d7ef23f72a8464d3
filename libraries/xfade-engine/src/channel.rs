//! Playback channels and the host backend trait
//!
//! The engine alternates between two channels. Each channel wraps a
//! host-provided [`PlaybackBackend`] and remembers the clip and volume the
//! engine last assigned to it.

use crate::error::Result;
use crate::types::ClipRef;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use std::time::Duration;

/// Host playback output for one channel
///
/// Implementors wrap whatever actually produces sound (a mixer voice, an
/// engine audio source, a simulated cursor). The engine is the only caller;
/// nothing else should change volume or play state behind its back.
pub trait PlaybackBackend: Send {
    /// Assign a clip to this output
    ///
    /// # Returns
    /// * `Ok(())` - Clip is loaded, ready to play from the start
    /// * `Err(_)` - Clip unknown or could not be loaded
    fn load_clip(&mut self, clip: &ClipRef) -> Result<()>;

    /// Start playback from the current cursor
    fn play(&mut self);

    /// Stop playback
    fn stop(&mut self);

    /// Set output volume (already clamped to >= 0 by the engine)
    fn set_volume(&mut self, volume: f32);

    /// Move the cursor back to the start of the clip
    fn seek_to_start(&mut self);

    /// Current playback position
    fn cursor(&self) -> Duration;

    /// Length of the loaded clip, if any
    fn clip_length(&self) -> Option<Duration>;

    /// Whether the output is currently producing audio
    fn is_playing(&self) -> bool;
}

/// One of the two channel slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    A,
    B,
}

impl ChannelId {
    /// The opposite slot
    pub fn other(self) -> Self {
        match self {
            ChannelId::A => ChannelId::B,
            ChannelId::B => ChannelId::A,
        }
    }

    fn index(self) -> usize {
        match self {
            ChannelId::A => 0,
            ChannelId::B => 1,
        }
    }
}

/// A backend plus the state the engine tracks for it
pub struct PlaybackChannel<B> {
    backend: B,
    clip: Option<ClipRef>,
    volume: f32,
}

impl<B: PlaybackBackend> PlaybackChannel<B> {
    /// Wrap a backend; the channel starts silent
    pub fn new(mut backend: B) -> Self {
        backend.set_volume(0.0);
        Self {
            backend,
            clip: None,
            volume: 0.0,
        }
    }

    /// Load a clip and rewind to the start
    pub(crate) fn load(&mut self, clip: &ClipRef) -> Result<()> {
        self.backend.load_clip(clip)?;
        self.backend.seek_to_start();
        self.clip = Some(clip.clone());
        Ok(())
    }

    pub(crate) fn play(&mut self) {
        self.backend.play();
    }

    /// Stop playback and rewind, so a stopped channel reports the whole clip remaining
    pub(crate) fn stop(&mut self) {
        self.backend.stop();
        self.backend.seek_to_start();
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.backend.set_volume(volume);
    }

    /// Clip currently assigned to this channel
    pub fn clip(&self) -> Option<&ClipRef> {
        self.clip.as_ref()
    }

    /// Last volume the engine set
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn cursor(&self) -> Duration {
        self.backend.cursor()
    }

    pub fn clip_length(&self) -> Option<Duration> {
        self.backend.clip_length()
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_playing()
    }

    /// Time left before the clip ends, if a clip is loaded
    pub fn remaining(&self) -> Option<Duration> {
        if self.clip.is_none() {
            return None;
        }
        self.clip_length()
            .map(|length| length.saturating_sub(self.cursor()))
    }

    /// Read-only access to the wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// The two channels, indexed by [`ChannelId`]
pub struct ChannelPair<B> {
    slots: [PlaybackChannel<B>; 2],
}

impl<B: PlaybackBackend> ChannelPair<B> {
    pub fn new(a: B, b: B) -> Self {
        Self {
            slots: [PlaybackChannel::new(a), PlaybackChannel::new(b)],
        }
    }
}

impl<B> Index<ChannelId> for ChannelPair<B> {
    type Output = PlaybackChannel<B>;

    fn index(&self, id: ChannelId) -> &Self::Output {
        &self.slots[id.index()]
    }
}

impl<B> IndexMut<ChannelId> for ChannelPair<B> {
    fn index_mut(&mut self, id: ChannelId) -> &mut Self::Output {
        &mut self.slots[id.index()]
    }
}
