//! Crossfade engine - core orchestration
//!
//! Owns the two playback channels, the transition state and the volume
//! envelopes. The host calls [`CrossfadeEngine::tick`] once per frame with the
//! frame's elapsed time; every command and every volume change happens
//! synchronously inside the engine's `&mut self` methods.

use crate::{
    channel::{ChannelId, ChannelPair, PlaybackBackend, PlaybackChannel},
    command::{CommandOutcome, EngineCommand, EngineHandle},
    error::{CrossfadeError, Result},
    events::EngineEvent,
    fade::{FadeMode, FadeState},
    types::{clamp_volume, ClipRef, EngineConfig, EngineSettings},
};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Events buffered for the host before new ones are dropped
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Dual-channel crossfade engine
///
/// Alternates between channel A and channel B: the active channel plays the
/// current clip at target volume, the idle one is silent until the next
/// transition loads a clip into it.
pub struct CrossfadeEngine<B> {
    channels: ChannelPair<B>,
    clips: Vec<ClipRef>,
    settings: EngineSettings,

    /// Index of the clip that is current in `clips`
    current_index: usize,

    /// Channel holding the current clip outside of a crossfade
    active: ChannelId,

    fade: FadeState,

    /// Latest command received while a transition was in flight
    pending: Option<EngineCommand>,

    command_tx: Sender<EngineCommand>,
    command_rx: Receiver<EngineCommand>,
    event_tx: Sender<EngineEvent>,
    event_rx: Receiver<EngineEvent>,
}

impl<B: PlaybackBackend> CrossfadeEngine<B> {
    /// Create an engine over the host's playback backends
    ///
    /// The first two backends become channels A and B. With a non-empty clip
    /// sequence the first clip starts on channel A with a fade-in.
    ///
    /// # Errors
    /// `CrossfadeError::NotEnoughChannels` if fewer than two backends are given.
    pub fn new(config: EngineConfig, backends: Vec<B>) -> Result<Self> {
        let found = backends.len();
        if found > 2 {
            debug!("Using the first two of {} playback channels", found);
        }

        let mut backends = backends.into_iter();
        let (Some(a), Some(b)) = (backends.next(), backends.next()) else {
            error!("Crossfade requires two playback channels, found {}", found);
            return Err(CrossfadeError::NotEnoughChannels { found });
        };

        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = bounded(EVENT_QUEUE_CAPACITY);

        let mut engine = Self {
            channels: ChannelPair::new(a, b),
            clips: config.clips,
            settings: config.settings.sanitized(),
            current_index: 0,
            active: ChannelId::A,
            fade: FadeState::default(),
            pending: None,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        };

        engine.start_first_clip();
        Ok(engine)
    }

    fn start_first_clip(&mut self) {
        let Some(first) = self.clips.first().cloned() else {
            warn!("No clips configured, starting silent");
            return;
        };

        let channel = &mut self.channels[ChannelId::A];
        if let Err(e) = channel.load(&first) {
            warn!("Failed to load first clip {}: {}", first, e);
            return;
        }
        channel.play();

        self.fade = FadeState::fade_in(ChannelId::A, channel.volume());
        info!("Fading in {} on channel {:?}", first, ChannelId::A);
        self.emit(EngineEvent::FadeStarted {
            mode: FadeMode::FadeIn,
            from: None,
            to: Some(ChannelId::A),
            clip_index: 0,
            duration_ms: self.settings.fade_duration_ms,
        });
    }

    /// Advance the engine by one frame
    ///
    /// Applies queued handle commands, then progresses the transition in
    /// flight, or, when idle, watches the active clip for its end.
    pub fn tick(&mut self, delta: Duration) {
        self.drain_commands();

        if self.fade.is_active() {
            self.fade.advance(delta);
            self.recalculate_volumes();

            if self.fade.is_complete(self.settings.fade_duration()) {
                self.finish_fade();

                if let Some(command) = self.pending.take() {
                    debug!("Running deferred command {:?}", command);
                    self.apply(command);
                }
            }
        } else {
            if self.settings.auto_crossfade_near_end {
                self.restart_if_near_end();
            }
            self.recalculate_volumes();
        }
    }

    /// Crossfade to the next clip, or fade out after the last one
    pub fn advance_to_next(&mut self) -> CommandOutcome {
        self.apply(EngineCommand::AdvanceToNext)
    }

    /// Crossfade to the clip at `index`
    ///
    /// An index outside the sequence fades the current clip out instead.
    pub fn advance_to(&mut self, index: usize) -> CommandOutcome {
        self.apply(EngineCommand::AdvanceTo(index))
    }

    /// Fade the active channel out to silence
    pub fn fade_out_current(&mut self) -> CommandOutcome {
        self.apply(EngineCommand::FadeOutCurrent)
    }

    /// Change the steady-state volume and apply it to the current frame
    ///
    /// Negative and NaN volumes are clamped to 0.
    pub fn set_target_volume(&mut self, volume: f32) -> CommandOutcome {
        self.apply(EngineCommand::SetTargetVolume(volume))
    }

    /// Change the transition duration
    ///
    /// Also moves the auto-crossfade trigger point, which uses the fade
    /// duration as its lookahead. A transition in flight is rescaled.
    pub fn set_fade_duration_ms(&mut self, duration_ms: u32) {
        self.settings.fade_duration_ms = duration_ms;
    }

    /// Apply a command as if it had arrived through a handle
    pub fn apply(&mut self, command: EngineCommand) -> CommandOutcome {
        match command {
            EngineCommand::SetTargetVolume(volume) => {
                self.update_target_volume(volume);
                CommandOutcome::Applied
            }
            _ if self.fade.is_active() => self.defer(command),
            EngineCommand::AdvanceToNext => {
                self.cross_fade_to_index(self.current_index.saturating_add(1))
            }
            EngineCommand::AdvanceTo(index) => self.cross_fade_to_index(index),
            EngineCommand::FadeOutCurrent => self.begin_fade_out(),
        }
    }

    /// Handle for sending commands and receiving events from other threads
    pub fn handle(&self) -> EngineHandle {
        EngineHandle::new(self.command_tx.clone(), self.event_rx.clone())
    }

    /// Drain every event currently queued
    ///
    /// Competes with every [`EngineHandle`] for the same events.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }

    pub fn fade_mode(&self) -> FadeMode {
        self.fade.mode()
    }

    pub fn fade_state(&self) -> &FadeState {
        &self.fade
    }

    /// Channel holding the current clip outside of a crossfade
    pub fn active_channel(&self) -> ChannelId {
        self.active
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn channel(&self, id: ChannelId) -> &PlaybackChannel<B> {
        &self.channels[id]
    }

    pub fn clips(&self) -> &[ClipRef] {
        &self.clips
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn target_volume(&self) -> f32 {
        self.settings.target_volume
    }

    /// Command waiting for the current transition to finish
    pub fn pending_command(&self) -> Option<EngineCommand> {
        self.pending
    }

    fn drain_commands(&mut self) {
        let commands: Vec<EngineCommand> = self.command_rx.try_iter().collect();
        for command in commands {
            trace!("Applying queued command {:?}", command);
            self.apply(command);
        }
    }

    fn defer(&mut self, command: EngineCommand) -> CommandOutcome {
        if let Some(replaced) = self.pending.replace(command) {
            debug!("Deferred command {:?} replaced by {:?}", replaced, command);
        }
        self.emit(EngineEvent::CommandDeferred { command });
        CommandOutcome::Deferred
    }

    fn update_target_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        if volume != self.settings.target_volume {
            self.settings.target_volume = volume;
            self.emit(EngineEvent::TargetVolumeChanged { volume });
        }
        self.recalculate_volumes();
    }

    fn cross_fade_to_index(&mut self, index: usize) -> CommandOutcome {
        match self.clips.get(index).cloned() {
            Some(clip) => self.begin_cross_fade(clip, Some(index)),
            None => {
                debug!(
                    "Clip index {} outside sequence of {}, fading out",
                    index,
                    self.clips.len()
                );
                self.begin_fade_out()
            }
        }
    }

    /// Start `clip` on the idle channel and crossfade into it
    ///
    /// `index` is `None` for a same-clip restart, which keeps the current index.
    fn begin_cross_fade(&mut self, clip: ClipRef, index: Option<usize>) -> CommandOutcome {
        let from = self.active;
        let to = from.other();

        let incoming = &mut self.channels[to];
        incoming.stop();
        if let Err(e) = incoming.load(&clip) {
            warn!("Failed to load {} on channel {:?}: {}", clip, to, e);
            return CommandOutcome::Rejected;
        }
        incoming.set_volume(0.0);
        incoming.play();

        self.fade = FadeState::cross_fade(
            from,
            self.channels[from].volume(),
            to,
            self.channels[to].volume(),
        );

        match index {
            Some(index) => {
                self.current_index = index;
                info!("Crossfading {:?} -> {:?} into clip {} ({})", from, to, index, clip);
                self.emit(EngineEvent::ClipChanged { index, clip });
            }
            None => {
                info!("Restarting {} on channel {:?} before it ends", clip, to);
                self.emit(EngineEvent::LoopRestarted { clip });
            }
        }

        self.emit(EngineEvent::FadeStarted {
            mode: FadeMode::CrossFade,
            from: Some(from),
            to: Some(to),
            clip_index: self.current_index,
            duration_ms: self.settings.fade_duration_ms,
        });
        CommandOutcome::Started(FadeMode::CrossFade)
    }

    fn begin_fade_out(&mut self) -> CommandOutcome {
        let from = self.active;
        self.fade = FadeState::fade_out(from, self.channels[from].volume());

        info!("Fading out channel {:?}", from);
        self.emit(EngineEvent::FadeStarted {
            mode: FadeMode::FadeOut,
            from: Some(from),
            to: None,
            clip_index: self.current_index,
            duration_ms: self.settings.fade_duration_ms,
        });
        CommandOutcome::Started(FadeMode::FadeOut)
    }

    /// Loop the active clip once it is within one fade of its end
    ///
    /// A clip that ran out on its own reports nothing remaining and loops. A
    /// faded-out channel was rewound by `stop`, so it only loops if the whole
    /// clip is shorter than a fade.
    fn restart_if_near_end(&mut self) {
        let channel = &self.channels[self.active];
        let (Some(clip), Some(remaining)) = (channel.clip().cloned(), channel.remaining()) else {
            return;
        };

        if remaining <= self.settings.fade_duration() {
            trace!("{:?} left on {}, starting loop crossfade", remaining, clip);
            self.begin_cross_fade(clip, None);
        }
    }

    /// Finalize the transition in flight and return to idle
    fn finish_fade(&mut self) {
        self.recalculate_volumes();

        let mode = self.fade.mode();
        let target = self.settings.target_volume;

        match mode {
            FadeMode::FadeIn => match self.fade.fade_in_channel() {
                Some(incoming) => self.channels[incoming].set_volume(target),
                None => debug!("Fade-in finished without a channel"),
            },
            FadeMode::CrossFade => {
                match self.fade.fade_out_channel() {
                    Some(outgoing) => self.silence(outgoing),
                    None => debug!("Crossfade finished without an outgoing channel"),
                }
                match self.fade.fade_in_channel() {
                    Some(incoming) => self.channels[incoming].set_volume(target),
                    None => debug!("Crossfade finished without an incoming channel"),
                }
                self.active = self.active.other();
            }
            FadeMode::FadeOut => match self.fade.fade_out_channel() {
                Some(outgoing) => self.silence(outgoing),
                None => debug!("Fade-out finished without a channel"),
            },
            FadeMode::None => {}
        }

        self.fade.clear();
        self.recalculate_volumes();

        info!("{:?} complete, active channel {:?}", mode, self.active);
        self.emit(EngineEvent::FadeCompleted {
            mode,
            active: self.active,
        });
    }

    fn silence(&mut self, id: ChannelId) {
        let channel = &mut self.channels[id];
        channel.stop();
        channel.set_volume(0.0);
    }

    /// Write this frame's volumes to both channels
    fn recalculate_volumes(&mut self) {
        let target = self.settings.target_volume;

        if self.fade.is_active() {
            let t = self.fade.progress(self.settings.fade_duration());
            let curve = self.settings.curve;

            if let Some(outgoing) = self.fade.fade_out_channel() {
                let volume = self.fade.out_volume(curve, t);
                self.channels[outgoing].set_volume(volume);
            }
            if let Some(incoming) = self.fade.fade_in_channel() {
                let volume = self.fade.in_volume(curve, t, target);
                self.channels[incoming].set_volume(volume);
            }
        } else {
            let main = &mut self.channels[self.active];
            let volume = if main.is_playing() { target } else { 0.0 };
            main.set_volume(volume);
            self.channels[self.active.other()].set_volume(0.0);
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Err(TrySendError::Full(event)) = self.event_tx.try_send(event) {
            trace!("Event queue full, dropping {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimulatedBackend};

    fn engine_with(clips: &[&str], settings: EngineSettings) -> CrossfadeEngine<SimulatedBackend> {
        let clock = SimClock::new();
        let backend = SimulatedBackend::new(clock)
            .with_library(clips.iter().map(|id| (*id, Duration::from_secs(600))));
        let config = EngineConfig::new(clips.iter().map(|id| ClipRef::new(*id)).collect(), settings);
        CrossfadeEngine::new(config, vec![backend.clone(), backend]).unwrap()
    }

    fn settings(fade_duration_ms: u32) -> EngineSettings {
        EngineSettings {
            fade_duration_ms,
            auto_crossfade_near_end: false,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_a_single_channel() {
        let backend = SimulatedBackend::new(SimClock::new());
        let result = CrossfadeEngine::new(EngineConfig::default(), vec![backend]);
        assert!(matches!(
            result,
            Err(CrossfadeError::NotEnoughChannels { found: 1 })
        ));
    }

    #[test]
    fn extra_channels_are_ignored() {
        let backend = SimulatedBackend::new(SimClock::new()).with_clip("a", Duration::from_secs(60));
        let config = EngineConfig::new(vec![ClipRef::new("a")], settings(1000));
        let engine =
            CrossfadeEngine::new(config, vec![backend.clone(), backend.clone(), backend]).unwrap();
        assert_eq!(engine.fade_mode(), FadeMode::FadeIn);
    }

    #[test]
    fn starts_with_fade_in_on_channel_a() {
        let engine = engine_with(&["a", "b"], settings(2000));
        assert_eq!(engine.fade_mode(), FadeMode::FadeIn);
        assert_eq!(engine.fade_state().fade_in_channel(), Some(ChannelId::A));
        assert_eq!(engine.channel(ChannelId::A).clip(), Some(&ClipRef::new("a")));
        assert!(engine.channel(ChannelId::A).is_playing());
        assert_eq!(engine.channel(ChannelId::A).volume(), 0.0);
    }

    #[test]
    fn empty_sequence_starts_silent() {
        let mut engine = engine_with(&[], settings(2000));
        assert_eq!(engine.fade_mode(), FadeMode::None);

        engine.tick(Duration::from_millis(16));
        assert_eq!(engine.channel(ChannelId::A).volume(), 0.0);
        assert_eq!(engine.channel(ChannelId::B).volume(), 0.0);
    }

    #[test]
    fn unknown_first_clip_starts_silent() {
        let backend = SimulatedBackend::new(SimClock::new());
        let config = EngineConfig::new(vec![ClipRef::new("ghost")], settings(1000));
        let engine = CrossfadeEngine::new(config, vec![backend.clone(), backend]).unwrap();
        assert_eq!(engine.fade_mode(), FadeMode::None);
        assert!(!engine.channel(ChannelId::A).is_playing());
    }

    #[test]
    fn zero_tick_does_not_progress() {
        let mut engine = engine_with(&["a"], settings(2000));
        engine.tick(Duration::ZERO);
        assert_eq!(engine.fade_mode(), FadeMode::FadeIn);
        assert_eq!(engine.fade_state().elapsed(), Duration::ZERO);
        assert_eq!(engine.channel(ChannelId::A).volume(), 0.0);
    }

    #[test]
    fn zero_duration_finishes_on_next_tick() {
        let mut engine = engine_with(&["a", "b"], settings(0));
        engine.tick(Duration::ZERO);
        assert_eq!(engine.fade_mode(), FadeMode::None);
        assert_eq!(engine.channel(ChannelId::A).volume(), 1.0);

        assert_eq!(
            engine.advance_to_next(),
            CommandOutcome::Started(FadeMode::CrossFade)
        );
        engine.tick(Duration::ZERO);
        assert_eq!(engine.fade_mode(), FadeMode::None);
        assert_eq!(engine.active_channel(), ChannelId::B);
        assert_eq!(engine.channel(ChannelId::B).volume(), 1.0);
        assert_eq!(engine.channel(ChannelId::A).volume(), 0.0);
    }

    #[test]
    fn unknown_target_clip_is_rejected_without_state_change() {
        let clock = SimClock::new();
        let backend = SimulatedBackend::new(clock).with_clip("a", Duration::from_secs(60));
        let config = EngineConfig::new(
            vec![ClipRef::new("a"), ClipRef::new("missing")],
            settings(1000),
        );
        let mut engine = CrossfadeEngine::new(config, vec![backend.clone(), backend]).unwrap();
        engine.tick(Duration::from_secs(1));

        assert_eq!(engine.advance_to(1), CommandOutcome::Rejected);
        assert_eq!(engine.fade_mode(), FadeMode::None);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.active_channel(), ChannelId::A);
        assert_eq!(engine.channel(ChannelId::A).volume(), 1.0);
    }

    #[test]
    fn fade_duration_change_rescales_transition() {
        let mut engine = engine_with(&["a"], settings(4000));
        engine.tick(Duration::from_secs(1));
        assert!((engine.channel(ChannelId::A).volume() - 0.25).abs() < 1e-4);

        engine.set_fade_duration_ms(2000);
        engine.tick(Duration::ZERO);
        assert!((engine.channel(ChannelId::A).volume() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn engine_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CrossfadeEngine<SimulatedBackend>>();
    }
}
