//! Commands and the cross-thread engine handle
//!
//! The engine must have a single writer. Hosts that issue commands from other
//! threads send them through an [`EngineHandle`]; the engine applies them, in
//! order, at the start of its next tick.

use crate::error::{CrossfadeError, Result};
use crate::events::EngineEvent;
use crate::fade::FadeMode;
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Commands accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    /// Crossfade to the next clip, or fade out past the end of the sequence
    AdvanceToNext,

    /// Crossfade to a clip by index, or fade out if the index is out of range
    AdvanceTo(usize),

    /// Fade the active channel out to silence
    FadeOutCurrent,

    /// Change the steady-state volume
    SetTargetVolume(f32),
}

/// What happened to a transition command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A transition of this kind began
    Started(FadeMode),

    /// A transition is in flight; the command runs when it completes
    Deferred,

    /// The engine could not start the transition (e.g. the clip failed to load)
    Rejected,

    /// Applied immediately without a transition
    Applied,
}

/// Cloneable handle for driving an engine from another thread
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: Sender<EngineCommand>,
    event_rx: Receiver<EngineEvent>,
}

impl EngineHandle {
    pub(crate) fn new(command_tx: Sender<EngineCommand>, event_rx: Receiver<EngineEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Queue a command for the next tick
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| CrossfadeError::CommandChannelClosed)
    }

    pub fn advance_to_next(&self) -> Result<()> {
        self.send_command(EngineCommand::AdvanceToNext)
    }

    pub fn advance_to(&self, index: usize) -> Result<()> {
        self.send_command(EngineCommand::AdvanceTo(index))
    }

    pub fn fade_out_current(&self) -> Result<()> {
        self.send_command(EngineCommand::FadeOutCurrent)
    }

    pub fn set_target_volume(&self, volume: f32) -> Result<()> {
        self.send_command(EngineCommand::SetTargetVolume(volume))
    }

    /// Try to receive next event (non-blocking)
    ///
    /// Shares the queue with every other handle, see [`EngineHandle::drain_events`].
    pub fn try_recv_event(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Drain every event currently queued
    ///
    /// Every handle, and the engine itself, reads from the same queue. With
    /// several consumers each event goes to whichever one drains it first;
    /// events are not broadcast to all of them.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }
}
