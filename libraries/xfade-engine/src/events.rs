//! Engine Events
//!
//! Emitted at key points so a host can follow what the engine is doing:
//! - Transition start and completion
//! - Clip changes and loop restarts
//! - Deferred commands
//! - Target volume changes

use crate::channel::ChannelId;
use crate::command::EngineCommand;
use crate::fade::FadeMode;
use crate::types::ClipRef;
use serde::{Deserialize, Serialize};

/// Events emitted by the crossfade engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A transition began
    FadeStarted {
        mode: FadeMode,
        /// Channel fading out (absent for a fade-in)
        from: Option<ChannelId>,
        /// Channel fading in (absent for a fade-out)
        to: Option<ChannelId>,
        /// Index of the clip that is now current
        clip_index: usize,
        duration_ms: u32,
    },

    /// A transition reached its full duration
    FadeCompleted {
        mode: FadeMode,
        /// Active channel after the transition
        active: ChannelId,
    },

    /// Crossfade started towards a different clip in the sequence
    ClipChanged { index: usize, clip: ClipRef },

    /// The current clip was restarted on the idle channel near its end
    LoopRestarted { clip: ClipRef },

    /// A command arrived mid-transition and will run when it completes
    CommandDeferred { command: EngineCommand },

    /// Target volume changed
    TargetVolumeChanged { volume: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_for_hosts() {
        let event = EngineEvent::FadeStarted {
            mode: FadeMode::CrossFade,
            from: Some(ChannelId::A),
            to: Some(ChannelId::B),
            clip_index: 2,
            duration_ms: 1500,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"CrossFade\""));
        assert!(json.contains("\"clip_index\":2"));

        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
