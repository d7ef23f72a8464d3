//! Xfade - Dual-Channel Crossfade Engine
//!
//! Platform-agnostic crossfade playback for hosts with a frame loop.
//!
//! This crate provides:
//! - Two alternating playback channels (A/B)
//! - Fade-in, crossfade and fade-out transitions driven by explicit ticks
//! - Auto-crossfade near clip end for seamless looping
//! - Fade curves (Linear, Square Root, S-Curve, Equal Power)
//! - Events and a cross-thread command handle
//!
//! # Architecture
//!
//! `xfade-engine` never produces audio itself. The host implements
//! [`PlaybackBackend`] for whatever actually plays clips and calls
//! [`CrossfadeEngine::tick`] once per frame.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use xfade_engine::{
//!     ChannelId, ClipRef, CrossfadeEngine, EngineConfig, EngineSettings, FadeMode,
//!     SimClock, SimulatedBackend,
//! };
//! use std::time::Duration;
//!
//! let clock = SimClock::new();
//! let backend = SimulatedBackend::new(clock.clone())
//!     .with_clip("forest", Duration::from_secs(120))
//!     .with_clip("river", Duration::from_secs(90));
//!
//! let config = EngineConfig::new(
//!     vec![ClipRef::new("forest"), ClipRef::new("river")],
//!     EngineSettings { fade_duration_ms: 2000, ..Default::default() },
//! );
//! let mut engine = CrossfadeEngine::new(config, vec![backend.clone(), backend]).unwrap();
//!
//! // First clip fades in over two seconds
//! clock.advance(Duration::from_secs(2));
//! engine.tick(Duration::from_secs(2));
//! assert_eq!(engine.fade_mode(), FadeMode::None);
//! assert_eq!(engine.channel(ChannelId::A).volume(), 1.0);
//!
//! // Crossfade into the next clip
//! engine.advance_to_next();
//! assert_eq!(engine.fade_mode(), FadeMode::CrossFade);
//! ```
//!
//! # Example: Driving From Another Thread
//!
//! ```rust,no_run
//! use xfade_engine::{CrossfadeEngine, EngineConfig, SimClock, SimulatedBackend};
//! use std::time::Duration;
//!
//! let backend = SimulatedBackend::new(SimClock::new());
//! let mut engine =
//!     CrossfadeEngine::new(EngineConfig::default(), vec![backend.clone(), backend]).unwrap();
//!
//! let handle = engine.handle();
//! std::thread::spawn(move || {
//!     handle.advance_to_next().ok();
//! });
//!
//! // Commands are applied at the start of the next tick
//! engine.tick(Duration::from_millis(16));
//! ```

mod channel;
mod command;
mod curve;
mod engine;
mod error;
mod events;
mod fade;
pub mod sim;
pub mod types;

// Public exports
pub use channel::{ChannelId, ChannelPair, PlaybackBackend, PlaybackChannel};
pub use command::{CommandOutcome, EngineCommand, EngineHandle};
pub use curve::FadeCurve;
pub use engine::CrossfadeEngine;
pub use error::{CrossfadeError, Result};
pub use events::EngineEvent;
pub use fade::{FadeMode, FadeState};
pub use sim::{SimClock, SimulatedBackend};
pub use types::{ClipRef, EngineConfig, EngineSettings};
