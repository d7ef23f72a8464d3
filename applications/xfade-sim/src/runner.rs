/// Fixed-step frame loop driving the engine over simulated channels
use crate::config::SimConfig;
use crate::error::Result;
use std::time::Duration;
use tracing::{debug, info};
use xfade_engine::{ChannelId, CrossfadeEngine, EngineEvent, FadeMode, SimClock};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Total simulated time
    pub duration: Duration,

    /// Frame length
    pub tick: Duration,

    /// Send `AdvanceToNext` at this interval, if set
    pub advance_every: Option<Duration>,

    /// Log channel volumes at this interval
    pub report_every: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
            tick: Duration::from_millis(16),
            advance_every: None,
            report_every: Duration::from_secs(1),
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub events: Vec<EngineEvent>,
    pub final_index: usize,
    pub final_mode: FadeMode,
    pub final_volumes: (f32, f32),
}

/// Run the simulation to completion
pub fn run(config: &SimConfig, options: &RunOptions) -> Result<RunSummary> {
    let clock = SimClock::new();
    let backends = vec![config.backend(&clock), config.backend(&clock)];
    let mut engine = CrossfadeEngine::new(config.engine_config(), backends)?;
    let handle = engine.handle();

    info!(
        "Simulating {:?} in {:?} frames over {} clips ({} fades, {}ms)",
        options.duration,
        options.tick,
        config.clips.len(),
        engine.settings().curve.display_name(),
        engine.settings().fade_duration_ms
    );

    let mut events = Vec::new();
    let mut ticks = 0u64;
    let advance_every = options.advance_every.filter(|every| !every.is_zero());
    let mut next_advance = advance_every;
    let mut next_report = options.report_every;

    if options.tick.is_zero() {
        debug!("Zero frame length, nothing to simulate");
    }

    while !options.tick.is_zero() && clock.now() < options.duration {
        if let Some(at) = next_advance {
            if clock.now() >= at {
                handle.advance_to_next()?;
                next_advance = advance_every.map(|every| at + every);
            }
        }

        clock.advance(options.tick);
        engine.tick(options.tick);
        ticks += 1;

        for event in handle.drain_events() {
            info!("[{:>8.3}s] {:?}", clock.now().as_secs_f64(), event);
            events.push(event);
        }

        if !options.report_every.is_zero() && clock.now() >= next_report {
            info!(
                "[{:>8.3}s] mode={:?} active={:?} clip={} A={:.3} B={:.3}",
                clock.now().as_secs_f64(),
                engine.fade_mode(),
                engine.active_channel(),
                engine.current_index(),
                engine.channel(ChannelId::A).volume(),
                engine.channel(ChannelId::B).volume()
            );
            next_report += options.report_every;
        }
    }

    Ok(RunSummary {
        ticks,
        events,
        final_index: engine.current_index(),
        final_mode: engine.fade_mode(),
        final_volumes: (
            engine.channel(ChannelId::A).volume(),
            engine.channel(ChannelId::B).volume(),
        ),
    })
}
