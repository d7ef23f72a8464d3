/// Simulator configuration
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xfade_engine::{ClipRef, EngineConfig, EngineSettings, SimClock, SimulatedBackend};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "xfade.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub clips: Vec<ClipSpec>,
}

/// A simulated clip: an id and how long it plays
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClipSpec {
    pub id: String,

    #[serde(default = "default_length_secs")]
    pub length_secs: f64,
}

fn default_length_secs() -> f64 {
    60.0
}

impl SimConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `xfade.toml` in the working
    /// directory is used if present. Environment variables prefixed with
    /// `XFADE_` override file values, e.g. `XFADE_ENGINE__FADE_DURATION_MS=1500`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("XFADE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: SimConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.engine.target_volume.is_finite() {
            return Err(SimError::Config(format!(
                "engine.target_volume must be finite, got {}",
                self.engine.target_volume
            )));
        }

        let mut seen = HashSet::new();
        for clip in &self.clips {
            if clip.id.is_empty() {
                return Err(SimError::Config("clip id must not be empty".to_string()));
            }
            if !seen.insert(clip.id.as_str()) {
                return Err(SimError::Config(format!("duplicate clip id {:?}", clip.id)));
            }
            if !clip.length_secs.is_finite() || clip.length_secs <= 0.0 {
                return Err(SimError::Config(format!(
                    "clip {:?} has invalid length {}",
                    clip.id, clip.length_secs
                )));
            }
        }

        if self.clips.is_empty() {
            tracing::warn!("No clips configured, the engine will start silent");
        }

        Ok(())
    }

    /// Engine configuration for the configured clip sequence
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            self.clips
                .iter()
                .map(|clip| ClipRef::new(clip.id.clone()))
                .collect(),
            self.engine.clone(),
        )
    }

    /// A simulated channel that knows every configured clip
    pub fn backend(&self, clock: &SimClock) -> SimulatedBackend {
        SimulatedBackend::new(clock.clone()).with_library(
            self.clips
                .iter()
                .map(|clip| (clip.id.clone(), Duration::from_secs_f64(clip.length_secs))),
        )
    }
}
