/// Xfade Simulator - frame-loop host for the crossfade engine
pub mod config;
pub mod error;
pub mod runner;

pub use config::{ClipSpec, SimConfig};
pub use error::{Result, SimError};
pub use runner::{run, RunOptions, RunSummary};
