/// Xfade Simulator - runs the crossfade engine against a simulated clock
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xfade_sim::{run, RunOptions, SimConfig};

#[derive(Parser)]
#[command(name = "xfade-sim")]
#[command(about = "Drive the xfade crossfade engine with a simulated frame loop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and log every engine event
    Run {
        /// Configuration file path (defaults to ./xfade.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated seconds to run
        #[arg(short, long, default_value_t = 30.0)]
        seconds: f64,

        /// Frame length in milliseconds
        #[arg(short, long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
        tick_ms: u64,

        /// Advance to the next clip every N seconds
        #[arg(short, long)]
        advance_every: Option<f64>,
    },
    /// Load and validate a configuration, then print it
    Check {
        /// Configuration file path (defaults to ./xfade.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xfade_sim=info,xfade_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seconds,
            tick_ms,
            advance_every,
        } => {
            let config = SimConfig::load(config.as_deref())?;
            let options = RunOptions {
                duration: seconds_arg("seconds", seconds)?,
                tick: Duration::from_millis(tick_ms),
                advance_every: advance_every
                    .map(|secs| seconds_arg("advance-every", secs))
                    .transpose()?,
                ..Default::default()
            };

            let summary = run(&config, &options)?;
            tracing::info!(
                "Finished after {} ticks and {} events: clip {} mode {:?} volumes A={:.3} B={:.3}",
                summary.ticks,
                summary.events.len(),
                summary.final_index,
                summary.final_mode,
                summary.final_volumes.0,
                summary.final_volumes.1
            );
        }
        Commands::Check { config } => {
            let config = SimConfig::load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn seconds_arg(name: &str, secs: f64) -> anyhow::Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        anyhow::bail!("--{} must be a non-negative number of seconds, got {}", name, secs);
    }
    Ok(Duration::from_secs_f64(secs))
}
