//! # LPG station agents
//!
//! - `lpg-response heartbeat` - single agent lifecycle check
//! - `lpg-response perceive` - sensor classifying readings, no messaging
//! - `lpg-response incident` - sensor driving the incident state machine
//! - `lpg-response dispatch` - sensor, coordinator and responders
//!
//! Configuration comes from `LPG_*` environment variables (and `.env`);
//! flags given here win.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use lpg_response::agents::MessageTransport;
use lpg_response::config::{parse_script, AppConfig, TimingConfig};
use lpg_response::infrastructure::InProcessTransport;
use lpg_response::logging::init_logging;
use lpg_response::simulation;

/// Hazard response agents for a simulated LPG filling station
#[derive(Parser)]
#[command(name = "lpg-response")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Also append every log line to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<std::path::PathBuf>,

    /// Zero dwell and work delays
    #[arg(long, global = true)]
    fast: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Sensor options shared by the scenarios that poll the station
#[derive(clap::Args)]
struct SensorArgs {
    /// Number of readings before the sensor sends SHUTDOWN
    #[arg(long)]
    cycles: Option<u32>,

    /// Comma-separated ppm values replayed instead of the simulated station
    #[arg(long, value_name = "PPM,...")]
    script: Option<String>,

    /// Seed for the simulated station
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start one agent, report it alive and stop it
    Heartbeat,

    /// Poll and classify readings without messaging anyone
    Perceive {
        #[command(flatten)]
        sensor: SensorArgs,
    },

    /// Drive the incident state machine from the sensor
    Incident {
        #[command(flatten)]
        sensor: SensorArgs,
    },

    /// Fan sensor events out to responders through the coordinator
    Dispatch {
        #[command(flatten)]
        sensor: SensorArgs,

        /// Number of responders
        #[arg(long)]
        responders: Option<usize>,

        /// Do not dispatch NORMAL_CONDITION readings
        #[arg(long)]
        suppress_normal: bool,
    },
}

impl SensorArgs {
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(cycles) = self.cycles {
            config.sensor.max_cycles = cycles;
        }
        if let Some(raw) = &self.script {
            let script = parse_script(raw)
                .map_err(anyhow::Error::msg)
                .context("invalid --script")?;
            if self.cycles.is_none() {
                config.sensor.max_cycles = script.len() as u32;
            }
            config.sensor.script = Some(script);
        }
        if let Some(seed) = self.seed {
            config.sensor.seed = Some(seed);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    if let Some(path) = cli.log_file {
        config.logging.file = Some(path);
    }
    if cli.fast {
        config.timing = TimingConfig::immediate();
    }

    match &cli.command {
        Commands::Heartbeat => {}
        Commands::Perceive { sensor } | Commands::Incident { sensor } => sensor.apply(&mut config)?,
        Commands::Dispatch {
            sensor,
            responders,
            suppress_normal,
        } => {
            sensor.apply(&mut config)?;
            if let Some(n) = responders {
                config.dispatch.responders = *n;
            }
            if *suppress_normal {
                config.dispatch.suppress_normal_readings = true;
            }
        }
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging).context("failed to open log file")?;

    let transport: Arc<dyn MessageTransport> = Arc::new(InProcessTransport::new());
    tracing::info!(transport = transport.name(), "starting agents");

    match cli.command {
        Commands::Heartbeat => {
            let id = simulation::run_heartbeat(&config, transport).await?;
            tracing::info!(agent = %id, "heartbeat complete");
        }
        Commands::Perceive { .. } => {
            let report = simulation::run_perception(&config, transport).await?;
            tracing::info!(readings = report.samples.len(), "perception complete");
        }
        Commands::Incident { .. } => {
            let scenario = simulation::run_incident_response(&config, transport).await?;
            let path: Vec<String> = scenario
                .incident
                .path
                .iter()
                .map(ToString::to_string)
                .collect();
            tracing::info!(
                readings = scenario.sensor.samples.len(),
                effects = scenario.incident.effects.len(),
                path = %path.join(" -> "),
                "incident scenario complete"
            );
        }
        Commands::Dispatch { .. } => {
            let scenario = simulation::run_dispatch(&config, transport).await?;
            let handled: usize = scenario.responders.iter().map(|r| r.handled.len()).sum();
            tracing::info!(
                opened = scenario.coordinator.opened().len(),
                resolved = scenario.coordinator.resolved().len(),
                expired = scenario.coordinator.expired().len(),
                handled,
                "dispatch scenario complete"
            );
        }
    }

    Ok(())
}
