//! Runtime configuration
//!
//! Defaults reproduce the timing of the station agents (2 s poll, 3 s
//! receive timeout, 0.5 s state dwell, 1 s responder work). Values are
//! overridden from `LPG_*` environment variables (a `.env` file is loaded
//! first) and then from command-line flags in `main`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::AgentId;
use crate::logging::LogConfig;

/// Errors raised while building the configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid agent id: {0}")]
    InvalidAgentId(String),

    #[error("{0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Agent identities; each agent is addressed as `<name>@<domain>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentsConfig {
    pub domain: String,
    pub heartbeat: String,
    pub sensor: String,
    pub incident: String,
    pub coordinator: String,
    /// Responders are named `<prefix>1`, `<prefix>2`, ...
    pub responder_prefix: String,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            domain: "localhost".to_string(),
            heartbeat: "heartbeat_agent".to_string(),
            sensor: "sensor_agent".to_string(),
            incident: "incident_agent".to_string(),
            coordinator: "coordinator".to_string(),
            responder_prefix: "responder".to_string(),
        }
    }
}

impl AgentsConfig {
    fn jid(&self, name: &str) -> Result<AgentId, ConfigError> {
        AgentId::new(format!("{}@{}", name, self.domain)).map_err(ConfigError::InvalidAgentId)
    }

    pub fn heartbeat_id(&self) -> Result<AgentId, ConfigError> {
        self.jid(&self.heartbeat)
    }

    pub fn sensor_id(&self) -> Result<AgentId, ConfigError> {
        self.jid(&self.sensor)
    }

    pub fn incident_id(&self) -> Result<AgentId, ConfigError> {
        self.jid(&self.incident)
    }

    pub fn coordinator_id(&self) -> Result<AgentId, ConfigError> {
        self.jid(&self.coordinator)
    }

    pub fn responder_ids(&self, count: usize) -> Result<Vec<AgentId>, ConfigError> {
        (1..=count)
            .map(|n| self.jid(&format!("{}{}", self.responder_prefix, n)))
            .collect()
    }
}

/// Delays used by the agents, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sensor poll period
    pub poll_interval_ms: u64,
    /// Bounded wait on a mailbox
    pub receive_timeout_ms: u64,
    /// Settle delay after entering Alert, Assessment, Response and Completion
    pub state_dwell_ms: u64,
    /// Duration of a responder's simulated action
    pub responder_work_ms: u64,
    /// Lifetime of the heartbeat agent
    pub heartbeat_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            receive_timeout_ms: 3000,
            state_dwell_ms: 500,
            responder_work_ms: 1000,
            heartbeat_ms: 2000,
        }
    }
}

impl TimingConfig {
    /// No dwell or work delays; mailboxes still wait briefly so idle
    /// agents do not spin
    pub fn immediate() -> Self {
        Self {
            poll_interval_ms: 0,
            receive_timeout_ms: 50,
            state_dwell_ms: 0,
            responder_work_ms: 0,
            heartbeat_ms: 0,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn state_dwell(&self) -> Duration {
        Duration::from_millis(self.state_dwell_ms)
    }

    pub fn responder_work(&self) -> Duration {
        Duration::from_millis(self.responder_work_ms)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }
}

/// Reading source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Readings taken before the sensor sends SHUTDOWN
    pub max_cycles: u32,
    /// Ticks of normal operation before a leak starts
    pub normal_duration: u32,
    /// Ticks a leak lasts before the station resets
    pub leak_duration: u32,
    /// Seed for the simulated station; random when absent
    pub seed: Option<u64>,
    /// Fixed ppm sequence replayed instead of the simulated station
    pub script: Option<Vec<f64>>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_cycles: 25,
            normal_duration: 4,
            leak_duration: 10,
            seed: None,
            script: None,
        }
    }
}

/// Coordinator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub responders: usize,
    /// Keep NORMAL_CONDITION readings away from the responders
    pub suppress_normal_readings: bool,
    /// Pending records older than this are expired
    pub ack_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            responders: 2,
            suppress_normal_readings: false,
            ack_timeout_ms: 10_000,
        }
    }
}

impl DispatchConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl AppConfig {
    /// Loads `.env` if present, then applies `LPG_*` variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(domain) = lookup("LPG_DOMAIN") {
            config.agents.domain = domain;
        }
        if let Some(prefix) = lookup("LPG_RESPONDER_PREFIX") {
            config.agents.responder_prefix = prefix;
        }

        let timing = &mut config.timing;
        parse_into(&lookup, "LPG_POLL_INTERVAL_MS", &mut timing.poll_interval_ms)?;
        parse_into(&lookup, "LPG_RECEIVE_TIMEOUT_MS", &mut timing.receive_timeout_ms)?;
        parse_into(&lookup, "LPG_STATE_DWELL_MS", &mut timing.state_dwell_ms)?;
        parse_into(&lookup, "LPG_RESPONDER_WORK_MS", &mut timing.responder_work_ms)?;
        parse_into(&lookup, "LPG_HEARTBEAT_MS", &mut timing.heartbeat_ms)?;

        let sensor = &mut config.sensor;
        parse_into(&lookup, "LPG_MAX_CYCLES", &mut sensor.max_cycles)?;
        parse_into(&lookup, "LPG_NORMAL_DURATION", &mut sensor.normal_duration)?;
        parse_into(&lookup, "LPG_LEAK_DURATION", &mut sensor.leak_duration)?;
        if let Some(raw) = lookup("LPG_SEED") {
            sensor.seed = Some(parse_value("LPG_SEED", &raw)?);
        }
        if let Some(raw) = lookup("LPG_SCRIPT") {
            sensor.script = Some(parse_script(&raw).map_err(|reason| {
                ConfigError::InvalidValue {
                    key: "LPG_SCRIPT".to_string(),
                    value: raw.clone(),
                    reason,
                }
            })?);
        }

        let dispatch = &mut config.dispatch;
        parse_into(&lookup, "LPG_RESPONDERS", &mut dispatch.responders)?;
        parse_into(&lookup, "LPG_SUPPRESS_NORMAL", &mut dispatch.suppress_normal_readings)?;
        parse_into(&lookup, "LPG_ACK_TIMEOUT_MS", &mut dispatch.ack_timeout_ms)?;

        if let Some(level) = lookup("LPG_LOG_LEVEL") {
            config.logging.level = level;
        }
        parse_into(&lookup, "LPG_LOG_JSON", &mut config.logging.json)?;
        if let Some(path) = lookup("LPG_LOG_FILE") {
            config.logging.file = Some(path.into());
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.responders == 0 {
            return Err(ConfigError::Invalid(
                "at least one responder is required".to_string(),
            ));
        }
        if self.timing.receive_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "receive timeout must be greater than zero".to_string(),
            ));
        }
        if self.sensor.script.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Invalid("ppm script is empty".to_string()));
        }

        self.agents.heartbeat_id()?;
        self.agents.sensor_id()?;
        self.agents.incident_id()?;
        self.agents.coordinator_id()?;
        self.agents.responder_ids(self.dispatch.responders)?;
        Ok(())
    }
}

/// Parses a comma-separated ppm sequence such as `50,250,600`
pub fn parse_script(raw: &str) -> Result<Vec<f64>, String> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|e| format!("{:?}: {}", s, e)))
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err("no values".to_string());
    }
    Ok(values)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_into<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *slot = parse_value(key, &raw)?;
    }
    Ok(())
}
