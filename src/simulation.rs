//! Station scenarios
//!
//! Each `run_*` function registers every agent it needs, spawns them as
//! tasks and joins them. Registration happens before anything is spawned,
//! so a failure there aborts the scenario without side effects.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::agents::{
    AgentError, AgentResult, AgentRole, CoordinatorAgent, CoordinatorReport, CoordinatorSettings,
    HeartbeatAgent, IncidentAgent, IncidentReport, MessageTransport, ResponderAgent,
    ResponderReport, SensorAgent, SensorReport,
};
use crate::config::{AppConfig, SensorConfig};
use crate::domain::sources::ReadingSource;
use crate::domain::AgentId;
use crate::infrastructure::{ScriptedReadings, SimulatedStation};

/// Outcome of the sensor-to-incident-agent scenario
#[derive(Debug, Clone)]
pub struct IncidentScenario {
    pub sensor: SensorReport,
    pub incident: IncidentReport,
}

/// Outcome of the coordinator and responders scenario
#[derive(Debug, Clone)]
pub struct DispatchScenario {
    pub sensor: SensorReport,
    pub coordinator: CoordinatorReport,
    pub responders: Vec<ResponderReport>,
}

/// Reading source selected by the sensor configuration
///
/// A ppm script wins over the simulated station; a seed makes the station
/// reproducible.
pub fn reading_source(config: &SensorConfig) -> Box<dyn ReadingSource> {
    match (&config.script, config.seed) {
        (Some(script), _) => Box::new(ScriptedReadings::new(script.clone())),
        (None, Some(seed)) => Box::new(SimulatedStation::seeded(
            config.normal_duration,
            config.leak_duration,
            seed,
        )),
        (None, None) => Box::new(SimulatedStation::new(
            config.normal_duration,
            config.leak_duration,
        )),
    }
}

/// Lifecycle check of a single agent
pub async fn run_heartbeat(
    config: &AppConfig,
    transport: Arc<dyn MessageTransport>,
) -> AgentResult<AgentId> {
    let id = config.agents.heartbeat_id()?;
    let mailbox = transport.register(&id).await?;

    let agent = HeartbeatAgent::new(mailbox, config.timing.heartbeat());
    join(spawn(AgentRole::Heartbeat, &id, agent.run())).await
}

/// Perception only: the sensor logs what it classifies and sends nothing
pub async fn run_perception(
    config: &AppConfig,
    transport: Arc<dyn MessageTransport>,
) -> AgentResult<SensorReport> {
    let id = config.agents.sensor_id()?;
    let mailbox = transport.register(&id).await?;

    let sensor = SensorAgent::new(
        mailbox,
        reading_source(&config.sensor),
        transport.clone(),
        config.timing.poll_interval(),
        config.sensor.max_cycles,
    );
    join(spawn(AgentRole::Sensor, &id, sensor.run())).await
}

/// Sensor feeding the incident state machine agent
pub async fn run_incident_response(
    config: &AppConfig,
    transport: Arc<dyn MessageTransport>,
) -> AgentResult<IncidentScenario> {
    let sensor_id = config.agents.sensor_id()?;
    let incident_id = config.agents.incident_id()?;

    let incident_mailbox = transport.register(&incident_id).await?;
    let sensor_mailbox = transport.register(&sensor_id).await?;

    let incident = IncidentAgent::new(
        incident_mailbox,
        config.timing.receive_timeout(),
        config.timing.state_dwell(),
    );
    let sensor = SensorAgent::new(
        sensor_mailbox,
        reading_source(&config.sensor),
        transport.clone(),
        config.timing.poll_interval(),
        config.sensor.max_cycles,
    )
    .with_target(incident_id.clone());

    let incident_task = spawn(AgentRole::Incident, &incident_id, incident.run());
    let sensor_task = spawn(AgentRole::Sensor, &sensor_id, sensor.run());

    let (incident, sensor) = tokio::try_join!(join(incident_task), join(sensor_task))?;
    Ok(IncidentScenario { sensor, incident })
}

/// Sensor, coordinator and responders
pub async fn run_dispatch(
    config: &AppConfig,
    transport: Arc<dyn MessageTransport>,
) -> AgentResult<DispatchScenario> {
    let sensor_id = config.agents.sensor_id()?;
    let coordinator_id = config.agents.coordinator_id()?;
    let responder_ids = config.agents.responder_ids(config.dispatch.responders)?;

    let coordinator_mailbox = transport.register(&coordinator_id).await?;
    let mut responder_mailboxes = Vec::with_capacity(responder_ids.len());
    for id in &responder_ids {
        responder_mailboxes.push(transport.register(id).await?);
    }
    let sensor_mailbox = transport.register(&sensor_id).await?;

    let coordinator = CoordinatorAgent::new(
        coordinator_id.clone(),
        CoordinatorSettings {
            sensor: sensor_id.clone(),
            responders: responder_ids.clone(),
            suppress_normal_readings: config.dispatch.suppress_normal_readings,
            ack_timeout: config.dispatch.ack_timeout(),
            receive_timeout: config.timing.receive_timeout(),
        },
    );
    let coordinator_task = spawn(
        AgentRole::Coordinator,
        &coordinator_id,
        coordinator.run(coordinator_mailbox, transport.clone()),
    );

    let responder_tasks: Vec<_> = responder_mailboxes
        .into_iter()
        .map(|mailbox| {
            let id = mailbox.owner().clone();
            let responder = ResponderAgent::new(
                mailbox,
                coordinator_id.clone(),
                transport.clone(),
                config.timing.responder_work(),
                config.timing.receive_timeout(),
            );
            spawn(AgentRole::Responder, &id, responder.run())
        })
        .collect();

    let sensor = SensorAgent::new(
        sensor_mailbox,
        reading_source(&config.sensor),
        transport.clone(),
        config.timing.poll_interval(),
        config.sensor.max_cycles,
    )
    .with_target(coordinator_id.clone());
    let sensor_task = spawn(AgentRole::Sensor, &sensor_id, sensor.run());

    let (sensor, coordinator) = tokio::try_join!(join(sensor_task), join(coordinator_task))?;

    let mut responders = Vec::with_capacity(responder_tasks.len());
    for task in responder_tasks {
        responders.push(join(task).await?);
    }

    tracing::info!(
        opened = coordinator.opened().len(),
        resolved = coordinator.resolved().len(),
        expired = coordinator.expired().len(),
        "dispatch scenario finished"
    );

    Ok(DispatchScenario {
        sensor,
        coordinator,
        responders,
    })
}

fn spawn<F, T>(role: AgentRole, id: &AgentId, fut: F) -> JoinHandle<AgentResult<T>>
where
    F: std::future::Future<Output = AgentResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::info_span!("agent", role = %role, id = %id);
    tokio::spawn(fut.instrument(span))
}

async fn join<T>(handle: JoinHandle<AgentResult<T>>) -> AgentResult<T> {
    handle
        .await
        .map_err(|e| AgentError::TaskFailed(e.to_string()))?
}
