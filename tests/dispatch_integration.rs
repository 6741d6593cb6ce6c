//! Integration tests for the dispatch coordinator and responders
//!
//! Agents run as real tasks on the in-process transport. Where a test
//! needs to play the sensor or a silent responder it registers that
//! mailbox itself and drives it by hand.

use std::sync::Arc;
use std::time::Duration;

use lpg_response::agents::{
    AgentMessage, CoordinatorAgent, CoordinatorSettings, DispatchEvent, MessageBody,
    MessageTransport, Performative, ResponderAgent,
};
use lpg_response::config::AppConfig;
use lpg_response::domain::incident::ResponseProtocol;
use lpg_response::domain::percept::EventTag;
use lpg_response::domain::{AgentId, IncidentId};
use lpg_response::infrastructure::InProcessTransport;
use lpg_response::simulation::run_dispatch;

fn id(s: &str) -> AgentId {
    AgentId::new(s).expect("valid agent id")
}

fn settings(responders: &[&str]) -> CoordinatorSettings {
    CoordinatorSettings {
        sensor: id("sensor_agent@localhost"),
        responders: responders.iter().map(|r| id(r)).collect(),
        suppress_normal_readings: false,
        ack_timeout: Duration::from_secs(5),
        receive_timeout: Duration::from_secs(3),
    }
}

fn sensor_event(event: EventTag) -> AgentMessage {
    AgentMessage::inform(
        id("sensor_agent@localhost"),
        id("coordinator@localhost"),
        MessageBody::Event(event),
    )
}

#[tokio::test(start_paused = true)]
async fn full_dispatch_resolves_every_hazard() {
    let mut config = AppConfig::default();
    config.sensor.script = Some(vec![50.0, 600.0, 950.0, 50.0, 50.0]);
    config.sensor.max_cycles = 5;
    config.dispatch.suppress_normal_readings = true;

    let scenario = run_dispatch(&config, Arc::new(InProcessTransport::new()))
        .await
        .expect("scenario runs");

    assert_eq!(scenario.coordinator.opened(), vec![IncidentId(1), IncidentId(2)]);
    assert_eq!(scenario.coordinator.resolved(), vec![IncidentId(1), IncidentId(2)]);
    assert!(scenario.coordinator.expired().is_empty());
    assert_eq!(scenario.coordinator.pending, 0);
    assert!(matches!(
        scenario.coordinator.events.last(),
        Some(DispatchEvent::ShutdownForwarded { responders }) if responders.len() == 2
    ));

    assert_eq!(scenario.responders.len(), 2);
    for responder in &scenario.responders {
        let protocols: Vec<_> = responder.handled.iter().map(|h| h.protocol).collect();
        assert_eq!(
            protocols,
            vec![
                ResponseProtocol::AlertStaffAndVentilate,
                ResponseProtocol::EvacuateAndCloseValves
            ]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn fan_out_scales_with_responder_count() {
    let mut config = AppConfig::default();
    config.sensor.script = Some(vec![250.0, 50.0, 50.0]);
    config.sensor.max_cycles = 3;
    config.dispatch.responders = 4;

    let scenario = run_dispatch(&config, Arc::new(InProcessTransport::new()))
        .await
        .expect("scenario runs");

    assert_eq!(scenario.responders.len(), 4);
    assert!(scenario.responders.iter().all(|r| r.handled.len() == 3));
    assert_eq!(
        scenario.coordinator.resolved(),
        vec![IncidentId(1), IncidentId(2)]
    );
}

#[tokio::test(start_paused = true)]
async fn normal_readings_are_dispatched_by_default() {
    let mut config = AppConfig::default();
    config.sensor.script = Some(vec![50.0, 250.0, 50.0, 50.0]);
    config.sensor.max_cycles = 4;

    let scenario = run_dispatch(&config, Arc::new(InProcessTransport::new()))
        .await
        .expect("scenario runs");

    assert_eq!(scenario.coordinator.opened().len(), 4);
    assert_eq!(
        scenario.coordinator.resolved(),
        vec![IncidentId(1), IncidentId(2), IncidentId(3)]
    );
    // the last request is still out when SHUTDOWN arrives
    assert_eq!(scenario.coordinator.pending, 1);

    for responder in &scenario.responders {
        let events: Vec<_> = responder.handled.iter().map(|h| h.event).collect();
        assert_eq!(
            events,
            vec![
                EventTag::NormalCondition,
                EventTag::PossibleGasLeak,
                EventTag::NormalCondition,
                EventTag::NormalCondition,
            ]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_forwarded_to_every_responder() {
    let transport = Arc::new(InProcessTransport::new());
    let coordinator_mb = transport.register(&id("coordinator@localhost")).await.unwrap();
    let mut r1 = transport.register(&id("responder1@localhost")).await.unwrap();
    let mut r2 = transport.register(&id("responder2@localhost")).await.unwrap();

    let coordinator = CoordinatorAgent::new(
        id("coordinator@localhost"),
        settings(&["responder1@localhost", "responder2@localhost"]),
    );
    let handle = tokio::spawn(coordinator.run(coordinator_mb, transport.clone()));

    transport.send(sensor_event(EventTag::Shutdown)).await.unwrap();
    let report = handle.await.unwrap().unwrap();
    assert!(report.opened().is_empty());

    for mailbox in [&mut r1, &mut r2] {
        let msg = mailbox.receive(Duration::from_millis(10)).await.unwrap();
        assert!(msg.body.is_shutdown());
        assert_eq!(msg.sender.as_str(), "coordinator@localhost");
        assert_eq!(msg.performative, Performative::Inform);
        assert!(mailbox.receive(Duration::from_millis(10)).await.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn requests_carry_the_incident_id() {
    let transport = Arc::new(InProcessTransport::new());
    let coordinator_mb = transport.register(&id("coordinator@localhost")).await.unwrap();
    let mut r1 = transport.register(&id("responder1@localhost")).await.unwrap();

    let coordinator =
        CoordinatorAgent::new(id("coordinator@localhost"), settings(&["responder1@localhost"]));
    let handle = tokio::spawn(coordinator.run(coordinator_mb, transport.clone()));

    transport.send(sensor_event(EventTag::GasLeakConfirmed)).await.unwrap();
    transport.send(sensor_event(EventTag::CriticalGasLevel)).await.unwrap();

    let first = r1.receive(Duration::from_secs(1)).await.unwrap();
    let second = r1.receive(Duration::from_secs(1)).await.unwrap();
    assert_eq!(first.performative, Performative::Request);
    assert_eq!(first.body.to_string(), "handle_GAS_LEAK_CONFIRMED");
    assert_eq!(first.incident_id, Some(IncidentId(1)));
    assert_eq!(second.body.to_string(), "handle_CRITICAL_GAS_LEVEL");
    assert_eq!(second.incident_id, Some(IncidentId(2)));

    transport.send(sensor_event(EventTag::Shutdown)).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn silent_responder_expires_the_incident() {
    let transport = Arc::new(InProcessTransport::new());
    let coordinator_mb = transport.register(&id("coordinator@localhost")).await.unwrap();
    let _silent = transport.register(&id("responder1@localhost")).await.unwrap();
    let r2_mb = transport.register(&id("responder2@localhost")).await.unwrap();

    let responder = ResponderAgent::new(
        r2_mb,
        id("coordinator@localhost"),
        transport.clone(),
        Duration::from_secs(1),
        Duration::from_secs(3),
    );
    let responder_task = tokio::spawn(responder.run());

    let coordinator = CoordinatorAgent::new(
        id("coordinator@localhost"),
        settings(&["responder1@localhost", "responder2@localhost"]),
    );
    let handle = tokio::spawn(coordinator.run(coordinator_mb, transport.clone()));

    transport.send(sensor_event(EventTag::PossibleGasLeak)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(8)).await;
    transport.send(sensor_event(EventTag::Shutdown)).await.unwrap();

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.opened(), vec![IncidentId(1)]);
    assert!(report.resolved().is_empty());
    assert_eq!(report.expired(), vec![IncidentId(1)]);
    assert!(report.events.contains(&DispatchEvent::Expired {
        incident: IncidentId(1),
        event: EventTag::PossibleGasLeak,
        missing: vec![id("responder1@localhost")],
    }));
    assert_eq!(report.pending, 0);

    let responder_report = responder_task.await.unwrap().unwrap();
    assert_eq!(responder_report.handled.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_and_unexpected_messages_are_discarded() {
    let transport = Arc::new(InProcessTransport::new());
    let coordinator_mb = transport.register(&id("coordinator@localhost")).await.unwrap();
    let mut r1 = transport.register(&id("responder1@localhost")).await.unwrap();

    let coordinator =
        CoordinatorAgent::new(id("coordinator@localhost"), settings(&["responder1@localhost"]));
    let handle = tokio::spawn(coordinator.run(coordinator_mb, transport.clone()));

    let coordinator_id = id("coordinator@localhost");
    transport.send_raw(&coordinator_id, "not json").await.unwrap();
    transport
        .send_raw(
            &coordinator_id,
            r#"{"id":"00000000-0000-0000-0000-000000000000","sender":"sensor_agent@localhost","to":"coordinator@localhost","performative":"inform","body":"MAYBE_GAS","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .await
        .unwrap();
    transport
        .send(AgentMessage::inform(
            id("intruder@localhost"),
            coordinator_id.clone(),
            MessageBody::Event(EventTag::CriticalGasLevel),
        ))
        .await
        .unwrap();
    transport.send(sensor_event(EventTag::CriticalGasLevel)).await.unwrap();

    let request = r1.receive(Duration::from_secs(1)).await.unwrap();
    assert_eq!(request.incident_id, Some(IncidentId(1)));
    assert!(r1.receive(Duration::from_millis(100)).await.is_none());

    transport.send(sensor_event(EventTag::Shutdown)).await.unwrap();
    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.opened(), vec![IncidentId(1)]);
}

#[tokio::test(start_paused = true)]
async fn responder_round_trip_through_coordinator() {
    let transport = Arc::new(InProcessTransport::new());
    let coordinator_mb = transport.register(&id("coordinator@localhost")).await.unwrap();
    let r1_mb = transport.register(&id("responder1@localhost")).await.unwrap();

    let responder_task = tokio::spawn(
        ResponderAgent::new(
            r1_mb,
            id("coordinator@localhost"),
            transport.clone(),
            Duration::from_secs(1),
            Duration::from_secs(3),
        )
        .run(),
    );
    let coordinator =
        CoordinatorAgent::new(id("coordinator@localhost"), settings(&["responder1@localhost"]));
    let handle = tokio::spawn(coordinator.run(coordinator_mb, transport.clone()));

    transport.send(sensor_event(EventTag::GasLeakConfirmed)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    transport.send(sensor_event(EventTag::Shutdown)).await.unwrap();

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.resolved(), vec![IncidentId(1)]);

    let responder_report = responder_task.await.unwrap().unwrap();
    assert_eq!(responder_report.handled[0].incident, Some(IncidentId(1)));
    assert_eq!(responder_report.handled[0].event, EventTag::GasLeakConfirmed);
}
