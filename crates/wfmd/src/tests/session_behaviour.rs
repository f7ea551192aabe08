//! Behavioural tests driving the control port end-to-end over TCP.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{RunningServer, bootstrap_with};
use crate::device::SimulatedDevice;
use crate::instrument::{InstrumentState, TriggerStatus};

use super::support::{
    Event, RecordingHealthReporter, RecordingStreamer, ScpiClient, TestConfigLoader, Timeline,
    simulated_device, wait_until,
};

/// Query used to make sure earlier lines have been applied.
const SYNC_QUERY: &str = "CHANS?";

struct SessionWorld {
    timeline: Timeline,
    device: SimulatedDevice,
    server: Option<RunningServer>,
    client: Option<ScpiClient>,
    replies: Vec<String>,
}

impl SessionWorld {
    fn new() -> Self {
        Self {
            timeline: Timeline::default(),
            device: simulated_device(),
            server: None,
            client: None,
            replies: Vec::new(),
        }
    }

    fn start_server(&mut self) {
        let reporter = Arc::new(RecordingHealthReporter::new(self.timeline.clone()));
        let daemon = bootstrap_with(&TestConfigLoader, reporter).expect("bootstrap");
        let streamer = Arc::new(RecordingStreamer::new(self.timeline.clone()));
        self.server = Some(
            daemon
                .serve(self.device.clone(), streamer)
                .expect("serve control port"),
        );
    }

    fn server(&self) -> &RunningServer {
        self.server.as_ref().expect("server should be running")
    }

    fn client(&mut self) -> &mut ScpiClient {
        self.client.as_mut().expect("client should be connected")
    }

    /// Sends `line`, then round-trips a query so the server has applied it.
    fn send(&mut self, line: &str) {
        let client = self.client();
        client.send(&format!("{line}\n{SYNC_QUERY}\n"));
        client.read_reply();
    }

    fn query(&mut self, line: &str) {
        let client = self.client();
        client.send(&format!("{line}\n"));
        let reply = client.read_reply();
        self.replies.push(reply);
    }

    fn state(&self) -> InstrumentState {
        self.server().instrument().state().expect("state lock")
    }
}

impl Drop for SessionWorld {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            client.close();
        }
        if let Some(server) = self.server.take() {
            let _ = server.stop();
        }
    }
}

#[fixture]
fn world() -> RefCell<SessionWorld> {
    RefCell::new(SessionWorld::new())
}

#[given("a running waveform server")]
fn given_running_server(world: &RefCell<SessionWorld>) {
    world.borrow_mut().start_server();
}

#[given("a connected client")]
fn given_connected_client(world: &RefCell<SessionWorld>) {
    let addr = world.borrow().server().local_addr();
    world.borrow_mut().client = Some(ScpiClient::connect(addr));
}

#[when(r#"the client sends "{line}""#)]
fn when_client_sends(world: &RefCell<SessionWorld>, line: String) {
    world.borrow_mut().send(strip_quotes(&line));
}

#[when(r#"the client queries "{line}""#)]
fn when_client_queries(world: &RefCell<SessionWorld>, line: String) {
    world.borrow_mut().query(strip_quotes(&line));
}

#[when("the client disconnects")]
fn when_client_disconnects(world: &RefCell<SessionWorld>) {
    let client = world.borrow_mut().client.take();
    if let Some(client) = client {
        client.close();
    }
    let timeline = world.borrow().timeline.clone();
    assert!(
        wait_until(|| !timeline.disconnections().is_empty()),
        "session did not end: {:?}",
        timeline.events()
    );
}

#[then(r#"the replies are "{first}" and "{second}""#)]
fn then_replies_are(world: &RefCell<SessionWorld>, first: String, second: String) {
    let expected = vec![
        strip_quotes(&first).to_owned(),
        strip_quotes(&second).to_owned(),
    ];
    assert_eq!(world.borrow().replies, expected);
}

#[then("the trigger is armed")]
fn then_trigger_armed(world: &RefCell<SessionWorld>) {
    let state = world.borrow().state();
    assert!(state.is_armed(), "trigger should be armed");
    assert!(state.snapshot().is_some(), "armed trigger needs a snapshot");
}

#[then("the trigger is disarmed")]
fn then_trigger_disarmed(world: &RefCell<SessionWorld>) {
    let state = world.borrow().state();
    assert_eq!(state.status(), TriggerStatus::Disarmed);
    assert!(state.snapshot().is_none());
}

#[then("the trigger is armed for a single capture")]
fn then_trigger_one_shot(world: &RefCell<SessionWorld>) {
    assert_eq!(
        world.borrow().state().status(),
        TriggerStatus::Armed { one_shot: true }
    );
}

#[then("channel {channel} is captured")]
fn then_channel_captured(world: &RefCell<SessionWorld>, channel: usize) {
    let snapshot = world
        .borrow()
        .server()
        .instrument()
        .armed_snapshot()
        .expect("state lock")
        .expect("armed snapshot");
    let captured: Vec<usize> = snapshot.enabled_channels().collect();
    assert_eq!(captured, vec![channel - 1]);
}

#[then("the streaming collaborator has stopped")]
fn then_streaming_stopped(world: &RefCell<SessionWorld>) {
    let timeline = world.borrow().timeline.clone();
    let started = timeline.count(&Event::StreamStarted);
    assert_eq!(started, 1);
    assert_eq!(timeline.count(&Event::StreamStopped), started);
    let events = timeline.events();
    let stopped_at = events.iter().position(|event| *event == Event::StreamStopped);
    let ended_at = events
        .iter()
        .position(|event| matches!(event, Event::ClientDisconnected(_)));
    assert!(stopped_at < ended_at, "stream outlived session: {events:?}");
}

#[then("the device was reset {count} times")]
fn then_device_reset(world: &RefCell<SessionWorld>, count: usize) {
    let registers = world.borrow().device.registers().expect("registers");
    assert_eq!(registers.resets, count);
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

#[scenario(path = "tests/features/control_session.feature", name = "Answering queries")]
fn answering_queries(#[from(world)] world: RefCell<SessionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/control_session.feature",
    name = "Admission guard on start"
)]
fn admission_guard(#[from(world)] world: RefCell<SessionWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/control_session.feature", name = "One-shot arming")]
fn one_shot_arming(#[from(world)] world: RefCell<SessionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/control_session.feature",
    name = "Disconnect tears the session down"
)]
fn disconnect_teardown(#[from(world)] world: RefCell<SessionWorld>) {
    drop(world);
}
