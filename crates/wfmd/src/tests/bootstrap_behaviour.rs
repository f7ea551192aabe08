//! Behavioural tests for the server bootstrap sequence.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use wfm_config::LogFormat;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};

use super::support::{
    Event, FailingConfigLoader, RecordingHealthReporter, TestConfigLoader, Timeline,
};

struct BootstrapWorld {
    loader: Box<dyn ConfigLoader>,
    timeline: Timeline,
    outcome: Option<Result<Daemon, BootstrapError>>,
}

impl BootstrapWorld {
    fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader),
            timeline: Timeline::default(),
            outcome: None,
        }
    }

    fn bootstrap(&mut self) {
        let reporter = Arc::new(RecordingHealthReporter::new(self.timeline.clone()));
        self.outcome = Some(bootstrap_with(&*self.loader, reporter));
    }
}

#[fixture]
fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::new())
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().loader = Box::new(TestConfigLoader);
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().loader = Box::new(FailingConfigLoader);
}

#[when("the server bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<BootstrapWorld>) {
    let world = world.borrow();
    match world.outcome.as_ref() {
        Some(Ok(daemon)) => {
            assert_eq!(daemon.config().listen_port, 0);
            assert_eq!(daemon.telemetry().format(), LogFormat::Json);
        }
        Some(Err(error)) => panic!("bootstrap failed: {error}"),
        None => panic!("bootstrap did not run"),
    }
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<BootstrapWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.outcome,
            Some(Err(BootstrapError::Configuration { .. }))
        ),
        "bootstrap succeeded unexpectedly"
    );
}

#[then("the reporter recorded bootstrap start")]
fn then_reporter_start(world: &RefCell<BootstrapWorld>) {
    assert_eq!(
        world.borrow().timeline.events().first(),
        Some(&Event::BootstrapStarting)
    );
}

#[then("the reporter recorded bootstrap success")]
fn then_reporter_success(world: &RefCell<BootstrapWorld>) {
    assert_eq!(world.borrow().timeline.count(&Event::BootstrapSucceeded), 1);
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<BootstrapWorld>) {
    let events = world.borrow().timeline.events();
    let failed = events
        .iter()
        .any(|event| matches!(event, Event::BootstrapFailed(_)));
    assert!(failed, "bootstrap failure event missing: {events:?}");
}

#[scenario(path = "tests/features/server_bootstrap.feature", name = "Successful bootstrap")]
fn successful_bootstrap(#[from(world)] world: RefCell<BootstrapWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/server_bootstrap.feature", name = "Configuration failure")]
fn configuration_failure(#[from(world)] world: RefCell<BootstrapWorld>) {
    drop(world);
}
