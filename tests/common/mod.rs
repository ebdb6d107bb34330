//! Shared test doubles: a scripted engine stub and session wiring helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrome_dap::cdp::{
    BreakpointSpot, EngineEvent, EvaluateOutcome, Location, PropertyDescriptor, RemoteObject,
};
use chrome_dap::client::ClientEvent;
use chrome_dap::engine::{EngineClient, PauseOnExceptions};
use chrome_dap::error::{Error, Result};
use chrome_dap::format::BasicFormatter;
use chrome_dap::process::ProcessLauncher;
use chrome_dap::session::{AttachConfig, Session, SessionConfig};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Scripted in-memory engine. Commands append to a call log so tests can
/// assert on ordering; responses come from the scripted tables below.
pub struct StubEngine {
    next_breakpoint: AtomicU64,
    /// Flat command log, one entry per engine call
    pub log: Mutex<Vec<String>>,
    /// Engine (0-based) lines whose breakpoint installation is rejected
    rejected_lines: Mutex<HashSet<u32>>,
    /// Scripted property enumerations, keyed by
    /// `"{object_id}:{own}:{accessor}"`
    properties: Mutex<HashMap<String, Vec<PropertyDescriptor>>>,
    /// Scripted script sources by script id
    sources: Mutex<HashMap<String, String>>,
    /// Scripted evaluate outcomes by expression
    evaluations: Mutex<HashMap<String, EvaluateOutcome>>,
    /// Artificial latency applied to breakpoint add/remove calls
    breakpoint_delay: Mutex<Option<Duration>>,
    events_tx: Mutex<Option<mpsc::Sender<EngineEvent>>>,
}

impl Default for StubEngine {
    fn default() -> Self {
        Self {
            next_breakpoint: AtomicU64::new(1),
            log: Mutex::new(Vec::new()),
            rejected_lines: Mutex::new(HashSet::new()),
            properties: Mutex::new(HashMap::new()),
            sources: Mutex::new(HashMap::new()),
            evaluations: Mutex::new(HashMap::new()),
            breakpoint_delay: Mutex::new(None),
            events_tx: Mutex::new(None),
        }
    }
}

impl StubEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject breakpoint installation at an engine (0-based) line
    pub fn reject_line(&self, line: u32) {
        self.rejected_lines.lock().unwrap().insert(line);
    }

    /// Script the property enumeration for one object id and call shape
    pub fn script_properties(
        &self,
        object_id: &str,
        own: bool,
        accessor: bool,
        props: Vec<PropertyDescriptor>,
    ) {
        let key = format!("{}:{}:{}", object_id, own, accessor);
        self.properties.lock().unwrap().insert(key, props);
    }

    pub fn script_source(&self, script_id: &str, source: &str) {
        self.sources
            .lock()
            .unwrap()
            .insert(script_id.to_string(), source.to_string());
    }

    pub fn script_evaluation(&self, expression: &str, outcome: EvaluateOutcome) {
        self.evaluations
            .lock()
            .unwrap()
            .insert(expression.to_string(), outcome);
    }

    pub fn set_breakpoint_delay(&self, delay: Duration) {
        *self.breakpoint_delay.lock().unwrap() = Some(delay);
    }

    /// Push an engine notification into the session's event pump
    pub async fn push_event(&self, event: EngineEvent) {
        let tx = self
            .events_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no event subscription; attach the session first");
        tx.send(event).await.expect("event pump dropped");
    }

    pub fn logged(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    async fn breakpoint_latency(&self) {
        let delay = *self.breakpoint_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn spot(&self, script_id: &str, line: u32, column: u32) -> BreakpointSpot {
        let id = self.next_breakpoint.fetch_add(1, Ordering::SeqCst);
        BreakpointSpot {
            breakpoint_id: format!("bp-{}", id),
            actual_location: Some(Location {
                script_id: script_id.to_string(),
                line_number: line,
                column_number: Some(column),
            }),
        }
    }
}

#[async_trait]
impl EngineClient for StubEngine {
    async fn connect(&self, address: &str, port: u16) -> Result<()> {
        self.record(format!("connect {}:{}", address, port));
        Ok(())
    }

    async fn enable_debugger(&self) -> Result<()> {
        self.record("enable_debugger".to_string());
        Ok(())
    }

    async fn enable_runtime(&self) -> Result<()> {
        self.record("enable_runtime".to_string());
        Ok(())
    }

    async fn set_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: u32,
    ) -> Result<BreakpointSpot> {
        self.breakpoint_latency().await;
        self.record(format!("add {} {}", url, line));
        if self.rejected_lines.lock().unwrap().contains(&line) {
            return Err(Error::EngineRejected(format!(
                "no statement at line {}",
                line
            )));
        }
        Ok(self.spot("1", line, column))
    }

    async fn set_breakpoint(
        &self,
        script_id: &str,
        line: u32,
        column: u32,
    ) -> Result<BreakpointSpot> {
        self.breakpoint_latency().await;
        self.record(format!("add-raw {} {}", script_id, line));
        if self.rejected_lines.lock().unwrap().contains(&line) {
            return Err(Error::EngineRejected(format!(
                "no statement at line {}",
                line
            )));
        }
        Ok(self.spot(script_id, line, column))
    }

    async fn remove_breakpoint(&self, breakpoint_id: &str) -> Result<()> {
        self.breakpoint_latency().await;
        self.record(format!("remove {}", breakpoint_id));
        Ok(())
    }

    async fn set_pause_on_exceptions(&self, state: PauseOnExceptions) -> Result<()> {
        self.record(format!("pause_on_exceptions {:?}", state));
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.record("resume".to_string());
        Ok(())
    }

    async fn step_over(&self) -> Result<()> {
        self.record("step_over".to_string());
        Ok(())
    }

    async fn step_into(&self) -> Result<()> {
        self.record("step_into".to_string());
        Ok(())
    }

    async fn step_out(&self) -> Result<()> {
        self.record("step_out".to_string());
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record("pause".to_string());
        Ok(())
    }

    async fn get_script_source(&self, script_id: &str) -> Result<String> {
        self.record(format!("get_source {}", script_id));
        self.sources
            .lock()
            .unwrap()
            .get(script_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("script {}", script_id)))
    }

    async fn get_properties(
        &self,
        object_id: &str,
        own_properties: bool,
        accessor_properties_only: bool,
    ) -> Result<Vec<PropertyDescriptor>> {
        self.record(format!(
            "get_properties {} own={} accessor={}",
            object_id, own_properties, accessor_properties_only
        ));
        let key = format!(
            "{}:{}:{}",
            object_id, own_properties, accessor_properties_only
        );
        Ok(self
            .properties
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn evaluate(&self, expression: &str) -> Result<EvaluateOutcome> {
        self.record(format!("evaluate {}", expression));
        Ok(self.scripted_outcome(expression))
    }

    async fn evaluate_on_call_frame(
        &self,
        call_frame_id: &str,
        expression: &str,
    ) -> Result<EvaluateOutcome> {
        self.record(format!("evaluate_on_frame {} {}", call_frame_id, expression));
        Ok(self.scripted_outcome(expression))
    }

    async fn set_overlay_message(&self, message: Option<&str>) -> Result<()> {
        self.record(format!("overlay {:?}", message));
        Ok(())
    }

    async fn subscribe_events(&self) -> mpsc::Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel(64);
        *self.events_tx.lock().unwrap() = Some(tx);
        rx
    }
}

impl StubEngine {
    fn scripted_outcome(&self, expression: &str) -> EvaluateOutcome {
        self.evaluations
            .lock()
            .unwrap()
            .get(expression)
            .cloned()
            .unwrap_or_else(|| EvaluateOutcome {
                result: RemoteObject::primitive(
                    "string",
                    serde_json::Value::String(expression.to_string()),
                ),
                exception_details: None,
            })
    }
}

/// Launcher that records the command line instead of spawning anything
#[derive(Default)]
pub struct RecordingLauncher {
    pub launches: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn launch(&self, executable: &Path, args: &[String]) -> Result<()> {
        self.launches
            .lock()
            .unwrap()
            .push((executable.display().to_string(), args.to_vec()));
        Ok(())
    }
}

/// A session wired to a stub engine, not yet attached
pub fn build_session(engine: Arc<StubEngine>) -> (Session, mpsc::UnboundedReceiver<ClientEvent>) {
    build_session_with(engine, Arc::new(RecordingLauncher::default()), test_config())
}

pub fn build_session_with(
    engine: Arc<StubEngine>,
    launcher: Arc<dyn ProcessLauncher>,
    config: SessionConfig,
) -> (Session, mpsc::UnboundedReceiver<ClientEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(
        engine,
        launcher,
        tx,
        Arc::new(BasicFormatter),
        Arc::new(BasicFormatter),
        config,
    );
    (session, rx)
}

/// Short timeouts and a near-zero overlay window keep tests fast
pub fn test_config() -> SessionConfig {
    SessionConfig {
        breakpoint_timeout: Duration::from_millis(500),
        overlay_debounce: Duration::from_millis(1),
    }
}

/// Attach a freshly built session and consume the Initialized event
pub async fn attached_session(
    engine: Arc<StubEngine>,
) -> (Session, mpsc::UnboundedReceiver<ClientEvent>) {
    let (session, mut rx) = build_session(engine);
    session.initialize().await;
    session
        .attach(AttachConfig {
            port: Some(9222),
            ..Default::default()
        })
        .await
        .expect("attach failed");
    assert_eq!(recv_event(&mut rx).await, ClientEvent::Initialized);
    (session, rx)
}

/// Receive one client event, failing the test on a 1s stall
pub async fn recv_event(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("client event channel closed")
}
