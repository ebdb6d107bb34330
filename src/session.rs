//! Debug session orchestration
//!
//! Wires the script registry, breakpoint reconciler, object reference table,
//! and execution tracker to the engine's event stream, and exposes the
//! client-facing operation set. One `Session` per debugging session; all
//! mutable state lives in a single `SessionState` behind one async lock so
//! client requests and engine events share a serialized timeline.

use crate::breakpoints::BreakpointReconciler;
use crate::cdp::{ConsoleApiParams, EngineEvent, PausedParams, ScriptParsedParams};
use crate::client::{emit, ClientEvent, ClientEventSender};
use crate::constants::{defaults, output_categories, SCRIPT_MIME_TYPE};
use crate::dap::{
    Breakpoint, Capabilities, EvaluateResult, ExceptionBreakpointsFilter, Scope, Source,
    SourceBreakpoint, SourceContent, StackFrame, Thread, Variable,
};
use crate::engine::{EngineClient, PauseOnExceptions};
use crate::error::{Error, Result};
use crate::execution::{ExecutionTracker, OverlayDebouncer};
use crate::format::{ConsoleFormatter, ValueFormatter};
use crate::handles::{HandleTable, ObjectHandle};
use crate::process::ProcessLauncher;
use crate::scripts::{placeholder_url, ScriptRegistry};
use crate::translate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

// ============================================================
// CONFIGURATION
// ============================================================

/// Session-level tunables
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on one breakpoint reconciliation
    pub breakpoint_timeout: Duration,
    /// Debounce window for the paused overlay
    pub overlay_debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            breakpoint_timeout: Duration::from_millis(defaults::BREAKPOINT_TIMEOUT_MS),
            overlay_debounce: Duration::from_millis(defaults::OVERLAY_DEBOUNCE_MS),
        }
    }
}

/// Arguments for launching the engine host before attaching
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Engine host executable; launch fails without one
    pub runtime_executable: Option<PathBuf>,
    /// Extra arguments passed to the host process
    pub runtime_args: Vec<String>,
    /// Profile directory for the host process
    pub user_data_dir: Option<PathBuf>,
    /// Target page URL to open
    pub url: Option<String>,
    /// Local file to open instead of a URL
    pub file: Option<PathBuf>,
    /// Remote-debugging port the host will listen on
    pub port: u16,
    /// Bind address of the remote-debugging endpoint
    pub address: String,
    /// Request verbose diagnostic logging from the host
    pub verbose_diagnostics: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime_executable: None,
            runtime_args: Vec::new(),
            user_data_dir: None,
            url: None,
            file: None,
            port: defaults::REMOTE_DEBUGGING_PORT,
            address: defaults::BIND_ADDRESS.to_string(),
            verbose_diagnostics: false,
        }
    }
}

impl LaunchConfig {
    /// Command-line arguments for the engine host process
    fn host_args(&self) -> Vec<String> {
        let mut args = vec![format!("--remote-debugging-port={}", self.port)];
        if let Some(dir) = &self.user_data_dir {
            args.push(format!("--user-data-dir={}", dir.display()));
        }
        if self.verbose_diagnostics {
            args.push("--enable-logging".to_string());
        }
        args.extend(self.runtime_args.iter().cloned());
        if let Some(url) = &self.url {
            args.push(url.clone());
        } else if let Some(file) = &self.file {
            args.push(file.display().to_string());
        }
        args
    }
}

/// Arguments for attaching to an already-running engine host
#[derive(Debug, Clone)]
pub struct AttachConfig {
    /// Remote-debugging port; required
    pub port: Option<u16>,
    /// Bind address of the remote-debugging endpoint
    pub address: String,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            port: None,
            address: defaults::BIND_ADDRESS.to_string(),
        }
    }
}

// ============================================================
// SESSION STATE
// ============================================================

/// All mutable per-session state, guarded by one lock
#[derive(Default)]
struct SessionState {
    client_attached: bool,
    engine_attached: bool,
    scripts: ScriptRegistry,
    handles: HandleTable,
    execution: ExecutionTracker,
    overlay: OverlayDebouncer,
    exception_filter: PauseOnExceptions,
}

impl SessionState {
    /// Wholesale teardown of target-derived state
    fn reset_target_state(&mut self) {
        self.scripts.reset();
        self.handles.reset();
        self.execution.reset();
        self.overlay.cancel();
    }
}

// ============================================================
// SESSION
// ============================================================

/// One debugging session bridging a client transport and a remote engine
pub struct Session {
    engine: Arc<dyn EngineClient>,
    launcher: Arc<dyn ProcessLauncher>,
    client_tx: ClientEventSender,
    value_formatter: Arc<dyn ValueFormatter>,
    console_formatter: Arc<dyn ConsoleFormatter>,
    config: SessionConfig,
    state: Arc<Mutex<SessionState>>,
    reconciler: Arc<BreakpointReconciler>,
    pump: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Session {
    pub fn new(
        engine: Arc<dyn EngineClient>,
        launcher: Arc<dyn ProcessLauncher>,
        client_tx: ClientEventSender,
        value_formatter: Arc<dyn ValueFormatter>,
        console_formatter: Arc<dyn ConsoleFormatter>,
        config: SessionConfig,
    ) -> Self {
        let reconciler = Arc::new(BreakpointReconciler::new(config.breakpoint_timeout));
        Self {
            engine,
            launcher,
            client_tx,
            value_formatter,
            console_formatter,
            config,
            state: Arc::new(Mutex::new(SessionState::default())),
            reconciler,
            pump: Mutex::new(None),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Handle the client's initialize request: mark the client attached and
    /// report capabilities, including the two exception filter options.
    pub async fn initialize(&self) -> Capabilities {
        self.state.lock().await.client_attached = true;
        Capabilities {
            supports_configuration_done_request: Some(true),
            supports_evaluate_for_hovers: Some(true),
            exception_breakpoint_filters: vec![
                ExceptionBreakpointsFilter {
                    filter: "all".to_string(),
                    label: "All Exceptions".to_string(),
                    default: false,
                },
                ExceptionBreakpointsFilter {
                    filter: "uncaught".to_string(),
                    label: "Uncaught Exceptions".to_string(),
                    default: true,
                },
            ],
            ..Default::default()
        }
    }

    /// Start the engine host detached, then attach to its debugging port
    pub async fn launch(&self, config: LaunchConfig) -> Result<()> {
        let executable = config.runtime_executable.clone().ok_or_else(|| {
            Error::Configuration("No launchable executable found".to_string())
        })?;

        self.launcher.launch(&executable, &config.host_args()).await?;
        self.attach_to_engine(&config.address, config.port).await
    }

    /// Attach to an already-running engine host
    pub async fn attach(&self, config: AttachConfig) -> Result<()> {
        let port = config.port.ok_or_else(|| {
            Error::Configuration("Missing required port on attach".to_string())
        })?;
        self.attach_to_engine(&config.address, port).await
    }

    async fn attach_to_engine(&self, address: &str, port: u16) -> Result<()> {
        info!("Attaching to engine at {}:{}", address, port);
        self.engine.connect(address, port).await?;
        self.engine.enable_debugger().await?;
        self.engine.enable_runtime().await?;

        let filter = self.state.lock().await.exception_filter;
        self.engine.set_pause_on_exceptions(filter).await?;

        let events = self.engine.subscribe_events().await;
        let pump = EventPump {
            state: Arc::clone(&self.state),
            engine: Arc::clone(&self.engine),
            client_tx: self.client_tx.clone(),
            reconciler: Arc::clone(&self.reconciler),
            console_formatter: Arc::clone(&self.console_formatter),
            config: self.config.clone(),
        };
        *self.pump.lock().await = Some(tokio::spawn(pump.run(events)));

        self.state.lock().await.engine_attached = true;
        emit(&self.client_tx, ClientEvent::Initialized);
        Ok(())
    }

    /// Detach from the engine and discard all session state
    pub async fn disconnect(&self) {
        info!("Disconnecting session");
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }

        let mut state = self.state.lock().await;
        state.client_attached = false;
        state.engine_attached = false;
        state.reset_target_state();
        drop(state);

        self.reconciler.reset().await;
        emit(&self.client_tx, ClientEvent::ClearClientContext);
    }

    // ========================================================================
    // Breakpoints
    // ========================================================================

    /// Replace all breakpoints of one source. Rows correspond positionally
    /// to the request; failed lines come back unverified at their requested
    /// location rather than silently dropped.
    pub async fn set_breakpoints(
        &self,
        source: &Source,
        breakpoints: &[SourceBreakpoint],
    ) -> Result<Vec<Breakpoint>> {
        let url = match (&source.path, source.source_reference) {
            (Some(path), _) => path.clone(),
            (None, Some(reference)) => {
                placeholder_url(&translate::source_reference_to_script_id(reference))
            }
            (None, None) => {
                return Err(Error::NotFound(
                    "Source has no addressable path or reference".to_string(),
                ))
            }
        };

        self.reconciler
            .set_breakpoints(Arc::clone(&self.engine), &url, breakpoints)
            .await
    }

    /// Map the client's exception filters onto the engine's pause state
    pub async fn set_exception_breakpoints(&self, filters: &[String]) -> Result<()> {
        let filter = if filters.iter().any(|f| f == "all") {
            PauseOnExceptions::All
        } else if filters.iter().any(|f| f == "uncaught") {
            PauseOnExceptions::Uncaught
        } else {
            PauseOnExceptions::None
        };

        self.state.lock().await.exception_filter = filter;
        self.engine.set_pause_on_exceptions(filter).await
    }

    /// Function breakpoints are accepted but unsupported: definite success,
    /// no effect.
    pub async fn set_function_breakpoints(&self) -> Result<()> {
        debug!("Function breakpoints are not supported; accepting as no-op");
        Ok(())
    }

    /// Engine breakpoint ids currently committed for a source URL
    pub async fn committed_breakpoints(&self, url: &str) -> Vec<String> {
        self.reconciler.committed_ids(url).await
    }

    // ========================================================================
    // Execution control
    // ========================================================================

    pub async fn continue_execution(&self) -> Result<()> {
        self.state.lock().await.execution.mark_adapter_resume();
        self.engine.resume().await
    }

    pub async fn next(&self) -> Result<()> {
        self.state.lock().await.execution.mark_adapter_resume();
        self.engine.step_over().await
    }

    pub async fn step_in(&self) -> Result<()> {
        self.state.lock().await.execution.mark_adapter_resume();
        self.engine.step_into().await
    }

    pub async fn step_out(&self) -> Result<()> {
        self.state.lock().await.execution.mark_adapter_resume();
        self.engine.step_out().await
    }

    pub async fn pause(&self) -> Result<()> {
        self.engine.pause().await
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// The current call stack, truncated to `levels` frames when given
    pub async fn stack_trace(&self, levels: Option<usize>) -> Result<Vec<StackFrame>> {
        let state = self.state.lock().await;
        let frames = state
            .execution
            .frames()
            .ok_or_else(|| Error::NotFound("No call stack: target is running".to_string()))?;
        Ok(translate::stack_trace(&state.scripts, frames, levels))
    }

    /// Scopes of one paused frame, each behind a fresh handle
    pub async fn scopes(&self, frame_id: i64) -> Result<Vec<Scope>> {
        let mut state = self.state.lock().await;
        let frame = state
            .execution
            .frames()
            .and_then(|frames| frames.get(frame_id as usize))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Unknown frame id {}", frame_id)))?;
        Ok(translate::scopes(&mut state.handles, &frame))
    }

    /// Contents of a handle: the reserved exception handle synthesizes its
    /// single pseudo-variable; everything else is fetched from the engine in
    /// two property passes (accessor-only, then own) merged by name.
    pub async fn variables(&self, reference: i64) -> Result<Vec<Variable>> {
        if HandleTable::is_exception_handle(reference) {
            let mut state = self.state.lock().await;
            let value = state
                .execution
                .take_exception_value()
                .ok_or_else(|| Error::NotFound("Object reference not found".to_string()))?;
            let variable = translate::exception_variable(
                &mut state.handles,
                self.value_formatter.as_ref(),
                &value,
            );
            return Ok(vec![variable]);
        }

        let handle = {
            let state = self.state.lock().await;
            state
                .handles
                .resolve(reference)
                .cloned()
                .ok_or_else(|| Error::NotFound("Object reference not found".to_string()))?
        };

        // Two distinct enumeration passes; the protocol exposes accessors
        // and own properties through separate calls.
        let (accessors, own) = tokio::join!(
            self.engine.get_properties(&handle.object_id, false, true),
            self.engine.get_properties(&handle.object_id, true, false),
        );
        let merged = translate::merge_properties(accessors?, own?);

        let mut state = self.state.lock().await;
        Ok(translate::variables_from_properties(
            &mut state.handles,
            self.value_formatter.as_ref(),
            merged,
            handle.this_object.as_ref(),
        ))
    }

    /// Fetch script content for a source reference issued by `stack_trace`
    pub async fn source(&self, source_reference: i64) -> Result<SourceContent> {
        let script_id = translate::source_reference_to_script_id(source_reference);
        {
            let state = self.state.lock().await;
            if state.scripts.lookup_by_id(&script_id).is_none() {
                return Err(Error::NotFound(format!(
                    "No script with source reference {}",
                    source_reference
                )));
            }
        }

        let content = self.engine.get_script_source(&script_id).await?;
        Ok(SourceContent {
            content,
            mime_type: SCRIPT_MIME_TYPE.to_string(),
        })
    }

    /// Always exactly one synthetic thread
    pub async fn threads(&self) -> Vec<Thread> {
        vec![Thread {
            id: defaults::THREAD_ID,
            name: "Thread 1".to_string(),
        }]
    }

    /// Evaluate an expression in a paused frame's context when one is
    /// addressable, otherwise in the global context. An exception inside
    /// the target surfaces as a failure carrying its description.
    pub async fn evaluate(
        &self,
        expression: &str,
        frame_id: Option<i64>,
    ) -> Result<EvaluateResult> {
        let call_frame_id = {
            let state = self.state.lock().await;
            frame_id.and_then(|id| {
                state
                    .execution
                    .frames()
                    .and_then(|frames| frames.get(id as usize))
                    .map(|frame| frame.call_frame_id.clone())
            })
        };

        let outcome = match call_frame_id {
            Some(id) => self.engine.evaluate_on_call_frame(&id, expression).await?,
            None => self.engine.evaluate(expression).await?,
        };

        if let Some(details) = outcome.exception_details {
            return Err(Error::Evaluation(details.text));
        }

        let rendered = self.value_formatter.render(&outcome.result);
        let reference = match rendered.reference {
            Some(object_id) => {
                let mut state = self.state.lock().await;
                state.handles.create(ObjectHandle::new(object_id))
            }
            None => 0,
        };

        Ok(EvaluateResult {
            result: rendered.display,
            variables_reference: reference,
        })
    }
}

// ============================================================
// ENGINE EVENT PUMP
// ============================================================

/// Holds the clones the spawned event task needs
struct EventPump {
    state: Arc<Mutex<SessionState>>,
    engine: Arc<dyn EngineClient>,
    client_tx: ClientEventSender,
    reconciler: Arc<BreakpointReconciler>,
    console_formatter: Arc<dyn ConsoleFormatter>,
    config: SessionConfig,
}

impl EventPump {
    async fn run(self, mut events: mpsc::Receiver<EngineEvent>) {
        debug!("Engine event pump started");
        while let Some(event) = events.recv().await {
            let done = match event {
                EngineEvent::Paused(params) => {
                    self.on_paused(params).await;
                    false
                }
                EngineEvent::Resumed => {
                    self.on_resumed().await;
                    false
                }
                EngineEvent::ScriptParsed(params) => {
                    self.on_script_parsed(params).await;
                    false
                }
                EngineEvent::BreakpointResolved(params) => {
                    debug!(
                        "Breakpoint {} resolved at {}:{}",
                        params.breakpoint_id,
                        params.location.script_id,
                        params.location.line_number
                    );
                    false
                }
                EngineEvent::GlobalObjectCleared => {
                    self.on_global_object_cleared().await;
                    false
                }
                EngineEvent::ConsoleApiCalled(params) => {
                    self.on_console(params).await;
                    false
                }
                EngineEvent::Detached(reason) => {
                    warn!("Engine detached: {}", reason);
                    true
                }
                EngineEvent::Closed => {
                    info!("Engine connection closed");
                    true
                }
                EngineEvent::Errored(error) => {
                    warn!("Engine connection errored: {}", error);
                    true
                }
            };

            if done {
                self.teardown().await;
                break;
            }
        }
        debug!("Engine event pump ended");
    }

    async fn on_paused(&self, params: PausedParams) {
        let mut state = self.state.lock().await;
        let summary = state.execution.on_paused(params);
        state.overlay.request(
            Arc::clone(&self.engine),
            true,
            self.config.overlay_debounce,
        );
        drop(state);

        emit(
            &self.client_tx,
            ClientEvent::Stopped {
                reason: summary.reason.to_string(),
                thread_id: defaults::THREAD_ID,
                text: summary.text,
            },
        );
    }

    async fn on_resumed(&self) {
        let mut state = self.state.lock().await;
        let announce = state.execution.on_resumed();
        state.overlay.request(
            Arc::clone(&self.engine),
            false,
            self.config.overlay_debounce,
        );
        drop(state);

        if announce {
            emit(
                &self.client_tx,
                ClientEvent::Continued {
                    thread_id: defaults::THREAD_ID,
                },
            );
        }
    }

    async fn on_script_parsed(&self, params: ScriptParsedParams) {
        let mut state = self.state.lock().await;
        let descriptor = state.scripts.record_parsed(params);
        let announce = !state.scripts.should_ignore(&descriptor);
        drop(state);

        if announce {
            emit(
                &self.client_tx,
                ClientEvent::ScriptParsed {
                    url: descriptor.url.clone(),
                    source_map_url: descriptor.source_map_url.clone(),
                },
            );
        }
    }

    /// The engine's global object was cleared: every script id, object
    /// reference, and breakpoint commitment issued before this point is now
    /// invalid.
    async fn on_global_object_cleared(&self) {
        info!("Engine global object cleared; resetting target state");
        self.state.lock().await.reset_target_state();
        self.reconciler.reset().await;
        emit(&self.client_tx, ClientEvent::ClearTargetContext);
    }

    async fn on_console(&self, params: ConsoleApiParams) {
        let message = self.console_formatter.format(&params);
        let category = if message.is_error {
            output_categories::STDERR
        } else {
            output_categories::CONSOLE
        };
        emit(
            &self.client_tx,
            ClientEvent::Output {
                text: message.text,
                category: category.to_string(),
            },
        );
    }

    /// Connection-lost teardown: clear all in-memory state and notify the
    /// client of termination if it was attached. No reconnection is
    /// attempted anywhere in this subsystem.
    async fn teardown(&self) {
        let mut state = self.state.lock().await;
        let notify = state.client_attached;
        state.engine_attached = false;
        state.reset_target_state();
        drop(state);

        self.reconciler.reset().await;
        if notify {
            emit(&self.client_tx, ClientEvent::Terminated);
        }
    }
}
