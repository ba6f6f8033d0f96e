use super::breakpoints::BreakpointRegistry;
use super::console::{ConsoleBridge, ConsoleEntry};
use super::diff::ScopeDiffer;
use super::session::Session;
use super::snapshot::{FrameSummary, RenderedSnapshot};
use super::stepping::StepCommand;
use crate::config::DebuggerConfig;
use crate::engine::{
    Engine, EngineConfig, EngineEvent, EngineEventKind, EngineFactory, EventSink, Location,
    SessionId, Surface,
};
use crate::error::ControllerError;
use crate::files::{CodeFile, FileMode};
use crate::render::ValueRenderer;
use serde::Serialize;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Script name used for editor breakpoints when the session has no script.
pub const DEFAULT_SCRIPT: &str = "main.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No engine: the last reset failed.
    Idle,
    /// Fresh engine, nothing loaded.
    Ready,
    Loaded,
    Running,
    Paused,
}

/// Outward notifications for the hosting application.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Notification {
    Paused {
        line: Option<u32>,
        snapshot: RenderedSnapshot,
    },
    Resumed {
        line: Option<u32>,
    },
    Console {
        entry: ConsoleEntry,
    },
}

/// Drives one engine at a time through breakpointed runs.
pub struct DebugController<F: EngineFactory> {
    factory: F,
    config: DebuggerConfig,
    files: Vec<CodeFile>,
    breakpoints: BreakpointRegistry,
    renderer: ValueRenderer,
    differ: ScopeDiffer,
    console: ConsoleBridge,
    session: Option<Session<F::Engine>>,
    last_session_id: SessionId,
    state: SessionState,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    notifications: Sender<Notification>,
    last_snapshot: Option<RenderedSnapshot>,
}

impl<F: EngineFactory> DebugController<F> {
    /// Build a controller with its first session already standing, so the
    /// console can evaluate globally before anything is run.
    pub fn new(
        factory: F,
        files: Vec<CodeFile>,
        config: DebuggerConfig,
        notifications: Sender<Notification>,
    ) -> Result<Self, ControllerError> {
        let mut breakpoints = BreakpointRegistry::new();
        for file in &files {
            breakpoints.load_file(file);
        }
        let renderer = ValueRenderer::new(config.max_render_depth);
        let (events_tx, events_rx) = channel();

        let mut controller = Self {
            factory,
            config,
            files,
            breakpoints,
            renderer,
            differ: ScopeDiffer,
            console: ConsoleBridge::new(renderer),
            session: None,
            last_session_id: 0,
            state: SessionState::Idle,
            events_tx,
            events_rx,
            notifications,
            last_snapshot: None,
        };
        controller.reset()?;
        Ok(controller)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Step and resume controls are offered only while paused.
    pub fn controls_enabled(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(Session::id)
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.session.as_ref().map(Session::engine)
    }

    pub fn breakpoints(&self) -> &BreakpointRegistry {
        &self.breakpoints
    }

    pub fn console(&self) -> &ConsoleBridge {
        &self.console
    }

    pub fn files(&self) -> &[CodeFile] {
        &self.files
    }

    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    pub fn last_snapshot(&self) -> Option<&RenderedSnapshot> {
        self.last_snapshot.as_ref()
    }

    fn primary_file(&self) -> Option<&CodeFile> {
        match &self.config.primary_script {
            Some(name) => self.files.iter().find(|f| f.filename() == name),
            None => self
                .files
                .iter()
                .find(|f| f.mode() == Some(FileMode::JavaScript)),
        }
    }

    /// File that editor breakpoint events refer to.
    pub fn primary_filename(&self) -> String {
        if let Some(name) = &self.config.primary_script {
            return name.clone();
        }
        self.primary_file()
            .map(|f| f.filename().to_string())
            .unwrap_or_else(|| DEFAULT_SCRIPT.to_string())
    }

    /// Discard the current engine and stand up a fresh one with every known
    /// breakpoint registered.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        if let Some(old) = self.session.take() {
            tracing::info!(session = old.id(), "discarding debug session");
        }
        // Anything still queued belongs to the discarded engine.
        let stale = self.events_rx.try_iter().count();
        if stale > 0 {
            tracing::trace!(count = stale, "dropped events from discarded session");
        }
        self.state = SessionState::Idle;
        self.last_snapshot = None;

        self.last_session_id += 1;
        let id = self.last_session_id;
        let engine_config = EngineConfig {
            session: id,
            surface: Surface::for_session(id),
            events: EventSink::new(id, self.events_tx.clone()),
        };
        let mut engine = self
            .factory
            .create(engine_config)
            .map_err(|e| ControllerError::EngineConstruction {
                session: id,
                source: Box::new(e),
            })?;

        if let Some(document) = self.files.iter().find(|f| f.mode() == Some(FileMode::Html)) {
            engine.write_document(document.text());
        }

        let offset = self.config.engine_line_offset;
        for filename in self.breakpoints.files() {
            let lines = self.breakpoints.engine_lines(filename, offset);
            tracing::debug!(filename, ?lines, "registering breakpoints");
            engine.add_breakpoints(filename, &lines);
        }

        let mut session = Session::new(id, engine);
        let baseline = session.capture(&self.renderer);
        session.set_baseline(baseline);
        self.session = Some(session);
        self.state = SessionState::Ready;

        tracing::info!(session = id, "debug session ready");
        Ok(())
    }

    /// Reset, load the primary script and start it.
    pub fn load_and_run(&mut self) -> Result<(), ControllerError> {
        self.reset()?;

        let (filename, source) = match self.primary_file() {
            Some(file) => (file.filename().to_string(), file.text().to_string()),
            None => return Err(ControllerError::MissingScript(self.primary_filename())),
        };

        let loaded = match self.session.as_mut() {
            Some(session) => session.engine_mut().load(&source, &filename),
            None => return Ok(()),
        };
        if let Err(err) = loaded {
            tracing::warn!(%filename, error = %err, "script failed to load");
            self.report(err.into());
            return Ok(());
        }
        self.state = SessionState::Loaded;
        tracing::info!(%filename, "running script");

        if let Some(session) = self.session.as_mut() {
            session.engine_mut().run();
        }
        self.after_command();
        Ok(())
    }

    pub fn step(&mut self, command: StepCommand) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(?command, "no debug session, ignoring");
            return;
        };
        tracing::debug!(?command, session = session.id(), "forwarding to engine");
        if self.state == SessionState::Paused {
            self.handle_resume();
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let engine = session.engine_mut();
        match command {
            StepCommand::Resume => engine.run(),
            StepCommand::StepOver => engine.step_over(),
            StepCommand::StepIn => engine.step_in(),
            StepCommand::StepOut => engine.step_out(),
        }
        self.after_command();
    }

    pub fn resume(&mut self) {
        self.step(StepCommand::Resume);
    }

    pub fn step_over(&mut self) {
        self.step(StepCommand::StepOver);
    }

    pub fn step_in(&mut self) {
        self.step(StepCommand::StepIn);
    }

    pub fn step_out(&mut self) {
        self.step(StepCommand::StepOut);
    }

    /// Enable a breakpoint on an editor line of the primary script. Returns
    /// whether the breakpoint set changed. A line with no engine counterpart
    /// is rejected and leaves the registry untouched.
    pub fn add_breakpoint(&mut self, line: u32) -> Result<bool, ControllerError> {
        let offset = self.config.engine_line_offset;
        let Some(engine_line) = line.checked_add(offset) else {
            tracing::warn!(line, offset, "breakpoint line out of range");
            return Err(ControllerError::LineOutOfRange { line, offset });
        };
        let filename = self.primary_filename();
        if !self.breakpoints.add(&filename, line) {
            return Ok(false);
        }
        if let Some(session) = self.session.as_mut() {
            session.engine_mut().add_breakpoints(&filename, &[engine_line]);
        }
        Ok(true)
    }

    /// Returns whether the breakpoint set changed.
    pub fn remove_breakpoint(&mut self, line: u32) -> bool {
        let filename = self.primary_filename();
        if !self.breakpoints.remove(&filename, line) {
            return false;
        }
        let engine_line = line.checked_add(self.config.engine_line_offset);
        if let (Some(engine_line), Some(session)) = (engine_line, self.session.as_mut()) {
            session
                .engine_mut()
                .remove_breakpoints(&filename, &[engine_line]);
        }
        true
    }

    /// Evaluate a console command against the paused frame or the global context.
    pub fn evaluate(&mut self, text: &str) -> ConsoleEntry {
        let engine = self.session.as_mut().map(Session::engine_mut);
        self.console.evaluate(engine, text)
    }

    /// Handle queued engine events. Returns how many pauses were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut pauses = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.session_id() != Some(event.session) {
                tracing::trace!(session = event.session, "ignoring event from stale session");
                continue;
            }
            match event.kind {
                EngineEventKind::Breakpoint => {
                    self.handle_pause();
                    pauses += 1;
                }
                EngineEventKind::Error(err) => {
                    tracing::warn!(error = %err, "uncaught error in debuggee");
                    self.report(err.into());
                }
                EngineEventKind::Console(text) => self.report(ConsoleEntry::Log { text }),
            }
        }
        pauses
    }

    /// Settle outward state after a request: handle the events it produced,
    /// or re-derive the state from the engine when none arrived yet.
    fn after_command(&mut self) {
        if self.pump_events() > 0 {
            return;
        }
        let paused = match &self.session {
            Some(session) => session.engine().is_paused(),
            None => return,
        };
        if paused {
            self.handle_pause();
        } else {
            self.handle_resume();
        }
    }

    fn handle_pause(&mut self) {
        let offset = self.config.engine_line_offset;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let captured = session.capture(&self.renderer);
        let scope = captured
            .last()
            .map(|top| self.differ.diff(top, session.baseline_top()));
        let stack = captured
            .iter()
            .map(|frame| FrameSummary {
                name: frame.name.clone(),
                filename: frame.filename.clone(),
            })
            .collect();
        let line = editor_line(session.engine().current_location(), offset);
        session.set_baseline(captured);

        self.state = SessionState::Paused;
        let snapshot = RenderedSnapshot { stack, scope, line };
        tracing::debug!(?line, frames = snapshot.stack.len(), "paused");
        self.last_snapshot = Some(snapshot.clone());
        self.notify(Notification::Paused { line, snapshot });
    }

    /// Announce a transition into `Running`. Steps issued while ready or
    /// after the program ran off its end change nothing and stay silent.
    fn handle_resume(&mut self) {
        if !matches!(self.state, SessionState::Paused | SessionState::Loaded) {
            return;
        }
        let offset = self.config.engine_line_offset;
        let line = self
            .session
            .as_ref()
            .and_then(|s| editor_line(s.engine().current_location(), offset));
        self.state = SessionState::Running;
        tracing::debug!(?line, "resumed");
        self.notify(Notification::Resumed { line });
    }

    fn report(&mut self, entry: ConsoleEntry) {
        self.console.record(entry.clone());
        self.notify(Notification::Console { entry });
    }

    fn notify(&self, notification: Notification) {
        // A host that dropped its receiver is no longer listening.
        let _ = self.notifications.send(notification);
    }
}

fn editor_line(location: Option<Location>, offset: u32) -> Option<u32> {
    location.and_then(|loc| loc.line.checked_sub(offset))
}
