// Scripted engine used by the integration tests. A program is a fixed trace of
// execution points; running walks the trace until a breakpoint or step target.
#![allow(dead_code)]

use devtools_debugger::debugger::{DebugController, Notification};
use devtools_debugger::engine::{
    Engine, EngineConfig, EngineFactory, EventSink, FrameScope, Location, StackFrame, StackOrder,
    Variable,
};
use devtools_debugger::error::ScriptError;
use devtools_debugger::files::CodeFile;
use devtools_debugger::value::Value;
use devtools_debugger::DebuggerConfig;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};

/// Marker that makes `load` fail with a syntax error.
pub const SYNTAX_ERROR_MARKER: &str = "@@";

#[derive(Debug, Clone)]
pub struct FakeFrame {
    pub name: String,
    pub filename: String,
    pub vars: Vec<(String, Value)>,
}

pub fn frame(name: &str, filename: &str, vars: Vec<(&str, Value)>) -> FakeFrame {
    FakeFrame {
        name: name.to_string(),
        filename: filename.to_string(),
        vars: vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

/// One execution point, in engine line numbering. Frames are outermost first.
#[derive(Debug, Clone)]
pub struct TracePoint {
    pub line: u32,
    pub frames: Vec<FakeFrame>,
    pub output: Option<String>,
}

pub fn point(line: u32, frames: Vec<FakeFrame>) -> TracePoint {
    TracePoint {
        line,
        frames,
        output: None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub trace: Vec<TracePoint>,
    pub globals: Vec<(String, Value)>,
    /// Thrown after the last trace point.
    pub uncaught: Option<ScriptError>,
}

/// Everything the engines built by one factory observed.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub created: usize,
    pub sinks: Vec<EventSink>,
    pub documents: Vec<String>,
    pub loaded: Vec<String>,
    /// Breakpoints of the most recently created engine, in engine lines.
    pub breakpoints: BTreeMap<String, BTreeSet<u32>>,
    pub calls: Vec<&'static str>,
}

pub type SharedLog = Rc<RefCell<EngineLog>>;

pub struct FakeEngine {
    program: Program,
    order: StackOrder,
    events: EventSink,
    log: SharedLog,
    loaded: Option<String>,
    position: Option<usize>,
}

impl FakeEngine {
    fn current(&self) -> Option<&TracePoint> {
        self.position.and_then(|i| self.program.trace.get(i))
    }

    fn depth(&self) -> usize {
        self.current().map_or(0, |p| p.frames.len())
    }

    fn hits_breakpoint(&self, point: &TracePoint) -> bool {
        let filename = point
            .frames
            .last()
            .map(|f| f.filename.as_str())
            .or(self.loaded.as_deref())
            .unwrap_or_default();
        self.log
            .borrow()
            .breakpoints
            .get(filename)
            .is_some_and(|lines| lines.contains(&point.line))
    }

    fn advance(&mut self, start: usize, stop: impl Fn(&TracePoint) -> bool) {
        for i in start..self.program.trace.len() {
            let point = &self.program.trace[i];
            if let Some(text) = &point.output {
                self.events.console(text.clone());
            }
            if stop(point) || self.hits_breakpoint(point) {
                self.position = Some(i);
                self.events.breakpoint();
                return;
            }
        }
        self.position = None;
        if let Some(err) = self.program.uncaught.clone() {
            self.events.error(err);
        }
    }

    fn next_index(&self) -> Option<usize> {
        self.position.map(|i| i + 1)
    }

    fn stack_frame(&self, fake: &FakeFrame) -> StackFrame {
        let scope = fake
            .vars
            .iter()
            .map(|(name, value)| Variable::new(name.clone(), value.clone()))
            .collect();
        let eval = FakeScope {
            locals: fake.vars.clone(),
            globals: self.program.globals.clone(),
        };
        StackFrame::new(fake.name.clone(), fake.filename.clone(), scope, Rc::new(eval))
    }

    fn record(&self, call: &'static str) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl Engine for FakeEngine {
    fn write_document(&mut self, markup: &str) {
        self.log.borrow_mut().documents.push(markup.to_string());
    }

    fn load(&mut self, source: &str, filename: &str) -> Result<(), ScriptError> {
        if source.contains(SYNTAX_ERROR_MARKER) {
            return Err(ScriptError::new("SyntaxError", "Invalid or unexpected token"));
        }
        self.loaded = Some(filename.to_string());
        self.log.borrow_mut().loaded.push(filename.to_string());
        Ok(())
    }

    fn run(&mut self) {
        self.record("run");
        if self.loaded.is_none() {
            return;
        }
        let start = self.next_index().unwrap_or(0);
        self.advance(start, |_| false);
    }

    fn step_in(&mut self) {
        self.record("step_in");
        if let Some(start) = self.next_index() {
            self.advance(start, |_| true);
        }
    }

    fn step_out(&mut self) {
        self.record("step_out");
        let depth = self.depth();
        if let Some(start) = self.next_index() {
            self.advance(start, move |p| p.frames.len() < depth);
        }
    }

    fn step_over(&mut self) {
        self.record("step_over");
        let depth = self.depth();
        if let Some(start) = self.next_index() {
            self.advance(start, move |p| p.frames.len() <= depth);
        }
    }

    fn add_breakpoints(&mut self, filename: &str, lines: &[u32]) {
        self.log
            .borrow_mut()
            .breakpoints
            .entry(filename.to_string())
            .or_default()
            .extend(lines.iter().copied());
    }

    fn remove_breakpoints(&mut self, filename: &str, lines: &[u32]) {
        let mut log = self.log.borrow_mut();
        if let Some(set) = log.breakpoints.get_mut(filename) {
            for line in lines {
                set.remove(line);
            }
        }
    }

    fn call_stack(&self) -> Vec<StackFrame> {
        let Some(point) = self.current() else {
            return Vec::new();
        };
        let mut frames: Vec<StackFrame> = point.frames.iter().map(|f| self.stack_frame(f)).collect();
        if self.order == StackOrder::InnermostFirst {
            frames.reverse();
        }
        frames
    }

    fn stack_order(&self) -> StackOrder {
        self.order
    }

    fn current_stack_frame(&self) -> Option<StackFrame> {
        let point = self.current()?;
        point.frames.last().map(|f| self.stack_frame(f))
    }

    fn current_location(&self) -> Option<Location> {
        self.current().map(|p| Location {
            line: p.line,
            column: 0,
        })
    }

    fn is_paused(&self) -> bool {
        self.position.is_some()
    }

    fn evaluate(&mut self, expression: &str) -> Result<Value, ScriptError> {
        eval_expression(expression, &[], &self.program.globals)
    }
}

struct FakeScope {
    locals: Vec<(String, Value)>,
    globals: Vec<(String, Value)>,
}

impl FrameScope for FakeScope {
    fn eval_in_scope(&self, expression: &str) -> Result<Value, ScriptError> {
        eval_expression(expression, &self.locals, &self.globals)
    }
}

/// Numbers, double-quoted strings and identifier lookups. Anything else is a
/// syntax error.
fn eval_expression(
    expression: &str,
    locals: &[(String, Value)],
    globals: &[(String, Value)],
) -> Result<Value, ScriptError> {
    let expr = expression.trim();
    if let Ok(n) = expr.parse::<f64>() {
        return Ok(Value::Number(n));
    }
    if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
        return Ok(Value::string(&expr[1..expr.len() - 1]));
    }
    let is_identifier = !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        return locals
            .iter()
            .chain(globals)
            .find(|(name, _)| name == expr)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ScriptError::new("ReferenceError", format!("{} is not defined", expr)));
    }
    Err(ScriptError::new("SyntaxError", "Unexpected token"))
}

#[derive(Debug, thiserror::Error)]
#[error("script engine unavailable")]
pub struct EngineUnavailable;

pub struct FakeFactory {
    pub program: Program,
    pub order: StackOrder,
    fail: Rc<Cell<bool>>,
    log: SharedLog,
}

impl FakeFactory {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            order: StackOrder::OutermostFirst,
            fail: Rc::default(),
            log: SharedLog::default(),
        }
    }

    pub fn innermost_first(mut self) -> Self {
        self.order = StackOrder::InnermostFirst;
        self
    }

    pub fn failing() -> Self {
        let factory = Self::new(Program::default());
        factory.fail.set(true);
        factory
    }

    /// Flips whether later `create` calls fail.
    pub fn failure_switch(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.fail)
    }

    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }
}

impl EngineFactory for FakeFactory {
    type Engine = FakeEngine;
    type Error = EngineUnavailable;

    fn create(&mut self, config: EngineConfig) -> Result<FakeEngine, EngineUnavailable> {
        if self.fail.get() {
            return Err(EngineUnavailable);
        }
        {
            let mut log = self.log.borrow_mut();
            log.created += 1;
            log.sinks.push(config.events.clone());
            log.breakpoints.clear();
        }
        Ok(FakeEngine {
            program: self.program.clone(),
            order: self.order,
            events: config.events,
            log: Rc::clone(&self.log),
            loaded: None,
            position: None,
        })
    }
}

/// `f` assigns its local twice; the top level calls it once.
pub const SCENARIO_SOURCE: &str = "function f() {
  var a = 1;
  a = 2;
  return a;
}
f();";

/// Trace of [`SCENARIO_SOURCE`] under a one-based engine.
pub fn scenario_program() -> Program {
    let global = || frame("(global)", "main.js", vec![]);
    let f = |a: Value| frame("f", "main.js", vec![("a", a)]);
    Program {
        trace: vec![
            point(6, vec![global()]),
            point(2, vec![global(), f(Value::Undefined)]),
            point(3, vec![global(), f(Value::from(1))]),
            point(4, vec![global(), f(Value::from(2))]),
            point(6, vec![global()]),
        ],
        globals: vec![("f".to_string(), Value::function(Some("f")))],
        uncaught: None,
    }
}

pub fn scenario_files() -> Vec<CodeFile> {
    vec![
        CodeFile::new("main.js", SCENARIO_SOURCE),
        CodeFile::new("index.html", "<div id=\"app\"></div>"),
    ]
}

pub fn controller(
    factory: FakeFactory,
    files: Vec<CodeFile>,
) -> (DebugController<FakeFactory>, Receiver<Notification>) {
    let (tx, rx) = channel();
    let controller = DebugController::new(factory, files, DebuggerConfig::default(), tx)
        .unwrap_or_else(|e| panic!("controller construction failed: {}", e));
    (controller, rx)
}

pub fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
    rx.try_iter().collect()
}
