use super::protocol::{CommandArguments, HostMessage, HostMessageContent, LineArguments};
use crate::debugger::{DebugController, Notification, StepCommand};
use crate::engine::EngineFactory;
use crate::error::HostError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::io::{BufRead, Read, Write};
use std::sync::mpsc::Receiver;

const CONTENT_LENGTH: &str = "Content-Length:";

/// Largest message body accepted from the host.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Read one `Content-Length` framed message. `Ok(None)` on a clean end of input.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<HostMessage>, HostError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return match content_length {
                None => Ok(None),
                Some(_) => Err(HostError::Framing("input ended inside a header".into())),
            };
        }
        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            if content_length.is_some() {
                break;
            }
            // tolerate blank lines between messages
            continue;
        }
        if let Some(value) = header.strip_prefix(CONTENT_LENGTH) {
            let length = value
                .trim()
                .parse()
                .map_err(|_| HostError::Framing(header.to_string()))?;
            content_length = Some(length);
        }
    }

    let length = content_length.unwrap_or(0);
    if length > MAX_MESSAGE_BYTES {
        return Err(HostError::Framing(format!(
            "message of {} bytes exceeds the {} byte limit",
            length, MAX_MESSAGE_BYTES
        )));
    }
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer)?;
    Ok(Some(serde_json::from_slice(&buffer)?))
}

pub fn write_message<W: Write>(writer: &mut W, msg: &HostMessage) -> Result<(), HostError> {
    let json = serde_json::to_string(msg)?;
    write!(writer, "{} {}\r\n\r\n{}", CONTENT_LENGTH, json.len(), json)?;
    writer.flush()?;
    Ok(())
}

/// Maps host requests onto a [`DebugController`] and forwards its
/// notifications as events.
pub struct HostServer<F: EngineFactory, W: Write> {
    seq: u64,
    controller: DebugController<F>,
    notifications: Receiver<Notification>,
    writer: W,
}

impl<F: EngineFactory, W: Write> HostServer<F, W> {
    pub fn new(
        controller: DebugController<F>,
        notifications: Receiver<Notification>,
        writer: W,
    ) -> Self {
        Self {
            seq: 0,
            controller,
            notifications,
            writer,
        }
    }

    pub fn controller(&self) -> &DebugController<F> {
        &self.controller
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<Value>,
    ) -> Result<(), HostError> {
        let msg = HostMessage {
            seq: self.next_seq(),
            content: HostMessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        write_message(&mut self.writer, &msg)
    }

    pub fn send_event(&mut self, event: &str, body: Option<Value>) -> Result<(), HostError> {
        let msg = HostMessage {
            seq: self.next_seq(),
            content: HostMessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        write_message(&mut self.writer, &msg)
    }

    /// Serve until `disconnect` or end of input.
    pub fn serve<R: BufRead>(&mut self, reader: &mut R) -> Result<(), HostError> {
        while let Some(msg) = read_message(reader)? {
            if !self.handle(msg)? {
                break;
            }
        }
        Ok(())
    }

    /// Returns `false` once the host asked to disconnect.
    pub fn handle(&mut self, msg: HostMessage) -> Result<bool, HostError> {
        match msg.content {
            HostMessageContent::Request { command, arguments } => {
                let keep_going = self.handle_request(msg.seq, command, arguments)?;
                // also deliver events the engine queued while idle
                self.controller.pump_events();
                self.flush_notifications()?;
                Ok(keep_going)
            }
            other => {
                tracing::debug!(?other, "ignoring non-request message");
                Ok(true)
            }
        }
    }

    fn handle_request(
        &mut self,
        seq: u64,
        command: String,
        arguments: Option<Value>,
    ) -> Result<bool, HostError> {
        tracing::debug!(%command, seq, "host request");
        let name = command.clone();
        match name.as_str() {
            "breakpointAdd" | "breakpointRemove" => {
                let args: LineArguments = match parse_arguments(arguments) {
                    Ok(args) => args,
                    Err(message) => return self.reject(seq, command, message),
                };
                if command == "breakpointAdd" {
                    if let Err(e) = self.controller.add_breakpoint(args.line) {
                        return self.reject(seq, command, e.to_string());
                    }
                } else {
                    self.controller.remove_breakpoint(args.line);
                }
                let lines = self
                    .controller
                    .breakpoints()
                    .list_for(&self.controller.primary_filename());
                self.send_response(seq, command, true, None, Some(json!({ "lines": lines })))?;
            }
            "run" | "reset" => {
                let result = if command == "run" {
                    self.controller.load_and_run()
                } else {
                    self.controller.reset()
                };
                match result {
                    Ok(()) => self.send_response(seq, command, true, None, None)?,
                    Err(e) => {
                        tracing::warn!(error = %e, "host request failed");
                        self.send_response(seq, command, false, Some(e.to_string()), None)?;
                    }
                }
            }
            "command" => {
                let args: CommandArguments = match parse_arguments(arguments) {
                    Ok(args) => args,
                    Err(message) => return self.reject(seq, command, message),
                };
                let entry = self.controller.evaluate(&args.text);
                self.send_response(seq, command, true, None, Some(json!({ "entry": entry })))?;
            }
            "disconnect" => {
                self.send_response(seq, command, true, None, None)?;
                return Ok(false);
            }
            other => match StepCommand::from_command(other) {
                Some(step) => {
                    self.controller.step(step);
                    self.send_response(seq, command, true, None, None)?;
                }
                None => {
                    tracing::warn!(%command, "unhandled host command");
                    let message = format!("unknown command `{}`", command);
                    return self.reject(seq, command, message);
                }
            },
        }
        Ok(true)
    }

    fn reject(&mut self, seq: u64, command: String, message: String) -> Result<bool, HostError> {
        self.send_response(seq, command, false, Some(message), None)?;
        Ok(true)
    }

    fn flush_notifications(&mut self) -> Result<(), HostError> {
        while let Ok(notification) = self.notifications.try_recv() {
            let (event, body) = match notification {
                Notification::Paused { line, snapshot } => {
                    ("paused", json!({ "line": line, "snapshot": snapshot }))
                }
                Notification::Resumed { line } => ("resumed", json!({ "line": line })),
                Notification::Console { entry } => ("console", json!({ "entry": entry })),
            };
            self.send_event(event, Some(body))?;
        }
        Ok(())
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, String> {
    serde_json::from_value(arguments.unwrap_or(Value::Null))
        .map_err(|e| format!("bad arguments: {}", e))
}
