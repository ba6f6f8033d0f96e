//! Message bridge between a hosting application and the controller.
//!
//! Requests and events are JSON objects framed with a `Content-Length`
//! header, the same framing debug adapters use.

mod protocol;
mod server;

pub use protocol::{CommandArguments, HostMessage, HostMessageContent, LineArguments};
pub use server::{read_message, write_message, HostServer, MAX_MESSAGE_BYTES};

use crate::config::DebuggerConfig;
use crate::debugger::DebugController;
use crate::engine::EngineFactory;
use crate::error::HostError;
use crate::files::UserSession;
use std::io::{BufRead, Write};
use std::sync::mpsc::channel;

/// Serve one host connection until it disconnects or closes its input.
pub fn run_host<F, R, W>(
    factory: F,
    session: UserSession,
    config: DebuggerConfig,
    reader: &mut R,
    writer: W,
) -> Result<(), HostError>
where
    F: EngineFactory,
    R: BufRead,
    W: Write,
{
    tracing::info!(files = session.files.len(), "host bridge starting");

    let (tx, rx) = channel();
    let controller = DebugController::new(factory, session.files, config, tx)?;
    let mut server = HostServer::new(controller, rx, writer);
    server.serve(reader)?;

    tracing::info!("host bridge exiting");
    Ok(())
}
