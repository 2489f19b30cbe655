//! Live capture from a TCP tap.

use std::io::{ErrorKind, Read};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use droptrack_core::config::stream::DEFAULT_CHUNK_SIZE;
use droptrack_core::{Error, MemoryRepository, SharedSession};
use tracing::{debug, error, info, warn};

use crate::cli_utils::{self, Paths};
use crate::shutdown::ShutdownSignal;

const READ_TIMEOUT: Duration = Duration::from_millis(500);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capture until Ctrl+C, reconnecting when the tap drops.
pub fn run(paths: &Paths, addr: &str) -> Result<()> {
    let shutdown = setup_shutdown_handler()?;
    let session = SharedSession::new(cli_utils::open_session(paths, true)?);

    println!("Connecting to {}... (Press Ctrl+C to quit)", addr);

    let mut outcome = Ok(());
    while !shutdown.is_shutdown() {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                println!("Connected to {}", addr);
                if let Err(e) = capture(stream, &session, &shutdown) {
                    outcome = Err(e);
                    break;
                }
                session.with(|s| s.reset_stream());
                session.with(|s| cli_utils::save_store(s, paths))?;
                if !shutdown.is_shutdown() {
                    println!("Connection closed, retrying...");
                }
            }
            Err(e) => debug!("Connect to {} failed: {}", addr, e),
        }

        if shutdown.wait(RECONNECT_DELAY) {
            break;
        }
    }

    session.with(|s| {
        let counters = s.counters();
        info!(
            "Frames: {} dispatched, {} unknown, {} malformed, {} faults",
            counters.dispatched, counters.unknown, counters.malformed, counters.faults
        );
        cli_utils::save_store(s, paths)
    })?;
    println!("Shutdown complete.");
    outcome
}

/// Read the stream until it closes or shutdown is requested.
///
/// Only a reassembly overflow is returned as an error; it ends the capture.
fn capture(
    mut stream: TcpStream,
    session: &SharedSession<MemoryRepository>,
    shutdown: &ShutdownSignal,
) -> Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE];

    while !shutdown.is_shutdown() {
        let n = match stream.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Read error: {}", e);
                return Ok(());
            }
        };

        match session.feed(&buf[..n], Utc::now()) {
            Ok(_) => {}
            Err(e @ Error::BufferOverflow { .. }) => {
                error!("{}", e);
                return Err(e.into());
            }
            Err(e) => warn!("Failed to feed chunk: {}", e),
        }
    }
    Ok(())
}

fn setup_shutdown_handler() -> Result<Arc<ShutdownSignal>> {
    let shutdown = Arc::new(ShutdownSignal::new());

    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        shutdown_ctrlc.trigger();
    })?;

    let current_version = env!("CARGO_PKG_VERSION");
    println!("droptrack v{}", current_version);

    Ok(shutdown)
}
