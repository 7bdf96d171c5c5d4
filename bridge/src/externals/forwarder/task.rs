use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use common::command::{Command, DEFAULT_COMMAND_ADDR};

use crate::models::sample::ChannelUpdate;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connect to the dispatcher's command port, retrying on a fixed delay
/// until it succeeds. The dispatcher being down is never fatal.
#[instrument(skip_all)]
async fn connect_to_dispatcher(token: CancellationToken) -> Result<TcpStream, String> {
    loop {
        if token.is_cancelled() {
            warn!("Token was cancelled.");
            return Err("Cancelled".into());
        }
        trace!(
            "Trying to connect to the dispatcher at {}.",
            DEFAULT_COMMAND_ADDR
        );
        match TcpStream::connect(DEFAULT_COMMAND_ADDR).await {
            Ok(stream) => return Ok(stream),
            Err(e) => debug!("Dispatcher not reachable yet. Error: {}", e),
        }
        tokio::select! {
            _ = token.cancelled() => {},
            _ = tokio::time::sleep(RECONNECT_DELAY) => {},
        };
    }
}

/// Write one update command line to the dispatcher.
async fn write_update(stream: &mut TcpStream, update: ChannelUpdate) -> std::io::Result<()> {
    let command = Command::UpdateChannel {
        channel: update.channel,
        value: update.value,
    };
    let line = format!("{}\n", command);
    stream.write_all(line.as_bytes()).await
}

/// Forwards queued channel updates to the dispatcher as text command
/// lines. A failed write drops the connection and goes back to the
/// fixed-delay connect loop; the update that hit the failure is lost,
/// the next sampling tick supersedes it anyway.
#[tracing::instrument(skip_all)]
pub async fn task_forward_updates(token: CancellationToken, mut rx_updates: Receiver<ChannelUpdate>) {
    info!("Started.");

    'reconnect: loop {
        let mut stream = match connect_to_dispatcher(token.clone()).await {
            Err(e) => {
                warn!("Failed to connect to the dispatcher. Error: {}", e);
                break;
            }
            Ok(stream) => stream,
        };
        info!("Connected to the dispatcher at {}.", DEFAULT_COMMAND_ADDR);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    warn!("Cancelled.");
                    break 'reconnect;
                },
                Ok(update) = rx_updates.recv() => {
                    debug!("Forwarding update {}.", update);
                    if let Err(e) = write_update(&mut stream, update).await {
                        warn!("Failed to write update to the dispatcher. Error: {}", e);
                        continue 'reconnect;
                    }
                    trace!("Successfully wrote update line.");
                },
            };
        }
    }
}
