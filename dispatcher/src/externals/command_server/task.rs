use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use common::command::{Command, CommandError, DEFAULT_COMMAND_ADDR};

/// Listens on the command port and feeds parsed commands into the queue.
/// The bridge holds one long-lived connection; user scripts connect, send
/// their connect commands, and go away.
#[tracing::instrument(skip_all)]
pub async fn task_handle_command_connections(token: CancellationToken, tx_commands: Sender<Command>) {
    info!("Started.");

    let listener = match TcpListener::bind(DEFAULT_COMMAND_ADDR).await {
        Err(e) => {
            error!(
                "Failed to bind the command port at {}. Error: {}",
                DEFAULT_COMMAND_ADDR, e
            );
            token.cancel();
            return;
        }
        Ok(listener) => listener,
    };
    info!("Listening for commands at {}.", DEFAULT_COMMAND_ADDR);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            accepted = listener.accept() => {
                match accepted {
                    Err(e) => warn!("Failed to accept a command connection. Error: {}", e),
                    Ok((stream, peer)) => {
                        debug!("Accepted a command connection from {}.", peer);
                        let token_clone = token.clone();
                        let tx_commands_clone = tx_commands.clone();
                        tokio::spawn(async move {
                            handle_command_connection(token_clone, stream, tx_commands_clone).await;
                        });
                    }
                }
            },
        };
    }
}

/// Reads newline-terminated command lines from one connection until it
/// closes or the token is cancelled.
#[instrument(skip_all)]
async fn handle_command_connection(
    token: CancellationToken,
    stream: TcpStream,
    tx_commands: Sender<Command>,
) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("Failed to read a command line. Error: {}", e);
                        break;
                    }
                    Ok(None) => {
                        debug!("Command connection closed.");
                        break;
                    }
                    Ok(Some(line)) => handle_command_line(&line, &tx_commands),
                }
            },
        };
    }
}

/// Parse one line and queue the command. Malformed readings and blank
/// lines are dropped without surfacing an error, the serial side of the
/// system is allowed to be noisy.
fn handle_command_line(line: &str, tx_commands: &Sender<Command>) {
    match line.parse::<Command>() {
        Ok(command) => match tx_commands.send(command) {
            Err(e) => warn!("Failed to send command over queue. Error: {}", e),
            Ok(_) => trace!("Successfully queued command line '{}'.", line),
        },
        Err(CommandError::MalformedReading(token)) => {
            trace!("Dropped update with malformed reading '{}'.", token);
        }
        Err(CommandError::Empty) => {
            trace!("Dropped empty command line.");
        }
        Err(e) => warn!("Rejected command line '{}'. Error: {}", line, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[test]
    fn test_valid_line_is_queued() {
        let (tx_commands, mut rx_commands) = broadcast::channel(8);
        handle_command_line("arduinoUpdateChannel 0 512", &tx_commands);
        assert_eq!(
            rx_commands.try_recv(),
            Ok(Command::UpdateChannel {
                channel: 0,
                value: 512
            })
        );
    }

    #[test]
    fn test_malformed_reading_is_dropped_silently() {
        let (tx_commands, mut rx_commands) = broadcast::channel(8);
        handle_command_line("arduinoUpdateChannel 0 n0ise", &tx_commands);
        assert!(rx_commands.try_recv().is_err());
    }

    #[test]
    fn test_blank_line_is_dropped() {
        let (tx_commands, mut rx_commands) = broadcast::channel(8);
        handle_command_line("   ", &tx_commands);
        assert!(rx_commands.try_recv().is_err());
    }
}
