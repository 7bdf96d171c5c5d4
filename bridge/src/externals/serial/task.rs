use anyhow::Result;
use serialport::SerialPort;
use std::io::Read;
use std::time::Duration;
use tokio::sync::broadcast::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::models::sample::{ChannelUpdate, SampleFrame};

const CONTROLLER_DEVICE: &str = "/dev/ttyACM0";
const BAUD_RATE: u32 = 9600;
const DEVICE_POLL_DELAY: Duration = Duration::from_millis(500);
const READ_POLL_DELAY: Duration = Duration::from_millis(20);

/// Try to open the controller's serial device, polling until it shows up.
#[instrument(skip_all)]
async fn wait_for_controller_device(
    token: CancellationToken,
) -> Result<Box<dyn SerialPort>, String> {
    loop {
        if token.is_cancelled() {
            warn!("Token was cancelled.");
            return Err("Cancelled".into());
        }
        trace!("Trying to open controller device '{}'.", CONTROLLER_DEVICE);
        match serialport::new(CONTROLLER_DEVICE, BAUD_RATE)
            .timeout(Duration::from_millis(1000))
            .open()
        {
            Ok(port) => return Ok(port),
            Err(e) => debug!("Controller device not available yet. Error: {}", e),
        }
        trace!("Sleeping briefly before checking again.");
        tokio::time::sleep(DEVICE_POLL_DELAY).await;
    }
}

#[instrument(skip_all)]
fn is_ready_to_read_from_port(port: &Box<dyn SerialPort>) -> Result<bool> {
    match port.bytes_to_read() {
        Ok(bytes) => {
            trace!("Found {} bytes ready to read from port.", bytes);
            Ok(bytes > 0)
        }
        Err(e) => {
            warn!(
                "Failed to check if bytes are available to read from port. Error: {}",
                e
            );
            Err(e.into())
        }
    }
}

/// Read whatever bytes are pending and split off any completed lines.
/// Bytes after the last newline stay in `pending` for the next call.
#[instrument(skip_all)]
fn read_lines_from_port(
    port: &mut Box<dyn SerialPort>,
    pending: &mut String,
) -> Result<Vec<String>> {
    match is_ready_to_read_from_port(port) {
        Ok(true) => {
            trace!("Is ready to read from port.");
        }
        Ok(false) => {
            trace!("Not ready to read yet.");
            return Ok(vec![]);
        }
        Err(e) => {
            trace!("Not ready to read yet with error. Error: {}", e);
            return Err(e);
        }
    }

    let mut read_buffer: [u8; 1024] = [0; 1024];
    trace!("About to read from port.");
    match port.read(&mut read_buffer) {
        Ok(bytes_read) => {
            trace!("Received {} bytes", bytes_read);
            pending.push_str(&String::from_utf8_lossy(&read_buffer[0..bytes_read]));

            let mut lines = vec![];
            while let Some(position) = pending.find('\n') {
                let line = pending[..position].trim().to_string();
                pending.drain(..=position);
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            debug!(
                "Split {} complete lines with {} pending bytes.",
                lines.len(),
                pending.len()
            );
            Ok(lines)
        }
        Err(e) => {
            warn!("Failed to read from port. Error: {}", e);
            Err(e.into())
        }
    }
}

/// Reads sampling ticks from the controller and fans each parsed reading
/// out as a `ChannelUpdate`. If the device goes away the task waits for it
/// to come back and resumes.
#[tracing::instrument(skip_all)]
pub async fn task_read_serial_samples(token: CancellationToken, tx_updates: Sender<ChannelUpdate>) {
    info!("Started.");

    loop {
        trace!("Waiting on the controller device to show up.");
        let mut port = match wait_for_controller_device(token.clone()).await {
            Err(e) => {
                warn!("Failed to wait for the controller device. Error: {}", e);
                break;
            }
            Ok(port) => port,
        };
        info!("Opened controller device '{}'.", CONTROLLER_DEVICE);

        let mut pending = String::new();
        loop {
            let lines = match read_lines_from_port(&mut port, &mut pending) {
                Ok(lines) => lines,
                Err(e) => {
                    error!("Failed to read from the controller device. Error: {}", e);
                    break;
                }
            };

            for line in lines {
                let frame = SampleFrame::parse_line(&line);
                for update in frame.updates() {
                    match tx_updates.send(update) {
                        Err(e) => warn!("Failed to send update over queue. Error: {}", e),
                        Ok(_) => trace!("Successfully queued update {}.", update),
                    }
                }
            }

            tokio::select! {
                _ = token.cancelled() => {
                    warn!("Cancelled.");
                    return;
                },
                _ = tokio::time::sleep(READ_POLL_DELAY) => {}
            };
        }

        if token.is_cancelled() {
            warn!("Cancelled.");
            break;
        }
        info!("Lost the controller device. Waiting for it to come back.");
    }
}
