pub mod externals;
pub mod models;

use anyhow::Result;
use tokio::{signal, sync::broadcast};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::level_filters::LevelFilter;

use crate::externals::forwarder::task::task_forward_updates;
use crate::externals::serial::task::task_read_serial_samples;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(LevelFilter::TRACE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    let tracker = TaskTracker::new();

    let token = CancellationToken::new();

    let (tx_updates, rx_updates) = broadcast::channel(32);

    let token_clone = token.clone();
    tracker.spawn(async { task_read_serial_samples(token_clone, tx_updates).await });

    let token_clone = token.clone();
    tracker.spawn(async { task_forward_updates(token_clone, rx_updates).await });

    let token_clone = token.clone();
    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    token.cancel();
                },
                Err(e)=>{
                    tracing::error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    tracker.close();
    tracker.wait().await;

    Ok(())
}
