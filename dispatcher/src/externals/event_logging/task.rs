use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::scene_event::SceneEvent;

#[tracing::instrument(skip_all)]
pub async fn task_scene_event_logging(
    token: CancellationToken,
    mut rx_scene_events: Receiver<SceneEvent>,
) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Ok(event) = rx_scene_events.recv() => {
                info!("Applied scene mutation: {}", event);
            }
        };
    }
}
