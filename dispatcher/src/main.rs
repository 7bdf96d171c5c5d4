pub mod controls;
pub mod externals;
pub mod models;
pub mod ports;
pub mod state;
pub mod tasks;

use anyhow::Result;
use tokio::{signal, sync::broadcast};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::level_filters::LevelFilter;

use crate::externals::command_server::task::task_handle_command_connections;
use crate::externals::event_logging::task::task_scene_event_logging;
use crate::externals::scene::adapters::MemoryScene;
use crate::tasks::dispatch::task_dispatch_commands;

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

    let (tx_commands, rx_commands) = broadcast::channel(32);
    let (tx_scene_events, rx_scene_events) = broadcast::channel(32);

    // NOTE: Stands in for a real host application adapter. Seeded so
    // connect commands have targets to resolve against.
    let mut scene = MemoryScene::new();
    scene.insert_object(
        "cube1",
        &[("translateX", 0.0), ("translateY", 0.0), ("rotateZ", 0.0)],
    );
    scene.insert_object("lamp1", &[("intensity", 1.0)]);

    let token_clone = token.clone();
    tracker.spawn(async { task_handle_command_connections(token_clone, tx_commands).await });

    let token_clone = token.clone();
    tracker.spawn(async {
        task_dispatch_commands(token_clone, scene, rx_commands, tx_scene_events).await
    });

    let token_clone = token.clone();
    tracker.spawn(async { task_scene_event_logging(token_clone, rx_scene_events).await });

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
