use tokio::sync::broadcast::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use common::command::Command;

use crate::models::scene_event::SceneEvent;
use crate::ports::ScenePort;
use crate::state::DispatcherState;

/// Owns the binding table and the scene for the lifetime of the session.
/// Consumes commands from the queue and publishes every applied mutation
/// as a `SceneEvent`.
#[tracing::instrument(skip_all)]
pub async fn task_dispatch_commands<S: ScenePort>(
    token: CancellationToken,
    mut scene: S,
    mut rx_commands: Receiver<Command>,
    tx_scene_events: Sender<SceneEvent>,
) {
    info!("Started.");

    let mut state = DispatcherState::new();
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            Ok(command) = rx_commands.recv() => {
                debug!("Got command: {:?}", command);
                handle_command(&mut state, &mut scene, &tx_scene_events, command);
            },
        };
    }
}

/// Handle one command against the binding table. Connect failures are
/// fatal to that request only and are reported through the log.
fn handle_command<S: ScenePort>(
    state: &mut DispatcherState,
    scene: &mut S,
    tx_scene_events: &Sender<SceneEvent>,
    command: Command,
) {
    match command {
        Command::ConnectAttribute {
            channel,
            object,
            attribute,
            min,
            max,
        } => match state.connect_attribute(scene, channel, &object, &attribute, min, max) {
            Err(e) => error!(
                "Failed to connect channel {} to {}.{}. Error: {}",
                channel, object, attribute, e
            ),
            Ok(_) => info!(
                "Connected channel {} to {}.{} over [{}, {}].",
                channel, object, attribute, min, max
            ),
        },
        Command::ConnectTime { channel } => match state.connect_time(channel) {
            Err(e) => error!(
                "Failed to connect channel {} to the time cursor. Error: {}",
                channel, e
            ),
            Ok(_) => info!("Connected channel {} to the time cursor.", channel),
        },
        Command::UpdateChannel { channel, value } => match state.apply(scene, channel, value) {
            Err(e) => warn!(
                "Failed to apply update to channel {}. Error: {}",
                channel, e
            ),
            Ok(None) => trace!("Update to channel {} had no bound target.", channel),
            Ok(Some(event)) => match tx_scene_events.send(event) {
                Err(e) => warn!("Failed to send scene event over queue. Error: {}", e),
                Ok(_) => trace!("Successfully published scene event."),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::externals::scene::adapters::MemoryScene;
    use tokio::sync::broadcast;

    fn connected_state(scene: &MemoryScene) -> DispatcherState {
        let mut state = DispatcherState::new();
        state
            .connect_attribute(scene, 0, "cube1", "translateX", -10.0, 10.0)
            .expect("Failed to connect attribute.");
        state.connect_time(1).expect("Failed to connect time.");
        state
    }

    fn scene_with_cube() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.insert_object("cube1", &[("translateX", 0.0)]);
        scene
    }

    #[test]
    fn test_update_publishes_scene_event() {
        let mut scene = scene_with_cube();
        let mut state = connected_state(&scene);
        let (tx_scene_events, mut rx_scene_events) = broadcast::channel(8);

        handle_command(
            &mut state,
            &mut scene,
            &tx_scene_events,
            Command::UpdateChannel {
                channel: 0,
                value: 1023,
            },
        );

        assert_eq!(
            rx_scene_events.try_recv(),
            Ok(SceneEvent::AttributeSet {
                object: "cube1".to_string(),
                attribute: "translateX".to_string(),
                value: 10.0,
            })
        );
    }

    #[test]
    fn test_update_on_unbound_channel_publishes_nothing() {
        let mut scene = scene_with_cube();
        let mut state = DispatcherState::new();
        let (tx_scene_events, mut rx_scene_events) = broadcast::channel(8);

        handle_command(
            &mut state,
            &mut scene,
            &tx_scene_events,
            Command::UpdateChannel {
                channel: 2,
                value: 512,
            },
        );

        assert!(rx_scene_events.try_recv().is_err());
    }

    #[test]
    fn test_failed_connect_leaves_state_untouched() {
        let mut scene = scene_with_cube();
        let mut state = DispatcherState::new();
        let (tx_scene_events, _rx_scene_events) = broadcast::channel(8);

        handle_command(
            &mut state,
            &mut scene,
            &tx_scene_events,
            Command::ConnectAttribute {
                channel: 99,
                object: "cube1".to_string(),
                attribute: "translateX".to_string(),
                min: 0.0,
                max: 1.0,
            },
        );

        for channel in 0..common::channel::CHANNEL_COUNT {
            assert_eq!(
                state.lookup(channel),
                Ok(&crate::models::binding::Binding::Unbound)
            );
        }
    }

    #[test]
    fn test_time_connect_then_update() {
        let mut scene = scene_with_cube();
        scene.set_time(100.0);
        let mut state = DispatcherState::new();
        let (tx_scene_events, mut rx_scene_events) = broadcast::channel(8);

        handle_command(
            &mut state,
            &mut scene,
            &tx_scene_events,
            Command::ConnectTime { channel: 1 },
        );
        handle_command(
            &mut state,
            &mut scene,
            &tx_scene_events,
            Command::UpdateChannel {
                channel: 1,
                value: 5,
            },
        );

        assert_eq!(scene.current_time(), 105.0);
        assert_eq!(
            rx_scene_events.try_recv(),
            Ok(SceneEvent::TimeAdvanced {
                delta: 5,
                time: 105.0
            })
        );
    }
}
