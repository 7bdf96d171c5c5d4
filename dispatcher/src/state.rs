use thiserror::Error;

use common::channel::{ChannelError, ChannelId, CHANNEL_COUNT};

use crate::controls::scale_reading;
use crate::models::binding::Binding;
use crate::models::scene_event::SceneEvent;
use crate::ports::{SceneError, ScenePort};

/// Represents errors handling a single connect or update request. Each is
/// fatal to that request only; the dispatcher keeps running.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidChannel(#[from] ChannelError),

    #[error(transparent)]
    UnknownTarget(#[from] SceneError),
}

/// The channel-to-binding table plus the dispatch step. Owned by the
/// command-handling task for the lifetime of the host session; bindings
/// do not persist across sessions.
pub struct DispatcherState {
    bindings: [Binding; CHANNEL_COUNT],
}

impl Default for DispatcherState {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherState {
    pub fn new() -> Self {
        Self {
            bindings: std::array::from_fn(|_| Binding::Unbound),
        }
    }

    /// Validate the channel and store a binding, overwriting any previous
    /// one.
    pub fn bind(&mut self, channel: usize, binding: Binding) -> Result<(), DispatchError> {
        let channel = ChannelId::try_from(channel)?;
        self.bindings[channel.index()] = binding;
        Ok(())
    }

    /// The current binding of a channel. `Unbound` if nothing was ever
    /// connected.
    pub fn lookup(&self, channel: usize) -> Result<&Binding, DispatchError> {
        let channel = ChannelId::try_from(channel)?;
        Ok(&self.bindings[channel.index()])
    }

    /// Bind a channel to a float attribute of a named object. The target
    /// must resolve in the scene at bind time.
    pub fn connect_attribute<S: ScenePort>(
        &mut self,
        scene: &S,
        channel: usize,
        object: &str,
        attribute: &str,
        min: f64,
        max: f64,
    ) -> Result<(), DispatchError> {
        let channel = ChannelId::try_from(channel)?;
        scene.resolve_attribute(object, attribute)?;
        self.bindings[channel.index()] = Binding::AttributeRange {
            object: object.to_string(),
            attribute: attribute.to_string(),
            min,
            max,
        };
        Ok(())
    }

    /// Bind a channel to the host's current-time cursor.
    pub fn connect_time(&mut self, channel: usize) -> Result<(), DispatchError> {
        self.bind(channel, Binding::TimeCursor)
    }

    /// Apply one raw reading to whatever the channel is bound to. Exactly
    /// one scene mutation happens per call, or none; the mutation is
    /// returned so callers can publish it.
    pub fn apply<S: ScenePort>(
        &self,
        scene: &mut S,
        channel: usize,
        value: i32,
    ) -> Result<Option<SceneEvent>, DispatchError> {
        let channel = ChannelId::try_from(channel)?;
        match &self.bindings[channel.index()] {
            Binding::Unbound => Ok(None),
            Binding::TimeCursor => {
                let time = scene.current_time() + value as f64;
                scene.set_time(time);
                Ok(Some(SceneEvent::TimeAdvanced { delta: value, time }))
            }
            Binding::AttributeRange {
                object,
                attribute,
                min,
                max,
            } => {
                let scaled = scale_reading(value, *min, *max);
                scene.write_attribute(object, attribute, scaled)?;
                Ok(Some(SceneEvent::AttributeSet {
                    object: object.clone(),
                    attribute: attribute.clone(),
                    value: scaled,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::externals::scene::adapters::MemoryScene;

    fn scene_with_cube() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.insert_object("cube1", &[("translateX", 0.0)]);
        scene
    }

    #[test]
    fn test_bind_then_lookup() {
        let mut state = DispatcherState::new();
        state
            .bind(1, Binding::TimeCursor)
            .expect("Failed to bind a valid channel.");
        assert_eq!(state.lookup(1), Ok(&Binding::TimeCursor));
    }

    #[test]
    fn test_lookup_without_bind_is_unbound() {
        let state = DispatcherState::new();
        for channel in 0..CHANNEL_COUNT {
            assert_eq!(state.lookup(channel), Ok(&Binding::Unbound));
        }
    }

    #[test]
    fn test_rebind_replaces_wholesale() {
        let scene = scene_with_cube();
        let mut state = DispatcherState::new();
        state
            .connect_attribute(&scene, 0, "cube1", "translateX", -10.0, 10.0)
            .expect("Failed to connect attribute.");
        state
            .connect_time(0)
            .expect("Failed to connect time cursor.");
        assert_eq!(state.lookup(0), Ok(&Binding::TimeCursor));
    }

    #[test]
    fn test_bind_invalid_channel_leaves_table_unchanged() {
        let mut state = DispatcherState::new();
        let result = state.bind(99, Binding::TimeCursor);
        assert_eq!(
            result,
            Err(DispatchError::InvalidChannel(ChannelError::InvalidChannel(
                99
            )))
        );
        for channel in 0..CHANNEL_COUNT {
            assert_eq!(state.lookup(channel), Ok(&Binding::Unbound));
        }
    }

    #[test]
    fn test_connect_attribute_unknown_object() {
        let scene = scene_with_cube();
        let mut state = DispatcherState::new();
        let result = state.connect_attribute(&scene, 0, "ghost", "translateX", 0.0, 1.0);
        assert_eq!(
            result,
            Err(DispatchError::UnknownTarget(SceneError::UnknownObject(
                "ghost".to_string()
            )))
        );
        assert_eq!(state.lookup(0), Ok(&Binding::Unbound));
    }

    #[test]
    fn test_connect_attribute_unknown_attribute() {
        let scene = scene_with_cube();
        let mut state = DispatcherState::new();
        let result = state.connect_attribute(&scene, 0, "cube1", "visibility", 0.0, 1.0);
        assert_eq!(
            result,
            Err(DispatchError::UnknownTarget(SceneError::UnknownAttribute {
                object: "cube1".to_string(),
                attribute: "visibility".to_string(),
            }))
        );
    }

    #[test]
    fn test_apply_on_unbound_channel_is_a_no_op() {
        let mut scene = scene_with_cube();
        let mut state = DispatcherState::new();
        let event = state
            .apply(&mut scene, 0, 512)
            .expect("Apply on an unbound channel must not fail.");
        assert_eq!(event, None);
        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(0.0));
        assert_eq!(scene.current_time(), 0.0);
    }

    #[test]
    fn test_apply_scales_attribute_range() {
        let mut scene = scene_with_cube();
        let mut state = DispatcherState::new();
        state
            .connect_attribute(&scene, 0, "cube1", "translateX", -10.0, 10.0)
            .expect("Failed to connect attribute.");

        state
            .apply(&mut scene, 0, 0)
            .expect("Failed to apply reading.");
        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(-10.0));

        state
            .apply(&mut scene, 0, 1023)
            .expect("Failed to apply reading.");
        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(10.0));

        let event = state
            .apply(&mut scene, 0, 512)
            .expect("Failed to apply reading.");
        let value = scene
            .read_attribute("cube1", "translateX")
            .expect("Failed to read attribute.");
        assert!((value - 0.0097752).abs() < 1e-4);
        assert_eq!(
            event,
            Some(SceneEvent::AttributeSet {
                object: "cube1".to_string(),
                attribute: "translateX".to_string(),
                value,
            })
        );
    }

    #[test]
    fn test_apply_advances_time_cursor_by_delta() {
        let mut scene = scene_with_cube();
        scene.set_time(100.0);
        let mut state = DispatcherState::new();
        state
            .connect_time(1)
            .expect("Failed to connect time cursor.");

        let event = state
            .apply(&mut scene, 1, 5)
            .expect("Failed to apply reading.");
        assert_eq!(scene.current_time(), 105.0);
        assert_eq!(
            event,
            Some(SceneEvent::TimeAdvanced {
                delta: 5,
                time: 105.0
            })
        );

        state
            .apply(&mut scene, 1, -7)
            .expect("Failed to apply reading.");
        assert_eq!(scene.current_time(), 98.0);
    }

    #[test]
    fn test_apply_invalid_channel() {
        let mut scene = scene_with_cube();
        let state = DispatcherState::new();
        let result = state.apply(&mut scene, 99, 5);
        assert_eq!(
            result,
            Err(DispatchError::InvalidChannel(ChannelError::InvalidChannel(
                99
            )))
        );
        assert_eq!(scene.current_time(), 0.0);
    }
}
