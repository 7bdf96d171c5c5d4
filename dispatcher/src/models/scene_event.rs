use std::fmt::Display;

/// One mutation the dispatcher applied to the scene. Every `apply` call
/// produces at most one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    AttributeSet {
        object: String,
        attribute: String,
        value: f64,
    },
    TimeAdvanced {
        delta: i32,
        time: f64,
    },
}

impl Display for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneEvent::AttributeSet {
                object,
                attribute,
                value,
            } => write!(f, "(SceneEvent: {}.{} set to {})", object, attribute, value),
            SceneEvent::TimeAdvanced { delta, time } => {
                write!(f, "(SceneEvent: time advanced by {} to {})", delta, time)
            }
        }
    }
}
