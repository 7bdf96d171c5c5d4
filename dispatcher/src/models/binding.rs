use std::fmt::Display;

/// What a channel drives. A later connect on the same channel replaces the
/// binding wholesale, never merges.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Binding {
    /// No target. Updates are silently dropped.
    #[default]
    Unbound,

    /// Updates add the raw reading as a signed delta to the host's
    /// current-time cursor.
    TimeCursor,

    /// Updates map the raw reading to an absolute position in
    /// `[min, max]` and write it to `object.attribute`.
    AttributeRange {
        object: String,
        attribute: String,
        min: f64,
        max: f64,
    },
}

impl Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Unbound => write!(f, "<Binding: unbound>"),
            Binding::TimeCursor => write!(f, "<Binding: time cursor>"),
            Binding::AttributeRange {
                object,
                attribute,
                min,
                max,
            } => write!(
                f,
                "<Binding: {}.{} over [{}, {}]>",
                object, attribute, min, max
            ),
        }
    }
}
