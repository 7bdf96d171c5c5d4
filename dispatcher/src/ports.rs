use thiserror::Error;

/// Represents errors resolving or touching a scene target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("No object called '{0}'.")]
    UnknownObject(String),

    #[error("No float attribute of '{object}' called '{attribute}'.")]
    UnknownAttribute { object: String, attribute: String },
}

/// The host application's scene as seen by the dispatcher: named objects
/// carrying float attributes, plus the global current-time cursor.
pub trait ScenePort {
    /// Check that `object.attribute` resolves to a writable float attribute.
    fn resolve_attribute(&self, object: &str, attribute: &str) -> Result<(), SceneError>;

    fn read_attribute(&self, object: &str, attribute: &str) -> Result<f64, SceneError>;

    fn write_attribute(
        &mut self,
        object: &str,
        attribute: &str,
        value: f64,
    ) -> Result<(), SceneError>;

    fn current_time(&self) -> f64;

    fn set_time(&mut self, time: f64);
}
