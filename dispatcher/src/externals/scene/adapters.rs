use std::collections::HashMap;

use crate::ports::{SceneError, ScenePort};

/// In-memory stand-in for the host application's scene. Objects are flat
/// bags of float attributes; the time cursor starts at zero.
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: HashMap<String, HashMap<String, f64>>,
    time: f64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with the given float attributes, replacing any object
    /// of the same name.
    pub fn insert_object(&mut self, name: &str, attributes: &[(&str, f64)]) {
        let attributes = attributes
            .iter()
            .map(|(attribute, value)| (attribute.to_string(), *value))
            .collect();
        self.objects.insert(name.to_string(), attributes);
    }

    fn attributes_of(&self, object: &str) -> Result<&HashMap<String, f64>, SceneError> {
        self.objects
            .get(object)
            .ok_or_else(|| SceneError::UnknownObject(object.to_string()))
    }
}

impl ScenePort for MemoryScene {
    fn resolve_attribute(&self, object: &str, attribute: &str) -> Result<(), SceneError> {
        if !self.attributes_of(object)?.contains_key(attribute) {
            return Err(SceneError::UnknownAttribute {
                object: object.to_string(),
                attribute: attribute.to_string(),
            });
        }
        Ok(())
    }

    fn read_attribute(&self, object: &str, attribute: &str) -> Result<f64, SceneError> {
        self.attributes_of(object)?
            .get(attribute)
            .copied()
            .ok_or_else(|| SceneError::UnknownAttribute {
                object: object.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn write_attribute(
        &mut self,
        object: &str,
        attribute: &str,
        value: f64,
    ) -> Result<(), SceneError> {
        let slot = self
            .objects
            .get_mut(object)
            .ok_or_else(|| SceneError::UnknownObject(object.to_string()))?
            .get_mut(attribute)
            .ok_or_else(|| SceneError::UnknownAttribute {
                object: object.to_string(),
                attribute: attribute.to_string(),
            })?;
        *slot = value;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_read_write() {
        let mut scene = MemoryScene::new();
        scene.insert_object("cube1", &[("translateX", 1.5)]);

        scene
            .resolve_attribute("cube1", "translateX")
            .expect("Failed to resolve a known attribute.");
        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(1.5));

        scene
            .write_attribute("cube1", "translateX", -4.0)
            .expect("Failed to write a known attribute.");
        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(-4.0));
    }

    #[test]
    fn test_unknown_targets() {
        let mut scene = MemoryScene::new();
        scene.insert_object("cube1", &[("translateX", 0.0)]);

        assert_eq!(
            scene.resolve_attribute("ghost", "translateX"),
            Err(SceneError::UnknownObject("ghost".to_string()))
        );
        assert_eq!(
            scene.resolve_attribute("cube1", "visibility"),
            Err(SceneError::UnknownAttribute {
                object: "cube1".to_string(),
                attribute: "visibility".to_string(),
            })
        );
        assert!(scene.write_attribute("cube1", "visibility", 1.0).is_err());
    }

    #[test]
    fn test_time_cursor() {
        let mut scene = MemoryScene::new();
        assert_eq!(scene.current_time(), 0.0);
        scene.set_time(42.0);
        assert_eq!(scene.current_time(), 42.0);
    }

    #[test]
    fn test_insert_object_replaces() {
        let mut scene = MemoryScene::new();
        scene.insert_object("cube1", &[("translateX", 1.0), ("translateY", 2.0)]);
        scene.insert_object("cube1", &[("translateX", 0.0)]);

        assert_eq!(scene.read_attribute("cube1", "translateX"), Ok(0.0));
        assert!(scene.read_attribute("cube1", "translateY").is_err());
    }
}
