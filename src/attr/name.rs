use crate::world::Attribute;

/// Display name of a thing, e.g. "a mug"
#[derive(Debug, Clone)]
pub struct Name(String);

impl Name {
    /// Create a new name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Attribute for Name {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(self.clone()))
    }

    fn dump(&self) -> String {
        format!("Name: {:?}", self.0)
    }
}
