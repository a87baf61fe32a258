use crate::world::Attribute;

/// Long description shown when a thing is examined or a location is looked at
#[derive(Debug, Clone)]
pub struct Description(String);

impl Description {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    pub fn description(&self) -> &str {
        &self.0
    }
}

impl Attribute for Description {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(self.clone()))
    }

    fn dump(&self) -> String {
        format!("Description: {:?}", self.0)
    }
}
