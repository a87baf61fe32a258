use crate::world::Attribute;

/// Something written on a thing that can be read
#[derive(Debug, Clone)]
pub struct Writing(String);

impl Writing {
    pub fn new(writing: impl Into<String>) -> Self {
        Self(writing.into())
    }

    pub fn writing(&self) -> &str {
        &self.0
    }
}

impl Attribute for Writing {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(self.clone()))
    }

    fn dump(&self) -> String {
        format!("Writing: {:?}", self.0)
    }
}
