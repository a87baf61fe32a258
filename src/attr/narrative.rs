use crate::world::Attribute;

/// Marks a thing as scenery. Narrative things are listed apart from other
/// contents, cannot be picked up, and an empty container owned by one is not
/// announced as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Narrative;

impl Attribute for Narrative {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(Narrative))
    }

    fn dump(&self) -> String {
        "Narrative".to_string()
    }
}
