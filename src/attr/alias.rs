use crate::world::Attribute;

/// Words a thing can be referred to by. Stored uppercased, matched without
/// regard to case.
#[derive(Debug, Clone)]
pub struct Alias(Vec<String>);

impl Alias {
    /// Create aliases from any list of words
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            aliases
                .into_iter()
                .map(|a| a.as_ref().trim().to_uppercase())
                .filter(|a| !a.is_empty())
                .collect(),
        )
    }

    /// True if `alias` is one of the aliases
    pub fn has_alias(&self, alias: &str) -> bool {
        let alias = alias.to_uppercase();
        self.0.iter().any(|a| *a == alias)
    }

    /// All aliases
    pub fn aliases(&self) -> &[String] {
        &self.0
    }
}

impl Attribute for Alias {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(self.clone()))
    }

    fn dump(&self) -> String {
        format!("Alias: {}", self.0.join(", "))
    }
}
