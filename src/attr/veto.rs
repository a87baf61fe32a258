use std::collections::BTreeMap;

use crate::world::Attribute;

/// Refusal of one command for the thing carrying it, with the reason shown
/// to the actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    command: String,
    message: String,
}

impl Veto {
    /// Veto `command` (uppercased) with `message`
    pub fn new(command: &str, message: impl Into<String>) -> Self {
        Self {
            command: command.trim().to_uppercase(),
            message: message.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Commands that are refused for a thing even though they would otherwise
/// succeed, e.g. dropping a cursed sword. One veto per command; a later veto
/// for the same command replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct Vetoes(BTreeMap<String, Veto>);

impl Vetoes {
    pub fn new<I>(vetoes: I) -> Self
    where
        I: IntoIterator<Item = Veto>,
    {
        Self(
            vetoes
                .into_iter()
                .map(|v| (v.command.clone(), v))
                .collect(),
        )
    }

    /// First veto matching any of `commands`, checked in the order given
    pub fn check(&self, commands: &[&str]) -> Option<&Veto> {
        commands
            .iter()
            .find_map(|cmd| self.0.get(&cmd.to_uppercase()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Attribute for Vetoes {
    fn copy(&self) -> Option<Box<dyn Attribute>> {
        Some(Box::new(self.clone()))
    }

    fn dump(&self) -> String {
        let vetoes: Vec<String> = self
            .0
            .values()
            .map(|v| format!("{}: {:?}", v.command, v.message))
            .collect();
        format!("Vetoes ({}): {}", self.0.len(), vetoes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_returns_first_match() {
        let vetoes = Vetoes::new([
            Veto::new("drop", "It seems to be stuck to your hand."),
            Veto::new("GIVE", "You cannot bear to part with it."),
        ]);

        assert_eq!(vetoes.len(), 2);
        assert!(vetoes.check(&["GET"]).is_none());
        assert!(vetoes.check(&[]).is_none());
        assert_eq!(
            vetoes.check(&["DROP"]).map(Veto::message),
            Some("It seems to be stuck to your hand.")
        );
        assert_eq!(
            vetoes.check(&["GET", "give", "DROP"]).map(Veto::command),
            Some("GIVE")
        );
    }

    #[test]
    fn test_later_veto_replaces_earlier() {
        let vetoes = Vetoes::new([Veto::new("GET", "first"), Veto::new("get", "second")]);

        assert_eq!(vetoes.len(), 1);
        assert_eq!(vetoes.check(&["GET"]).map(Veto::message), Some("second"));
        assert!(vetoes.dump().contains("GET"));
    }
}
