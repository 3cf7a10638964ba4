use serde::{Deserialize, Serialize};
use std::fmt;

/// One molecule-side of a state: molecule name plus an optional binding domain.
/// Domain names are assigned upstream; here they are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Component {
    pub fn new(name: &str) -> Component {
        Component {
            name: name.to_string(),
            domain: None,
        }
    }

    pub fn with_domain(name: &str, domain: &str) -> Component {
        Component {
            name: name.to_string(),
            domain: Some(domain.to_string()),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}_[{}]", self.name, domain),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// Association between two molecules, e.g. A--B.
    Bond,
    /// Covalent modification with a level, e.g. A-{P}.
    Modification { value: String },
    /// Global input condition, e.g. [SIG]; selects a rate branch
    /// instead of gating complex membership.
    Input,
}

/// A binding/modification relation between one or two molecule components,
/// or an input condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub kind: StateKind,
    pub first: Component,
    #[serde(default)]
    pub second: Option<Component>,
}

impl State {
    pub fn bond(first: &str, second: &str) -> State {
        State {
            kind: StateKind::Bond,
            first: Component::new(first),
            second: Some(Component::new(second)),
        }
    }

    pub fn modification(target: &str, value: &str) -> State {
        State {
            kind: StateKind::Modification {
                value: value.to_string(),
            },
            first: Component::new(target),
            second: None,
        }
    }

    pub fn input(condition: &str) -> State {
        State {
            kind: StateKind::Input,
            first: Component::new(condition),
            second: None,
        }
    }

    pub fn is_input(&self) -> bool {
        self.kind == StateKind::Input
    }

    pub fn is_bond(&self) -> bool {
        self.kind == StateKind::Bond
    }

    pub fn components(&self) -> Vec<&Component> {
        match &self.second {
            Some(second) => vec![&self.first, second],
            None => vec![&self.first],
        }
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components().iter().any(|c| c.name == name)
    }

    /// The component on the other end of a bond, seen from `name`.
    pub fn partner_of(&self, name: &str) -> Option<&Component> {
        let second = self.second.as_ref()?;
        if self.first.name == name {
            Some(second)
        } else if second.name == name {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            StateKind::Bond => match &self.second {
                Some(second) => write!(f, "{}--{}", self.first, second),
                None => write!(f, "{}--?", self.first),
            },
            StateKind::Modification { value } => write!(f, "{}-{{{}}}", self.first, value),
            StateKind::Input => write!(f, "[{}]", self.first.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(State::bond("A", "B").to_string(), "A--B");
        assert_eq!(State::modification("A", "P").to_string(), "A-{P}");
        assert_eq!(State::input("SIG").to_string(), "[SIG]");
        let domained = State {
            kind: StateKind::Bond,
            first: Component::with_domain("A", "AssocB"),
            second: Some(Component::with_domain("B", "AssocA")),
        };
        assert_eq!(domained.to_string(), "A_[AssocB]--B_[AssocA]");
    }

    #[test]
    fn test_partner_of() {
        let state = State::bond("A", "B");
        assert_eq!(state.partner_of("A").unwrap().name, "B");
        assert_eq!(state.partner_of("B").unwrap().name, "A");
        assert!(state.partner_of("C").is_none());
    }

    #[test]
    fn test_has_component() {
        let state = State::bond("A", "B");
        assert!(state.has_component("A"));
        assert!(state.has_component("B"));
        assert!(!state.has_component("X"));
        assert!(!State::input("SIG").is_bond());
    }
}
