use std::fmt;

use super::state::State;

/// A molecule instance inside a complex or reactant slot.
///
/// `partners` are bonds this molecule participates in, `free_sites` are bonds
/// required to be absent, `modifications`/`bare_sites` likewise for
/// modification states. Two molecules are the same node when name and
/// instance id match.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub name: String,
    pub mid: Option<String>,
    pub partners: Vec<State>,
    pub free_sites: Vec<State>,
    pub modifications: Vec<State>,
    pub bare_sites: Vec<State>,
    pub is_reactant: bool,
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Molecule) -> bool {
        self.name == other.name && self.mid == other.mid
    }
}

impl Molecule {
    pub fn new(name: &str) -> Molecule {
        Molecule {
            name: name.to_string(),
            mid: None,
            partners: Vec::new(),
            free_sites: Vec::new(),
            modifications: Vec::new(),
            bare_sites: Vec::new(),
            is_reactant: false,
        }
    }

    pub fn with_mid(name: &str, mid: &str) -> Molecule {
        let mut mol = Molecule::new(name);
        mol.mid = Some(mid.to_string());
        mol
    }

    /// Does `mid` match this instance? `None` matches any instance.
    pub fn matches(&self, name: &str, mid: Option<&str>) -> bool {
        if self.name != name {
            return false;
        }
        match mid {
            None => true,
            Some(mid) => self.mid.as_deref() == Some(mid),
        }
    }

    pub fn add_partner(&mut self, state: State) {
        if !self.partners.contains(&state) {
            self.partners.push(state);
        }
    }

    pub fn add_modification(&mut self, state: State) {
        if !self.modifications.contains(&state) {
            self.modifications.push(state);
        }
    }

    /// Record a binding site that must be free.
    pub fn set_site(&mut self, state: State) {
        if !self.free_sites.contains(&state) {
            self.free_sites.push(state);
        }
    }

    /// Record a modification site that must be unmodified.
    pub fn set_bare_site(&mut self, state: State) {
        if !self.bare_sites.contains(&state) {
            self.bare_sites.push(state);
        }
    }

    /// Union of the non-bond constraints of two nodes describing the same
    /// molecule. Bond membership is owned by the complex, so partners are
    /// left to the caller.
    pub fn merge_constraints(&mut self, other: &Molecule) {
        for state in &other.free_sites {
            self.set_site(state.clone());
        }
        for state in &other.modifications {
            self.add_modification(state.clone());
        }
        for state in &other.bare_sites {
            self.set_bare_site(state.clone());
        }
    }

    /// Union of the site lists of two nodes describing the same molecule,
    /// e.g. a reactant template merged into its matched complex node.
    pub fn merge(&mut self, other: &Molecule) {
        for state in &other.partners {
            self.add_partner(state.clone());
        }
        for state in &other.free_sites {
            self.set_site(state.clone());
        }
        for state in &other.modifications {
            self.add_modification(state.clone());
        }
        for state in &other.bare_sites {
            self.set_bare_site(state.clone());
        }
        self.is_reactant = self.is_reactant || other.is_reactant;
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.mid {
            Some(mid) => write!(f, "{}#{}", self.name, mid),
            None => write!(f, "{}", self.name),
        }
    }
}
