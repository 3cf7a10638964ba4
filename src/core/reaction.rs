use std::fmt;

use super::complex::{BiologicalComplex, Side};
use super::molecule::Molecule;
use super::rate::Rate;

/// One concrete reaction: reactant templates, substrate-complex slots (empty
/// before complex application, filled after), a rate and a stable id.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub rid: String,
    pub name: String,
    /// Base id for derived rate names (`<main_id>_1` / `<main_id>_2`).
    pub main_id: String,
    pub left_reactant: Molecule,
    pub right_reactant: Molecule,
    pub substrate_complexes: Vec<BiologicalComplex>,
    pub rate: Rate,
    pub reversible: bool,
}

impl Reaction {
    pub fn new(name: &str, left: Molecule, right: Molecule, rate: &str, reversible: bool) -> Reaction {
        Reaction {
            rid: String::new(),
            name: name.to_string(),
            main_id: rate.to_string(),
            left_reactant: left,
            right_reactant: right,
            substrate_complexes: Vec::new(),
            rate: Rate::new(rate),
            reversible,
        }
    }

    /// Do both reactant slots name the same molecule identity?
    pub fn is_self_reaction(&self) -> bool {
        self.left_reactant == self.right_reactant
    }

    pub fn complex_on_side(&self, side: Side) -> Option<&BiologicalComplex> {
        self.substrate_complexes
            .iter()
            .find(|c| c.side == Some(side))
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let arrow = if self.reversible { "<->" } else { "->" };
        write!(f, "{}: {} {}", self.rid, self.name, arrow)?;
        for compl in &self.substrate_complexes {
            let side = match compl.side {
                Some(Side::L) => "L",
                Some(Side::R) => "R",
                Some(Side::LR) => "LR",
                None => "?",
            };
            write!(f, " [{} {}]", side, compl)?;
        }
        write!(f, " @ {}", self.rate)
    }
}

/// Ordered, growable set of reactions descended from one abstract rule
/// statement; `rid` is the stable base every child id derives from.
#[derive(Debug)]
pub struct ReactionContainer {
    pub name: String,
    pub rid: usize,
    pub reactions: Vec<Reaction>,
}

impl ReactionContainer {
    pub fn new(name: &str, rid: usize, mut template: Reaction) -> ReactionContainer {
        template.rid = rid.to_string();
        ReactionContainer {
            name: name.to_string(),
            rid,
            reactions: vec![template],
        }
    }

    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Reaction> {
        self.reactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_reaction() {
        let reaction = Reaction::new("A_ppi_A", Molecule::new("A"), Molecule::new("A"), "k1", true);
        assert!(reaction.is_self_reaction());
        let reaction = Reaction::new("A_ppi_B", Molecule::new("A"), Molecule::new("B"), "k1", true);
        assert!(!reaction.is_self_reaction());
    }

    #[test]
    fn test_container_base_id() {
        let template = Reaction::new("A_ppi_B", Molecule::new("A"), Molecule::new("B"), "k1", true);
        let container = ReactionContainer::new("A_ppi_B", 3, template);
        assert_eq!(container.len(), 1);
        assert_eq!(container.reactions[0].rid, "3");
    }
}
