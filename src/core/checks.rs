use std::collections::HashSet;

use super::loader::{EffectorJSON, NetworkJSON};

pub struct NetworkChecker {}

impl NetworkChecker {
    pub fn all_checks(network: &NetworkJSON) {
        match NetworkChecker::check_reactions(network) {
            Ok(_) => println!("Reaction declarations are consistent!"),
            Err(err) => eprintln!("Reaction check failed: {}", err),
        }

        match NetworkChecker::check_contingency_targets(network) {
            Ok(_) => println!("All contingency targets are declared reactions!"),
            Err(err) => eprintln!("Contingency target check failed: {}", err),
        }

        match NetworkChecker::check_clause_references(network) {
            Ok(_) => println!("All clause references are defined!"),
            Err(err) => eprintln!("Clause reference check failed: {}", err),
        }

        match NetworkChecker::check_contingency_arity(network) {
            Ok(_) => println!("Contingency counts are within bounds!"),
            Err(err) => eprintln!("Contingency arity check failed: {}", err),
        }
    }

    pub fn check_reactions(network: &NetworkJSON) -> Result<(), String> {
        let mut seen = HashSet::new();
        for reaction in &network.reactions {
            if reaction.left.is_empty() || reaction.right.is_empty() {
                return Err(format!(
                    "Reaction '{}' is missing a reactant name",
                    reaction.name
                ));
            }
            if !seen.insert(&reaction.name) {
                return Err(format!("Reaction '{}' is declared twice", reaction.name));
            }
        }
        Ok(())
    }

    pub fn check_contingency_targets(network: &NetworkJSON) -> Result<(), String> {
        let names: HashSet<&str> = network.reactions.iter().map(|r| r.name.as_str()).collect();
        for cont in &network.contingencies {
            if !names.contains(cont.target.as_str()) {
                return Err(format!(
                    "Contingency target '{}' is not a declared reaction",
                    cont.target
                ));
            }
        }
        Ok(())
    }

    pub fn check_clause_references(network: &NetworkJSON) -> Result<(), String> {
        for cont in &network.contingencies {
            if let EffectorJSON::Named(name) = &cont.effector {
                if !network.clauses.contains_key(name) {
                    return Err(format!(
                        "Contingency on '{}' references undefined clause '{}'",
                        cont.target, name
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn check_contingency_arity(network: &NetworkJSON) -> Result<(), String> {
        for reaction in &network.reactions {
            let count = network
                .contingencies
                .iter()
                .filter(|c| c.target == reaction.name)
                .count();
            if count > 2 {
                return Err(format!(
                    "Reaction '{}' carries {} contingencies, at most two are supported",
                    reaction.name, count
                ));
            }
        }
        Ok(())
    }
}
