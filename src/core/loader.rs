use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use thiserror::Error;

use super::applicator::{CompileError, ComplexApplicator, ContingencyInput};
use super::complex::AlternativeComplexes;
use super::contingency::{BoolExpr, ContingencyKind};
use super::molecule::Molecule;
use super::reaction::{Reaction, ReactionContainer};

/// Top-level network description: abstract reactions, named boolean clauses
/// and the contingencies wiring clauses to reactions.
#[derive(Debug, Deserialize)]
pub struct NetworkJSON {
    pub reactions: Vec<ReactionJSON>,
    #[serde(default)]
    pub clauses: HashMap<String, BoolExpr>,
    #[serde(default)]
    pub contingencies: Vec<ContingencyJSON>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionJSON {
    pub name: String,
    pub left: String,
    pub right: String,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub reversible: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContingencyJSON {
    pub target: String,
    pub kind: ContingencyKind,
    pub effector: EffectorJSON,
}

/// Either a reference to a named clause or an inline boolean expression.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EffectorJSON {
    Named(String),
    Inline(BoolExpr),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read network file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse network file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("contingency on {target} references undefined clause {clause}")]
    UnknownClause { target: String, clause: String },
    #[error("reaction {target} carries {count} contingencies, at most two are supported")]
    TooManyContingencies { target: String, count: usize },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

pub fn load(path: &str) -> Result<NetworkJSON, LoadError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn resolve_effector(
    network: &NetworkJSON,
    cont: &ContingencyJSON,
) -> Result<AlternativeComplexes, LoadError> {
    match &cont.effector {
        EffectorJSON::Inline(expr) => Ok(expr.resolve(&cont.target, cont.kind)),
        EffectorJSON::Named(name) => {
            let expr = network
                .clauses
                .get(name)
                .ok_or_else(|| LoadError::UnknownClause {
                    target: cont.target.clone(),
                    clause: name.clone(),
                })?;
            Ok(expr.resolve(name, cont.kind))
        }
    }
}

/// Compile every abstract reaction into its fanned-out container. Container
/// base ids are assigned in declaration order, starting at 1; a reaction
/// without an explicit rate gets `k<base id>`.
pub fn compile_network(network: &NetworkJSON) -> Result<Vec<ReactionContainer>, LoadError> {
    let mut containers = Vec::new();
    for (i, reaction) in network.reactions.iter().enumerate() {
        let rid = i + 1;
        let rate = match &reaction.rate {
            Some(rate) => rate.clone(),
            None => format!("k{}", rid),
        };
        let template = Reaction::new(
            &reaction.name,
            Molecule::new(&reaction.left),
            Molecule::new(&reaction.right),
            &rate,
            reaction.reversible,
        );
        let mut container = ReactionContainer::new(&reaction.name, rid, template);

        let mut clauses = Vec::new();
        for cont in network
            .contingencies
            .iter()
            .filter(|c| c.target == reaction.name)
        {
            clauses.push(resolve_effector(network, cont)?);
        }
        let input = match clauses.len() {
            0 => ContingencyInput::None,
            1 => {
                let mut iter = clauses.into_iter();
                match iter.next() {
                    Some(clause) => ContingencyInput::Single(clause),
                    None => ContingencyInput::None,
                }
            }
            2 => {
                let mut iter = clauses.into_iter();
                match (iter.next(), iter.next()) {
                    (Some(first), Some(second)) => ContingencyInput::Double(first, second),
                    _ => ContingencyInput::None,
                }
            }
            count => {
                return Err(LoadError::TooManyContingencies {
                    target: reaction.name.clone(),
                    count,
                })
            }
        };
        ComplexApplicator::new(&mut container).apply_complexes(input)?;
        containers.push(container);
    }
    Ok(containers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"{
        "reactions": [
            {"name": "A_ppi_B", "left": "A", "right": "B", "reversible": true},
            {"name": "C_ppi_D", "left": "C", "right": "D", "rate": "kd"}
        ],
        "clauses": {
            "<b>": {"op": "or", "terms": [
                {"op": "state", "state": {"kind": "bond",
                    "first": {"name": "A"}, "second": {"name": "C"}}},
                {"op": "state", "state": {"kind": "bond",
                    "first": {"name": "A"}, "second": {"name": "D"}}}
            ]}
        },
        "contingencies": [
            {"target": "A_ppi_B", "kind": "!", "effector": "<b>"}
        ]
    }"#;

    fn parse(text: &str) -> NetworkJSON {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_network() {
        let network = parse(NETWORK);
        assert_eq!(network.reactions.len(), 2);
        assert!(network.reactions[0].reversible);
        assert_eq!(network.reactions[1].rate.as_deref(), Some("kd"));
        assert!(network.clauses.contains_key("<b>"));
        assert_eq!(network.contingencies[0].kind, ContingencyKind::Required);
    }

    #[test]
    fn test_compile_network_fans_out() {
        let network = parse(NETWORK);
        let containers = compile_network(&network).unwrap();
        assert_eq!(containers.len(), 2);
        // OR over two bindings: two sibling reactions
        assert_eq!(containers[0].len(), 2);
        assert_eq!(containers[0].reactions[0].rid, "1_1");
        // untouched reaction keeps its single entry and explicit rate
        assert_eq!(containers[1].len(), 1);
        assert_eq!(containers[1].reactions[0].rid, "2");
        assert_eq!(containers[1].reactions[0].rate.name, "kd");
    }

    #[test]
    fn test_default_rate_follows_base_id() {
        let network = parse(
            r#"{"reactions": [{"name": "A_ppi_B", "left": "A", "right": "B"}]}"#,
        );
        let containers = compile_network(&network).unwrap();
        assert_eq!(containers[0].reactions[0].rate.name, "k1");
    }

    #[test]
    fn test_unknown_clause_is_an_error() {
        let network = parse(
            r#"{
                "reactions": [{"name": "A_ppi_B", "left": "A", "right": "B"}],
                "contingencies": [
                    {"target": "A_ppi_B", "kind": "!", "effector": "<missing>"}
                ]
            }"#,
        );
        let err = compile_network(&network).unwrap_err();
        assert!(matches!(err, LoadError::UnknownClause { .. }));
    }

    #[test]
    fn test_inline_effector() {
        let network = parse(
            r#"{
                "reactions": [{"name": "A_ppi_B", "left": "A", "right": "B"}],
                "contingencies": [
                    {"target": "A_ppi_B", "kind": "x", "effector":
                        {"op": "state", "state": {"kind": "bond",
                            "first": {"name": "A"}, "second": {"name": "C"}}}}
                ]
            }"#,
        );
        let containers = compile_network(&network).unwrap();
        let compl = containers[0].reactions[0]
            .complex_on_side(crate::core::complex::Side::L)
            .unwrap();
        let a = &compl.get_molecules("A", None)[0];
        assert_eq!(a.free_sites.len(), 1);
    }
}
