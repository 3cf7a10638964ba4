use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::complex::{AlternativeComplexes, BiologicalComplex, Sign};
use super::reaction::Reaction;
use super::state::State;

/// Relation kind of a contingency in the source notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContingencyKind {
    #[default]
    #[serde(rename = "!")]
    Required,
    #[serde(rename = "x")]
    Forbidden,
    #[serde(rename = "k+")]
    PositiveModifier,
    #[serde(rename = "k-")]
    NegativeModifier,
}

impl ContingencyKind {
    /// k+/k- do not gate the reaction, they branch its rate: both the
    /// satisfying and the violating complexes are realized.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            ContingencyKind::PositiveModifier | ContingencyKind::NegativeModifier
        )
    }
}

/// A single state requirement/forbiddance on a target reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Contingency {
    pub target: String,
    pub kind: ContingencyKind,
    pub state: State,
}

impl Contingency {
    pub fn new(target: &str, kind: ContingencyKind, state: State) -> Contingency {
        Contingency {
            target: target.to_string(),
            kind,
            state,
        }
    }
}

/// Boolean combination of states, as given in a clause definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BoolExpr {
    And { terms: Vec<BoolExpr> },
    Or { terms: Vec<BoolExpr> },
    Not { term: Box<BoolExpr> },
    State { state: State },
}

/// A signed state inside one disjunctive-normal-form alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub state: State,
    pub positive: bool,
}

impl BoolExpr {
    pub fn state(state: State) -> BoolExpr {
        BoolExpr::State { state }
    }

    /// Expand to disjunctive normal form: one literal set per alternative.
    /// `Not` is pushed down to the leaves via De Morgan.
    pub fn dnf(&self) -> Vec<Vec<Literal>> {
        match self {
            BoolExpr::State { state } => vec![vec![Literal {
                state: state.clone(),
                positive: true,
            }]],
            BoolExpr::Not { term } => term.negated_dnf(),
            BoolExpr::Or { terms } => terms.iter().flat_map(|t| t.dnf()).collect(),
            BoolExpr::And { terms } => product_of(terms.iter().map(|t| t.dnf()).collect()),
        }
    }

    fn negated_dnf(&self) -> Vec<Vec<Literal>> {
        match self {
            BoolExpr::State { state } => vec![vec![Literal {
                state: state.clone(),
                positive: false,
            }]],
            BoolExpr::Not { term } => term.dnf(),
            // not(and) = or(nots); not(or) = and(nots)
            BoolExpr::And { terms } => terms.iter().flat_map(|t| t.negated_dnf()).collect(),
            BoolExpr::Or { terms } => {
                product_of(terms.iter().map(|t| t.negated_dnf()).collect())
            }
        }
    }

    /// Realize the clause as alternative positive complexes: one complex per
    /// DNF alternative, forbidden literals marked absent, input states kept
    /// aside as rate-branch conditions.
    pub fn resolve(&self, name: &str, kind: ContingencyKind) -> AlternativeComplexes {
        let alternatives = self.dnf();
        let mut result = AlternativeComplexes::new(name, kind);

        let positive_sets: Vec<Vec<&State>> = alternatives
            .iter()
            .map(|alt| {
                alt.iter()
                    .filter(|l| l.positive && !l.state.is_input())
                    .map(|l| &l.state)
                    .collect()
            })
            .collect();
        for alt in &positive_sets {
            for state in alt {
                let everywhere = positive_sets.iter().all(|set| set.contains(state));
                let bucket = if everywhere {
                    &mut result.and_states
                } else {
                    &mut result.or_states
                };
                if !bucket.contains(state) {
                    bucket.push((*state).clone());
                }
            }
        }

        for alt in alternatives {
            let mut compl = BiologicalComplex::new();
            for literal in alt {
                if literal.state.is_input() {
                    compl.input_conditions.insert(literal.state);
                } else if literal.positive {
                    compl.add_state(literal.state);
                } else {
                    compl.mark_absent(literal.state);
                }
            }
            compl.sign = if compl.is_placeholder() && !compl.input_conditions.is_empty() {
                match kind {
                    ContingencyKind::Required => Sign::Positive,
                    ContingencyKind::Forbidden => Sign::Negative,
                    _ => Sign::Both,
                }
            } else {
                Sign::Positive
            };
            result.complexes.push(compl);
        }
        result
    }
}

fn product_of(sets: Vec<Vec<Vec<Literal>>>) -> Vec<Vec<Literal>> {
    sets.into_iter()
        .multi_cartesian_product()
        .map(|combo| {
            let mut merged: Vec<Literal> = Vec::new();
            for literal in combo.into_iter().flatten() {
                if !merged.contains(&literal) {
                    merged.push(literal);
                }
            }
            merged
        })
        .collect()
}

/// Applies one single-state contingency onto a reaction's recorded state
/// requirements. Consumed by the complex applicator as an opaque operation.
#[derive(Debug, Default)]
pub struct ContingencyApplicator;

impl ContingencyApplicator {
    pub fn new() -> ContingencyApplicator {
        ContingencyApplicator
    }

    pub fn apply_on_reaction(&self, reaction: &mut Reaction, cont: &Contingency) {
        let names: Vec<String> = if cont.state.is_input() {
            Vec::new()
        } else {
            cont.state.components().iter().map(|c| c.name.clone()).collect()
        };
        for compl in &mut reaction.substrate_complexes {
            if names.iter().any(|n| compl.has_molecule(n)) {
                Self::record(compl, cont);
                return;
            }
        }
        if let Some(compl) = reaction.substrate_complexes.first_mut() {
            Self::record(compl, cont);
        }
    }

    fn record(compl: &mut BiologicalComplex, cont: &Contingency) {
        match cont.kind {
            ContingencyKind::Required | ContingencyKind::PositiveModifier => {
                compl.add_state(cont.state.clone())
            }
            ContingencyKind::Forbidden | ContingencyKind::NegativeModifier => {
                compl.mark_absent(cont.state.clone())
            }
        }
    }
}
