use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;

use super::builder::ComplexBuilder;
use super::complex::{AlternativeComplexes, BiologicalComplex, Side, Sign};
use super::contingency::{Contingency, ContingencyApplicator, ContingencyKind};
use super::molecule::Molecule;
use super::reaction::{Reaction, ReactionContainer};
use super::state::State;

/// Fatal defects in upstream clause resolution or malformed input.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot apply more than two complexes on a reaction (got {0})")]
    TooManyComplexes(usize),
    #[error("reactant side {side} of reaction {name} is already covered by a complex")]
    SideAlreadyCovered { name: String, side: &'static str },
    #[error("root molecule for clause {clause} not found in any alternative complex")]
    RootNotFound { clause: String },
}

/// The boolean contingency input of one abstract reaction, resolved once by
/// exhaustive matching: no clause, one clause, or one clause per reactant
/// side.
#[derive(Debug)]
pub enum ContingencyInput {
    None,
    Single(AlternativeComplexes),
    Double(AlternativeComplexes, AlternativeComplexes),
}

/// Bystander states of a clause: requirements on molecules outside either
/// reactant's resolved graph, with their structurally connected companions
/// split into OR- and AND-joined groups.
#[derive(Debug, Clone, Default)]
struct MissingStates {
    connected_or: Vec<State>,
    connected_and: Vec<State>,
    not_connected: Vec<State>,
}

/// Interface between the realized clause complexes and a reaction container:
/// fans one abstract reaction out into the full set of concrete reactions
/// with assigned complexes, ids and rate expressions.
pub struct ComplexApplicator<'a> {
    container: &'a mut ReactionContainer,
    counter: usize,
    missing: IndexMap<State, MissingStates>,
}

impl<'a> ComplexApplicator<'a> {
    pub fn new(container: &'a mut ReactionContainer) -> ComplexApplicator<'a> {
        ComplexApplicator {
            container,
            counter: 1,
            missing: IndexMap::new(),
        }
    }

    /// Apply the clause input onto the container: before, every reaction has
    /// empty substrate-complex slots; after, each holds one or two complexes
    /// and the container holds one reaction per realized clause combination.
    pub fn apply_complexes(mut self, input: ContingencyInput) -> Result<(), CompileError> {
        let template = self.container.reactions[0].clone();

        let mut prepared: Vec<AlternativeComplexes> = Vec::new();
        match input {
            ContingencyInput::None => {}
            ContingencyInput::Single(clause) => {
                prepared.push(self.prepare(clause)?);
            }
            ContingencyInput::Double(first, second) => {
                prepared.push(self.prepare(first)?);
                prepared.push(self.prepare(second)?);
            }
        }

        // every joint combination of the per-side realizations becomes one
        // concrete reaction; left side enumerated first
        let combinations: Vec<Vec<BiologicalComplex>> = match prepared.len() {
            0 => Vec::new(),
            1 => prepared[0]
                .complexes
                .iter()
                .cloned()
                .map(|c| vec![c])
                .collect(),
            _ => prepared[0]
                .complexes
                .iter()
                .cloned()
                .cartesian_product(prepared[1].complexes.iter().cloned())
                .map(|(l, r)| vec![l, r])
                .collect(),
        };

        if combinations.is_empty() {
            Self::set_basic_substrate_complex(&mut self.container.reactions[0]);
        } else {
            let double = prepared.len() > 1;
            let or_pool: Vec<State> = prepared
                .iter()
                .flat_map(|p| p.or_states.iter().cloned())
                .collect();
            while self.container.len() < combinations.len() {
                self.container.add_reaction(template.clone());
            }
            let both_types = self.both_complex_types_present(&combinations);
            for (i, combination) in combinations.into_iter().enumerate() {
                if self.container.len() > 1 {
                    self.container.reactions[i].rid =
                        format!("{}_{}", self.container.rid, self.counter);
                    self.counter += 1;
                }
                let reaction = &mut self.container.reactions[i];
                Self::add_substrate_complexes(reaction, combination.clone())?;
                if double {
                    Self::propagate_or_sites(reaction, &combination, &or_pool);
                }
                for compl in &combination {
                    Self::update_reaction_rate(reaction, compl, both_types);
                }
            }
        }

        self.apply_missing_states(&template);
        Ok(())
    }

    /// Realize one clause: drop empty placeholders, pick the root among the
    /// reaction's reactants, run the builder, and register bystander states.
    fn prepare(
        &mut self,
        mut clause: AlternativeComplexes,
    ) -> Result<AlternativeComplexes, CompileError> {
        clause.discard_empty();
        let prepared = match self.root_molecule(&clause)? {
            Some(root) => ComplexBuilder::new().build_required_complexes(clause, &root),
            // input-only clause: nothing to build, the complexes only
            // steer the rate
            None => clause,
        };
        self.collect_missing_states(&prepared);
        Ok(prepared)
    }

    /// The left or right reactant of the container's reaction, searched in
    /// every alternative graph of the clause.
    fn root_molecule(
        &self,
        clause: &AlternativeComplexes,
    ) -> Result<Option<Molecule>, CompileError> {
        if clause.get_first_non_empty().is_none() {
            return Ok(None);
        }
        let left = self.container.reactions[0].left_reactant.clone();
        let right = self.container.reactions[0].right_reactant.clone();
        for compl in &clause.complexes {
            let mut found = compl.get_molecules(&left.name, left.mid.as_deref());
            found.extend(compl.get_molecules(&right.name, right.mid.as_deref()));
            if let Some(mol) = found.first() {
                return Ok(Some((*mol).clone()));
            }
        }
        Err(CompileError::RootNotFound {
            clause: clause.name.clone(),
        })
    }

    /// Sign analysis deciding whether the rate law needs two branches.
    pub fn both_complex_types_present(&self, combinations: &[Vec<BiologicalComplex>]) -> bool {
        let reversible = self.container.reactions[0].reversible;
        let mut pos = false;
        let mut neg = false;
        for combination in combinations {
            for compl in combination {
                if reversible && !compl.input_conditions.is_empty() {
                    return true;
                }
                match compl.sign {
                    Sign::Both => return true,
                    Sign::Positive => pos = true,
                    Sign::Negative => neg = true,
                }
            }
        }
        pos && neg
    }

    /// With both complex types present the base rate forks into `_1`
    /// (positive) and `_2` (negative). An input condition additionally turns
    /// the rate into a function of that condition, as a two-way switch when
    /// the sign is `Both` and a one-sided gate otherwise.
    pub fn update_reaction_rate(reaction: &mut Reaction, compl: &BiologicalComplex, both_types: bool) {
        if both_types {
            let name = if compl.sign.counts_as_positive() {
                format!("{}_1", reaction.main_id)
            } else {
                format!("{}_2", reaction.main_id)
            };
            reaction.rate.update_name(name);
        }
        if let Some(condition) = compl.input_conditions.first() {
            let is_switch = compl.sign == Sign::Both;
            reaction.rate.update_function(
                condition.clone(),
                is_switch,
                format!("{}_1", reaction.main_id),
                format!("{}_2", reaction.main_id),
            );
        }
    }

    /// Attach the combination's complexes to the reactant slots they cover;
    /// any side left uncovered gets a trivial single-molecule complex.
    pub fn add_substrate_complexes(
        reaction: &mut Reaction,
        complexes: Vec<BiologicalComplex>,
    ) -> Result<(), CompileError> {
        if complexes.len() > 2 {
            return Err(CompileError::TooManyComplexes(complexes.len()));
        }
        let left = reaction.left_reactant.clone();
        let right = reaction.right_reactant.clone();
        let mut left_covered = false;
        let mut right_covered = false;

        for mut compl in complexes {
            let in_left = !compl.get_molecules(&left.name, left.mid.as_deref()).is_empty();
            let in_right = !compl
                .get_molecules(&right.name, right.mid.as_deref())
                .is_empty();
            if in_left && in_right {
                if left_covered || right_covered {
                    return Err(CompileError::SideAlreadyCovered {
                        name: reaction.name.clone(),
                        side: "LR",
                    });
                }
                if let Some(node) = compl.get_molecule_mut(&left.name, left.mid.as_deref()) {
                    node.merge(&left);
                    node.is_reactant = true;
                }
                if let Some(node) = compl.get_molecule_mut(&right.name, right.mid.as_deref()) {
                    node.merge(&right);
                    node.is_reactant = true;
                }
                compl.side = Some(Side::LR);
                reaction.substrate_complexes.push(compl);
                left_covered = true;
                right_covered = true;
            } else if in_left {
                if left_covered {
                    return Err(CompileError::SideAlreadyCovered {
                        name: reaction.name.clone(),
                        side: "L",
                    });
                }
                if let Some(node) = compl.get_molecule_mut(&left.name, left.mid.as_deref()) {
                    node.merge(&left);
                    node.is_reactant = true;
                }
                compl.side = Some(Side::L);
                reaction.substrate_complexes.push(compl);
                left_covered = true;
            } else if in_right {
                if right_covered {
                    return Err(CompileError::SideAlreadyCovered {
                        name: reaction.name.clone(),
                        side: "R",
                    });
                }
                if let Some(node) = compl.get_molecule_mut(&right.name, right.mid.as_deref()) {
                    node.merge(&right);
                    node.is_reactant = true;
                }
                compl.side = Some(Side::R);
                reaction.substrate_complexes.push(compl);
                right_covered = true;
            }
            // a complex holding neither reactant (input-only placeholder)
            // never occupies a slot
        }

        if !left_covered {
            Self::molecule2complex(left, reaction, Side::L);
        }
        if !right_covered {
            Self::molecule2complex(right, reaction, Side::R);
        }
        Ok(())
    }

    /// Trivial single-molecule substrate complex for an uncovered side.
    pub fn molecule2complex(mol: Molecule, reaction: &mut Reaction, side: Side) {
        reaction
            .substrate_complexes
            .push(BiologicalComplex::from_molecule(mol, Some(side)));
    }

    /// The no-contingency case: each reactant becomes its own trivial
    /// complex, or a single LR complex for a self-reaction.
    pub fn set_basic_substrate_complex(reaction: &mut Reaction) {
        if reaction.is_self_reaction() {
            let mol = reaction.left_reactant.clone();
            Self::molecule2complex(mol, reaction, Side::LR);
        } else {
            let mol = reaction.left_reactant.clone();
            Self::molecule2complex(mol, reaction, Side::L);
            let mol = reaction.right_reactant.clone();
            Self::molecule2complex(mol, reaction, Side::R);
        }
    }

    /// Disjunctive structure on one side still constrains the molecule on
    /// the other side: OR-derived states referencing a reactant no complex
    /// of this combination covers are recorded as sites on that reactant.
    fn propagate_or_sites(
        reaction: &mut Reaction,
        combination: &[BiologicalComplex],
        or_pool: &[State],
    ) {
        let mut uncovered: Vec<String> = Vec::new();
        for name in [
            reaction.left_reactant.name.clone(),
            reaction.right_reactant.name.clone(),
        ] {
            if !combination.iter().any(|c| c.has_molecule(&name)) && !uncovered.contains(&name) {
                uncovered.push(name);
            }
        }
        for name in uncovered {
            for state in or_pool.iter().filter(|s| s.has_component(&name)) {
                if reaction.left_reactant.name == name {
                    reaction.left_reactant.set_site(state.clone());
                }
                if reaction.right_reactant.name == name {
                    reaction.right_reactant.set_site(state.clone());
                }
                for compl in &mut reaction.substrate_complexes {
                    if let Some(node) = compl.get_molecule_mut(&name, None) {
                        node.set_site(state.clone());
                    }
                }
            }
        }
    }

    /// A state only counts as realized when its complex can actually be
    /// attached to the reaction, i.e. when that complex holds a reactant.
    fn state_realized(prepared: &AlternativeComplexes, state: &State, reactants: &[String]) -> bool {
        prepared.complexes.iter().any(|c| {
            reactants.iter().any(|name| c.has_molecule(name))
                && (c.bonds.contains(state)
                    || c.molecules
                        .iter()
                        .any(|m| m.modifications.contains(state) || m.free_sites.contains(state)))
        })
    }

    /// Register clause states with no realization in any attachable complex,
    /// grouped by structural connectivity among themselves.
    fn collect_missing_states(&mut self, prepared: &AlternativeComplexes) {
        let reactants = [
            self.container.reactions[0].left_reactant.name.clone(),
            self.container.reactions[0].right_reactant.name.clone(),
        ];
        let missing: Vec<State> = prepared
            .clause_states()
            .into_iter()
            .filter(|s| !s.is_input() && !Self::state_realized(prepared, s, &reactants))
            .collect();
        if missing.is_empty() {
            return;
        }

        // grow connectivity groups over shared molecule names
        let mut groups: Vec<Vec<State>> = Vec::new();
        for state in missing {
            let names: Vec<String> = state.components().iter().map(|c| c.name.clone()).collect();
            let position = groups.iter().position(|g| {
                g.iter()
                    .any(|s| names.iter().any(|n| s.has_component(n)))
            });
            match position {
                Some(i) => groups[i].push(state),
                None => groups.push(vec![state]),
            }
        }

        for (i, group) in groups.iter().enumerate() {
            let condition = group[0].clone();
            let mut info = MissingStates::default();
            for state in &group[1..] {
                if prepared.or_states.contains(state) {
                    info.connected_or.push(state.clone());
                } else {
                    info.connected_and.push(state.clone());
                }
            }
            for (j, other) in groups.iter().enumerate() {
                if i != j {
                    info.not_connected.extend(other.iter().cloned());
                }
            }
            self.missing.entry(condition).or_insert(info);
        }
    }

    /// For a bond referencing a molecule already present in a substrate
    /// complex, pull the state (and its partner) into that complex.
    fn set_missing_condition_for_type(condition: &State, reaction: &mut Reaction) {
        if !condition.is_bond() {
            return;
        }
        let names: Vec<String> = condition
            .components()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        for compl in &mut reaction.substrate_complexes {
            if names.iter().any(|n| compl.has_molecule(n)) {
                compl.add_state(condition.clone());
            }
        }
    }

    /// Fan out every logically distinct satisfaction/violation of the
    /// bystander states: one required branch, one branch per OR-connected
    /// state, and a final branch requiring all AND-connected states, each on
    /// an independently cloned reaction.
    fn apply_missing_states(&mut self, template: &Reaction) {
        if self.missing.is_empty() {
            return;
        }
        // the branches below grow the container past one reaction, so a lone
        // main reaction gets its sub-id before the sequence continues
        if self.counter == 1 {
            self.container.reactions[0].rid = format!("{}_1", self.container.rid);
            self.counter = 2;
        }
        let cap = ContingencyApplicator::new();
        let target = self.container.name.clone();
        let registry = std::mem::take(&mut self.missing);

        for (condition, info) in registry {
            let mut reaction = template.clone();
            let mut reaction_neg = template.clone();
            Self::set_basic_substrate_complex(&mut reaction);
            Self::set_basic_substrate_complex(&mut reaction_neg);

            Self::set_missing_condition_for_type(&condition, &mut reaction);
            cap.apply_on_reaction(
                &mut reaction,
                &Contingency::new(&target, ContingencyKind::Required, condition.clone()),
            );
            cap.apply_on_reaction(
                &mut reaction_neg,
                &Contingency::new(&target, ContingencyKind::Forbidden, condition.clone()),
            );
            for state in &info.not_connected {
                cap.apply_on_reaction(
                    &mut reaction,
                    &Contingency::new(&target, ContingencyKind::Forbidden, state.clone()),
                );
                cap.apply_on_reaction(
                    &mut reaction_neg,
                    &Contingency::new(&target, ContingencyKind::Forbidden, state.clone()),
                );
            }
            self.push_branch(reaction);

            for state in &info.connected_or {
                let mut branch = reaction_neg.clone();
                Self::set_missing_condition_for_type(state, &mut branch);
                cap.apply_on_reaction(
                    &mut branch,
                    &Contingency::new(&target, ContingencyKind::Required, state.clone()),
                );
                self.push_branch(branch);
                cap.apply_on_reaction(
                    &mut reaction_neg,
                    &Contingency::new(&target, ContingencyKind::Forbidden, state.clone()),
                );
            }

            let mut last = reaction_neg.clone();
            for state in &info.connected_and {
                Self::set_missing_condition_for_type(state, &mut last);
                cap.apply_on_reaction(
                    &mut last,
                    &Contingency::new(&target, ContingencyKind::Required, state.clone()),
                );
            }
            self.push_branch(last);
        }
    }

    /// Append a residual branch under the next free sub-id.
    fn push_branch(&mut self, mut reaction: Reaction) {
        reaction.rid = format!("{}_{}", self.container.rid, self.counter);
        self.counter += 1;
        self.container.add_reaction(reaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contingency::BoolExpr;

    fn container(name: &str, left: &str, right: &str, reversible: bool) -> ReactionContainer {
        let template = Reaction::new(
            name,
            Molecule::new(left),
            Molecule::new(right),
            "k1",
            reversible,
        );
        ReactionContainer::new(name, 1, template)
    }

    fn or_clause(states: Vec<State>, kind: ContingencyKind) -> AlternativeComplexes {
        BoolExpr::Or {
            terms: states.into_iter().map(BoolExpr::state).collect(),
        }
        .resolve("<bool>", kind)
    }

    fn and_clause(states: Vec<State>, kind: ContingencyKind) -> AlternativeComplexes {
        BoolExpr::And {
            terms: states.into_iter().map(BoolExpr::state).collect(),
        }
        .resolve("<bool>", kind)
    }

    #[test]
    fn test_no_contingency_two_sides() {
        let mut cont = container("A_ppi_B", "A", "B", true);
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::None)
            .unwrap();
        let reaction = &cont.reactions[0];
        assert_eq!(reaction.substrate_complexes.len(), 2);
        assert_eq!(reaction.substrate_complexes[0].side, Some(Side::L));
        assert_eq!(reaction.substrate_complexes[1].side, Some(Side::R));
    }

    #[test]
    fn test_no_contingency_self_reaction() {
        let mut cont = container("A_ppi_A", "A", "A", true);
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::None)
            .unwrap();
        let reaction = &cont.reactions[0];
        assert_eq!(reaction.substrate_complexes.len(), 1);
        assert_eq!(reaction.substrate_complexes[0].side, Some(Side::LR));
    }

    #[test]
    fn test_required_or_fans_out() {
        // A_ppi_B; ! <bool>, <bool> = OR(A--C, A--D)
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = or_clause(
            vec![State::bond("A", "C"), State::bond("A", "D")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();

        assert_eq!(cont.len(), 2);
        assert_eq!(cont.reactions[0].rid, "1_1");
        assert_eq!(cont.reactions[1].rid, "1_2");
        let first = cont.reactions[0].complex_on_side(Side::L).unwrap();
        let second = cont.reactions[1].complex_on_side(Side::L).unwrap();
        assert!(first.has_molecule("C") && !first.has_molecule("D"));
        assert!(second.has_molecule("D") && !second.has_molecule("C"));
        // all positive: the rate stays untouched
        assert_eq!(cont.reactions[0].rate.to_string(), "k1");
        assert_eq!(cont.reactions[1].rate.to_string(), "k1");
        // the uncovered side got its trivial complex
        assert!(cont.reactions[0].complex_on_side(Side::R).unwrap().has_molecule("B"));
    }

    #[test]
    fn test_required_and_single_sibling() {
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = and_clause(
            vec![State::bond("A", "C"), State::bond("A", "D")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();
        assert_eq!(cont.len(), 1);
        // single sibling keeps the container base id
        assert_eq!(cont.reactions[0].rid, "1");
        let compl = cont.reactions[0].complex_on_side(Side::L).unwrap();
        assert_eq!(compl.bonds.len(), 2);
    }

    #[test]
    fn test_modifier_splits_rates() {
        // Fus3_ppi_Ste7; k- <C>, <C> = AND(Ste5--Ste7, Ste5--Ste11)
        let mut cont = container("Fus3_ppi_Ste7", "Fus3", "Ste7", false);
        let clause = and_clause(
            vec![State::bond("Ste5", "Ste7"), State::bond("Ste5", "Ste11")],
            ContingencyKind::NegativeModifier,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();

        assert_eq!(cont.len(), 3);
        assert_eq!(cont.reactions[0].rate.name, "k1_1");
        assert_eq!(cont.reactions[1].rate.name, "k1_2");
        assert_eq!(cont.reactions[2].rate.name, "k1_2");
    }

    #[test]
    fn test_both_complex_types_present() {
        let cases = [
            (Sign::Positive, Sign::Negative, false, true),
            (Sign::Positive, Sign::Positive, false, false),
            (Sign::Negative, Sign::Negative, false, false),
            (Sign::Both, Sign::Positive, false, true),
        ];
        for (a, b, reversible, expected) in cases {
            let mut cont = container("A_ppi_B", "A", "B", reversible);
            let applicator = ComplexApplicator::new(&mut cont);
            let mut first = BiologicalComplex::new();
            first.sign = a;
            let mut second = BiologicalComplex::new();
            second.sign = b;
            assert_eq!(
                applicator.both_complex_types_present(&[vec![first], vec![second]]),
                expected,
                "signs {:?}/{:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_both_types_for_reversible_with_input() {
        let mut cont = container("A_ppi_B", "A", "B", true);
        let applicator = ComplexApplicator::new(&mut cont);
        let mut compl = BiologicalComplex::new();
        compl.sign = Sign::Positive;
        compl.input_conditions.insert(State::input("SIG"));
        assert!(applicator.both_complex_types_present(&[vec![compl]]));
    }

    #[test]
    fn test_reversible_input_condition_splits_rate() {
        // positive complex only, but the reaction is reversible and the
        // clause carries an input condition
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = and_clause(
            vec![State::bond("A", "C"), State::input("SIG")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();

        assert_eq!(cont.len(), 1);
        let rate = &cont.reactions[0].rate;
        assert_eq!(rate.name, "k1_1");
        let function = rate.function.as_ref().unwrap();
        assert!(!function.is_switch);
        assert_eq!(function.on_name, "k1_1");
        assert_eq!(function.off_name, "k1_2");
    }

    #[test]
    fn test_input_only_modifier_switches_rate() {
        let mut cont = container("A_ppi_B", "A", "B", false);
        let clause =
            BoolExpr::state(State::input("SIG")).resolve("<s>", ContingencyKind::PositiveModifier);
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();
        assert_eq!(cont.len(), 1);
        let rate = &cont.reactions[0].rate;
        assert!(rate.function.as_ref().unwrap().is_switch);
        assert_eq!(rate.to_string(), "if([SIG],k1_1,k1_2)");
        // input-only complexes never occupy a slot
        assert_eq!(cont.reactions[0].substrate_complexes.len(), 2);
    }

    #[test]
    fn test_double_contingency_is_a_product() {
        let mut cont = container("A_ppi_B", "A", "B", true);
        let left = or_clause(
            vec![State::bond("A", "C"), State::bond("A", "D")],
            ContingencyKind::Required,
        );
        let right = or_clause(
            vec![State::bond("B", "E"), State::bond("B", "F")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Double(left, right))
            .unwrap();

        assert_eq!(cont.len(), 4);
        // left side enumerated first: (C,E), (C,F), (D,E), (D,F)
        let partners: Vec<(bool, bool)> = cont
            .iter()
            .map(|r| {
                let l = r.complex_on_side(Side::L).unwrap();
                let rr = r.complex_on_side(Side::R).unwrap();
                (l.has_molecule("C"), rr.has_molecule("E"))
            })
            .collect();
        assert_eq!(partners, [(true, true), (true, false), (false, true), (false, false)]);
        assert_eq!(cont.reactions[3].rid, "1_4");
    }

    #[test]
    fn test_or_sites_propagate_to_uncovered_reactant() {
        // second alternative of the left clause never touches A, so the OR
        // structure is recorded on the uncovered reactant template
        let mut cont = container("A_ppi_B", "A", "B", true);
        let left = or_clause(
            vec![State::bond("A", "C"), State::bond("C", "D")],
            ContingencyKind::Required,
        );
        let right = or_clause(vec![State::bond("B", "E")], ContingencyKind::Required);
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Double(left, right))
            .unwrap();

        // two main combinations plus the residual branches for C--D, which
        // no attachable complex realizes
        assert_eq!(cont.len(), 4);
        // combination with the C--D alternative leaves A uncovered
        let second = &cont.reactions[1];
        assert!(second
            .left_reactant
            .free_sites
            .contains(&State::bond("A", "C")));
        let trivial = second.complex_on_side(Side::L).unwrap();
        assert!(trivial.get_molecules("A", None)[0]
            .free_sites
            .contains(&State::bond("A", "C")));
    }

    #[test]
    fn test_more_than_two_complexes_is_fatal() {
        let mut reaction = Reaction::new("A_ppi_B", Molecule::new("A"), Molecule::new("B"), "k1", true);
        let complexes = vec![
            BiologicalComplex::new(),
            BiologicalComplex::new(),
            BiologicalComplex::new(),
        ];
        let err = ComplexApplicator::add_substrate_complexes(&mut reaction, complexes).unwrap_err();
        assert!(matches!(err, CompileError::TooManyComplexes(3)));
    }

    #[test]
    fn test_double_coverage_is_fatal() {
        let mut reaction = Reaction::new("A_ppi_B", Molecule::new("A"), Molecule::new("B"), "k1", true);
        let mut first = BiologicalComplex::new();
        first.add_state(State::bond("A", "C"));
        let mut second = BiologicalComplex::new();
        second.add_state(State::bond("A", "D"));
        let err =
            ComplexApplicator::add_substrate_complexes(&mut reaction, vec![first, second]).unwrap_err();
        assert!(matches!(err, CompileError::SideAlreadyCovered { side: "L", .. }));
    }

    #[test]
    fn test_root_missing_everywhere_is_fatal() {
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = and_clause(vec![State::bond("X", "Y")], ContingencyKind::Required);
        let err = ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap_err();
        assert!(matches!(err, CompileError::RootNotFound { .. }));
    }

    #[test]
    fn test_bystander_states_fan_out() {
        // X--Y shares no molecule with the A--C arm: one satisfied branch,
        // one forbidden sibling
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = and_clause(
            vec![State::bond("A", "C"), State::bond("X", "Y")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();

        assert_eq!(cont.len(), 3);
        // residual branches continue the sub-id sequence
        let rids: Vec<&str> = cont.iter().map(|r| r.rid.as_str()).collect();
        assert_eq!(rids, ["1_1", "1_2", "1_3"]);
        // main realization carries the connected arm only
        assert!(cont.reactions[0]
            .complex_on_side(Side::L)
            .unwrap()
            .has_molecule("C"));
        // required branch pulls the bystander bond in
        let required = &cont.reactions[1];
        assert!(required
            .substrate_complexes
            .iter()
            .any(|c| c.bonds.contains(&State::bond("X", "Y"))));
        // forbidden sibling records the state as absent
        let forbidden = &cont.reactions[2];
        assert!(forbidden.substrate_complexes.iter().any(|c| c
            .molecules
            .iter()
            .any(|m| m.free_sites.contains(&State::bond("X", "Y")))));
    }

    #[test]
    fn test_unattached_or_alternative_keeps_its_requirement() {
        // the X--Y alternative holds neither reactant, so its requirement
        // survives as residual branches instead of vanishing
        let mut cont = container("A_ppi_B", "A", "B", true);
        let clause = or_clause(
            vec![State::bond("A", "C"), State::bond("X", "Y")],
            ContingencyKind::Required,
        );
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();

        assert_eq!(cont.len(), 4);
        // every reaction in the container keeps a distinct id
        let rids: Vec<&str> = cont.iter().map(|r| r.rid.as_str()).collect();
        assert_eq!(rids, ["1_1", "1_2", "1_3", "1_4"]);
        // one branch pulls the bond in, one forbids it
        assert!(cont.reactions[2]
            .substrate_complexes
            .iter()
            .any(|c| c.bonds.contains(&State::bond("X", "Y"))));
        assert!(cont.reactions[3].substrate_complexes.iter().any(|c| c
            .molecules
            .iter()
            .any(|m| m.free_sites.contains(&State::bond("X", "Y")))));
    }

    #[test]
    fn test_substrate_slots_filled_exactly_once() {
        let mut cont = container("A_ppi_B", "A", "B", false);
        let clause = and_clause(vec![State::bond("A", "C")], ContingencyKind::Required);
        ComplexApplicator::new(&mut cont)
            .apply_complexes(ContingencyInput::Single(clause))
            .unwrap();
        let reaction = &cont.reactions[0];
        assert_eq!(reaction.substrate_complexes.len(), 2);
        let l = reaction.complex_on_side(Side::L).unwrap();
        // the reactant template was merged into the matched node
        assert!(l.get_molecules("A", None)[0].is_reactant);
    }
}
