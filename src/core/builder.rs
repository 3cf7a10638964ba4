use itertools::Itertools;
use std::collections::VecDeque;

use super::complex::{AlternativeComplexes, BiologicalComplex, Sign};
use super::contingency::ContingencyKind;
use super::molecule::Molecule;
use super::state::State;
use super::tree::{NodeId, Tree};

/// Turns the positive graphs of one boolean clause into the realized complex
/// set: required complexes for `!`, the exhaustive negative complement for
/// `x`, both for the rate modifiers.
#[derive(Debug, Default)]
pub struct ComplexBuilder;

impl ComplexBuilder {
    pub fn new() -> ComplexBuilder {
        ComplexBuilder
    }

    /// Level-order (breadth-first, nearest-first) linearization of every
    /// state reachable from `root`. Modifications of a molecule come before
    /// the bonds leading away from it; ties follow insertion order.
    pub fn get_states_from_complex(
        &self,
        compl: &BiologicalComplex,
        root: &Molecule,
    ) -> Vec<State> {
        let mut states: Vec<State> = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut seen = vec![root.name.clone()];
        queue.push_back(root.name.clone());
        while let Some(at) = queue.pop_front() {
            if let Some(mol) = compl.molecules.iter().find(|m| m.name == at) {
                for modification in &mol.modifications {
                    if !states.contains(modification) {
                        states.push(modification.clone());
                    }
                }
            }
            for bond in &compl.bonds {
                if let Some(partner) = bond.partner_of(&at) {
                    if !states.contains(bond) {
                        states.push(bond.clone());
                    }
                    if !seen.contains(&partner.name) {
                        seen.push(partner.name.clone());
                        queue.push_back(partner.name.clone());
                    }
                }
            }
        }
        states
    }

    /// The full realized complex set for one clause. Positive alternatives
    /// sharing a construction prefix share it once (state trie); input-only
    /// placeholder complexes pass through untouched.
    pub fn build_required_complexes(
        &self,
        alternatives: AlternativeComplexes,
        root: &Molecule,
    ) -> AlternativeComplexes {
        let mut result = AlternativeComplexes::new(&alternatives.name, alternatives.kind);
        result.or_states = alternatives.or_states.clone();
        result.and_states = alternatives.and_states.clone();

        let (graphs, placeholders): (Vec<BiologicalComplex>, Vec<BiologicalComplex>) = alternatives
            .complexes
            .into_iter()
            .partition(|c| !c.is_placeholder());

        match alternatives.kind {
            ContingencyKind::Required => {
                result.complexes = self.build_positive_complexes(&graphs, root);
            }
            ContingencyKind::Forbidden => {
                result.complexes = self.build_negative_combinations(&graphs, root);
            }
            ContingencyKind::PositiveModifier | ContingencyKind::NegativeModifier => {
                result.complexes = self.build_positive_complexes(&graphs, root);
                result
                    .complexes
                    .extend(self.build_negative_combinations(&graphs, root));
            }
        }
        result.complexes.extend(placeholders);

        for (i, compl) in result.complexes.iter_mut().enumerate() {
            compl.cid = (i + 1).to_string();
        }
        result
    }

    /// One variant per linearized state: that state absent, every earlier
    /// state in the order fixed. Together the variants realize NOT semantics.
    pub fn build_negative_complexes(
        &self,
        compl: &BiologicalComplex,
        root: &Molecule,
    ) -> Vec<BiologicalComplex> {
        let states = self.get_states_from_complex(compl, root);
        let mut variants = Vec::new();
        for i in 0..states.len() {
            let mut variant = BiologicalComplex::new();
            variant.molecules.push(Molecule::new(&root.name));
            for state in &states[..i] {
                variant.add_state(state.clone());
            }
            variant.mark_absent(states[i].clone());
            variant.sign = Sign::Negative;
            variant.input_conditions = compl.input_conditions.clone();
            variants.push(variant);
        }
        variants
    }

    fn build_positive_complexes(
        &self,
        graphs: &[BiologicalComplex],
        root: &Molecule,
    ) -> Vec<BiologicalComplex> {
        let mut trie: Tree<State> = Tree::new();
        // leaf -> index of the first alternative that produced it
        let mut leaves: Vec<(NodeId, usize)> = Vec::new();
        let mut unlinearized: Vec<usize> = Vec::new();

        for (i, graph) in graphs.iter().enumerate() {
            let start = root_for(graph, root);
            let sequence = self.get_states_from_complex(graph, &start);
            if sequence.is_empty() {
                unlinearized.push(i);
                continue;
            }
            if let Some(leaf) = trie.insert_path(sequence) {
                if !leaves.iter().any(|(id, _)| *id == leaf) {
                    leaves.push((leaf, i));
                }
            }
        }

        let mut out = Vec::new();
        for (leaf, source) in leaves {
            let graph = &graphs[source];
            let start = root_for(graph, root);
            let mut compl = BiologicalComplex::new();
            if graph.has_molecule(&start.name) {
                compl.molecules.push(Molecule::new(&start.name));
            }
            for id in trie.path_from_root(leaf) {
                compl.add_state(trie.node(id).value.clone());
            }
            carry_constraints(&mut compl, graph);
            compl.sign = Sign::Positive;
            out.push(compl);
        }
        for i in unlinearized {
            // molecules but no reachable states: keep the graph as given
            let mut compl = graphs[i].clone();
            compl.sign = Sign::Positive;
            out.push(compl);
        }
        out
    }

    /// Negative complement across all alternatives: NOT(OR) means every
    /// alternative is violated, so per-alternative variants are combined as a
    /// Cartesian product and merged on the root molecule.
    fn build_negative_combinations(
        &self,
        graphs: &[BiologicalComplex],
        root: &Molecule,
    ) -> Vec<BiologicalComplex> {
        let variant_lists: Vec<Vec<BiologicalComplex>> = graphs
            .iter()
            .map(|g| self.build_negative_complexes(g, &root_for(g, root)))
            .collect();
        if variant_lists.iter().any(|l| l.is_empty()) {
            return Vec::new();
        }
        variant_lists
            .into_iter()
            .multi_cartesian_product()
            .map(|combo| {
                let mut iter = combo.into_iter();
                let mut merged = match iter.next() {
                    Some(first) => first,
                    None => return BiologicalComplex::new(),
                };
                for variant in iter {
                    merged = merged.complex_addition(&variant, &Molecule::new(&root.name));
                }
                merged.sign = Sign::Negative;
                merged
            })
            .collect()
    }
}

fn root_for(graph: &BiologicalComplex, root: &Molecule) -> Molecule {
    if graph.has_molecule(&root.name) {
        root.clone()
    } else {
        graph
            .molecules
            .first()
            .cloned()
            .unwrap_or_else(|| root.clone())
    }
}

/// Copy the forbidden-site/modification constraints and input conditions of
/// the source alternative onto the freshly constructed complex.
fn carry_constraints(compl: &mut BiologicalComplex, source: &BiologicalComplex) {
    for mol in &source.molecules {
        if let Some(node) = compl.get_molecule_mut(&mol.name, mol.mid.as_deref()) {
            node.merge_constraints(mol);
        }
    }
    for condition in &source.input_conditions {
        compl.input_conditions.insert(condition.clone());
    }
}
