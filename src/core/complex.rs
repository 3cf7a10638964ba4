use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;

use super::contingency::ContingencyKind;
use super::molecule::Molecule;
use super::state::{State, StateKind};

/// Which reactant slot a substrate complex fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    L,
    R,
    LR,
}

/// Tri-state sign of a realized complex. `Both` marks complexes that act as
/// positive and negative at the same time (rate-switch input conditions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Positive,
    Negative,
    Both,
}

impl Sign {
    /// True unless strictly negative; mirrors how the positive branch of a
    /// rate is selected.
    pub fn counts_as_positive(&self) -> bool {
        !matches!(self, Sign::Negative)
    }
}

/// An undirected, possibly cyclic graph of molecules joined by bond states.
#[derive(Debug, Clone, Default)]
pub struct BiologicalComplex {
    pub cid: String,
    pub side: Option<Side>,
    pub sign: Sign,
    pub molecules: Vec<Molecule>,
    pub bonds: Vec<State>,
    pub input_conditions: IndexSet<State>,
}

impl BiologicalComplex {
    pub fn new() -> BiologicalComplex {
        BiologicalComplex::default()
    }

    /// A complex holding a single unbound molecule.
    pub fn from_molecule(mol: Molecule, side: Option<Side>) -> BiologicalComplex {
        let mut compl = BiologicalComplex::new();
        compl.side = side;
        compl.molecules.push(mol);
        compl
    }

    pub fn is_placeholder(&self) -> bool {
        self.molecules.is_empty()
    }

    fn ensure_molecule(&mut self, name: &str) -> usize {
        match self.molecules.iter().position(|m| m.name == name) {
            Some(idx) => idx,
            None => {
                self.molecules.push(Molecule::new(name));
                self.molecules.len() - 1
            }
        }
    }

    /// Insert a state, creating molecule nodes as needed. Input conditions go
    /// to the rate-branch set instead of the graph.
    pub fn add_state(&mut self, state: State) {
        match &state.kind {
            StateKind::Input => {
                self.input_conditions.insert(state);
            }
            StateKind::Modification { .. } => {
                let idx = self.ensure_molecule(&state.first.name);
                self.molecules[idx].add_modification(state);
            }
            StateKind::Bond => {
                let first = state.first.name.clone();
                let second = match &state.second {
                    Some(c) => c.name.clone(),
                    None => return,
                };
                let i = self.ensure_molecule(&first);
                self.molecules[i].add_partner(state.clone());
                let j = self.ensure_molecule(&second);
                self.molecules[j].add_partner(state.clone());
                if !self.bonds.contains(&state) {
                    self.bonds.push(state);
                }
            }
        }
    }

    /// Record a state as forbidden on whichever of its endpoints is present.
    /// If neither endpoint is in the complex yet, the first one is created so
    /// the requirement has a carrier.
    pub fn mark_absent(&mut self, state: State) {
        match &state.kind {
            StateKind::Input => {
                self.input_conditions.insert(state);
            }
            StateKind::Modification { .. } => {
                let idx = self.ensure_molecule(&state.first.name);
                self.molecules[idx].set_bare_site(state);
            }
            StateKind::Bond => {
                let names: Vec<String> =
                    state.components().iter().map(|c| c.name.clone()).collect();
                let mut marked = false;
                for name in &names {
                    if let Some(idx) = self.molecules.iter().position(|m| &m.name == name) {
                        self.molecules[idx].set_site(state.clone());
                        marked = true;
                    }
                }
                if !marked {
                    let idx = self.ensure_molecule(&names[0]);
                    self.molecules[idx].set_site(state);
                }
            }
        }
    }

    pub fn get_molecules(&self, name: &str, mid: Option<&str>) -> Vec<&Molecule> {
        self.molecules
            .iter()
            .filter(|m| m.matches(name, mid))
            .collect()
    }

    pub fn get_molecule_mut(&mut self, name: &str, mid: Option<&str>) -> Option<&mut Molecule> {
        self.molecules.iter_mut().find(|m| m.matches(name, mid))
    }

    pub fn has_molecule(&self, name: &str) -> bool {
        self.molecules.iter().any(|m| m.name == name)
    }

    /// Neighbor names of `name` in bond-insertion order.
    fn neighbors(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        for bond in &self.bonds {
            if let Some(partner) = bond.partner_of(name) {
                if !result.contains(&partner.name) {
                    result.push(partner.name.clone());
                }
            }
        }
        result
    }

    fn molecule_by_name(&self, name: &str) -> Option<&Molecule> {
        self.molecules.iter().find(|m| m.name == name)
    }

    fn collect_leaf_paths(&self, at: &str, current: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        let next: Vec<String> = self
            .neighbors(at)
            .into_iter()
            .filter(|n| !current.contains(n))
            .collect();
        if next.is_empty() {
            out.push(current.clone());
            return;
        }
        for n in next {
            current.push(n.clone());
            self.collect_leaf_paths(&n, current, out);
            current.pop();
        }
    }

    /// All root-to-leaf arms hanging off `root`, with `root` itself excluded.
    pub fn get_branches(&self, root: &str) -> Vec<Vec<Molecule>> {
        let mut paths = Vec::new();
        let mut current = vec![root.to_string()];
        self.collect_leaf_paths(root, &mut current, &mut paths);
        paths
            .into_iter()
            .filter(|p| p.len() > 1)
            .map(|p| {
                p.into_iter()
                    .skip(1)
                    .filter_map(|name| self.molecule_by_name(&name).cloned())
                    .collect()
            })
            .collect()
    }

    /// One sub-complex per direct neighbor of `root`: everything reachable
    /// from that neighbor without passing through `root`.
    pub fn get_top_branches(&self, root: &str) -> Vec<BiologicalComplex> {
        let mut branches = Vec::new();
        for start in self.neighbors(root) {
            let mut branch = BiologicalComplex::new();
            let mut queue = vec![start.clone()];
            let mut seen = vec![root.to_string(), start.clone()];
            if let Some(mol) = self.molecule_by_name(&start) {
                let mut node = mol.clone();
                node.partners.clear();
                branch.molecules.push(node);
            }
            while let Some(at) = queue.pop() {
                for bond in &self.bonds {
                    if let Some(partner) = bond.partner_of(&at) {
                        if partner.name == root {
                            continue;
                        }
                        branch.add_state(bond.clone());
                        if !seen.contains(&partner.name) {
                            seen.push(partner.name.clone());
                            queue.push(partner.name.clone());
                        }
                    }
                }
            }
            branches.push(branch);
        }
        branches
    }

    fn collect_paths(
        &self,
        at: &str,
        goal: &str,
        current: &mut Vec<String>,
        out: &mut Vec<Vec<String>>,
    ) {
        if at == goal {
            out.push(current.clone());
            return;
        }
        for n in self.neighbors(at) {
            if current.contains(&n) {
                continue;
            }
            current.push(n.clone());
            self.collect_paths(&n, goal, current, out);
            current.pop();
        }
    }

    /// Every simple path between two molecules; empty when disconnected.
    pub fn get_paths(&self, from: &Molecule, to: &Molecule) -> Vec<Vec<Molecule>> {
        if !self.has_molecule(&from.name) || !self.has_molecule(&to.name) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut current = vec![from.name.clone()];
        self.collect_paths(&from.name, &to.name, &mut current, &mut out);
        out.into_iter()
            .map(|p| {
                p.into_iter()
                    .filter_map(|name| self.molecule_by_name(&name).cloned())
                    .collect()
            })
            .collect()
    }

    /// Minimal-length path via breadth-first search; ties broken by
    /// bond-insertion order. Empty when disconnected.
    pub fn get_shortest_path(&self, from: &Molecule, to: &Molecule) -> Vec<Molecule> {
        if !self.has_molecule(&from.name) || !self.has_molecule(&to.name) {
            return Vec::new();
        }
        let mut predecessor: HashMap<String, String> = HashMap::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(from.name.clone());
        let mut seen = vec![from.name.clone()];
        while let Some(at) = queue.pop_front() {
            if at == to.name {
                let mut path = vec![at.clone()];
                let mut cursor = at;
                while let Some(prev) = predecessor.get(&cursor) {
                    path.push(prev.clone());
                    cursor = prev.clone();
                }
                path.reverse();
                return path
                    .into_iter()
                    .filter_map(|name| self.molecule_by_name(&name).cloned())
                    .collect();
            }
            for n in self.neighbors(&at) {
                if !seen.contains(&n) {
                    seen.push(n.clone());
                    predecessor.insert(n.clone(), at.clone());
                    queue.push_back(n);
                }
            }
        }
        Vec::new()
    }

    fn next_instance_suffix(&self, name: &str) -> String {
        let count = self.molecules.iter().filter(|m| m.name == name).count();
        (count + 1).to_string()
    }

    /// Merge `other` into a copy of `self` by identifying `shared` in both.
    /// Molecules of `other` whose names collide with unrelated nodes of `self`
    /// are kept as new instances with a numeric suffix id; the result carries
    /// the union of both node and edge sets.
    pub fn complex_addition(&self, other: &BiologicalComplex, shared: &Molecule) -> BiologicalComplex {
        let mut result = self.clone();
        let mut map: HashMap<usize, usize> = HashMap::new();

        let shared_other = other.molecules.iter().position(|m| m == shared);
        let shared_self = result.molecules.iter().position(|m| m == shared);
        if let (Some(so), Some(ss)) = (shared_other, shared_self) {
            map.insert(so, ss);
            let constraints = other.molecules[so].clone();
            result.molecules[ss].merge_constraints(&constraints);
        }

        let mut placed = vec![false; other.bonds.len()];
        loop {
            let mut progress = false;
            for (bi, bond) in other.bonds.iter().enumerate() {
                if placed[bi] {
                    continue;
                }
                let names: Vec<String> = bond.components().iter().map(|c| c.name.clone()).collect();
                if names.len() < 2 {
                    placed[bi] = true;
                    continue;
                }
                let u = other.molecules.iter().position(|m| m.name == names[0]);
                let v = other.molecules.iter().position(|m| m.name == names[1]);
                let (u, v) = match (u, v) {
                    (Some(u), Some(v)) => (u, v),
                    _ => {
                        placed[bi] = true;
                        continue;
                    }
                };
                let (anchor, free) = if map.contains_key(&u) {
                    (u, v)
                } else if map.contains_key(&v) {
                    (v, u)
                } else {
                    continue;
                };
                if map.contains_key(&free) {
                    // cycle closure between two already-identified nodes
                    let ra = map[&anchor];
                    let rf = map[&free];
                    if !result.bonds.contains(bond) {
                        result.bonds.push(bond.clone());
                        result.molecules[ra].add_partner(bond.clone());
                        result.molecules[rf].add_partner(bond.clone());
                    }
                } else if result.bonds.contains(bond) {
                    // edge already realized: identify the free endpoint with
                    // the existing node holding it
                    let free_name = &other.molecules[free].name;
                    if let Some(rf) = result
                        .molecules
                        .iter()
                        .position(|m| &m.name == free_name && m.partners.contains(bond))
                    {
                        map.insert(free, rf);
                        let constraints = other.molecules[free].clone();
                        result.molecules[rf].merge_constraints(&constraints);
                    }
                } else {
                    let ra = map[&anchor];
                    let mut node = other.molecules[free].clone();
                    node.partners.clear();
                    if result.has_molecule(&node.name) {
                        node.mid = Some(result.next_instance_suffix(&node.name));
                    }
                    result.molecules.push(node);
                    let rf = result.molecules.len() - 1;
                    map.insert(free, rf);
                    result.bonds.push(bond.clone());
                    result.molecules[ra].add_partner(bond.clone());
                    result.molecules[rf].add_partner(bond.clone());
                }
                placed[bi] = true;
                progress = true;
            }
            if progress {
                continue;
            }
            // a component disconnected from the shared molecule still
            // contributes its edges: seed one endpoint as a fresh node and
            // resume placement
            let mut seeded = false;
            for (bi, bond) in other.bonds.iter().enumerate() {
                if placed[bi] {
                    continue;
                }
                let name = &bond.components()[0].name;
                if let Some(idx) = other.molecules.iter().position(|m| &m.name == name) {
                    if !map.contains_key(&idx) {
                        let mut node = other.molecules[idx].clone();
                        node.partners.clear();
                        if result.has_molecule(&node.name) {
                            node.mid = Some(result.next_instance_suffix(&node.name));
                        }
                        result.molecules.push(node);
                        map.insert(idx, result.molecules.len() - 1);
                        seeded = true;
                    }
                }
                break;
            }
            if !seeded {
                break;
            }
        }

        // isolated leftovers; partners referencing unplaced bonds are stale
        for (i, mol) in other.molecules.iter().enumerate() {
            if !map.contains_key(&i) {
                let mut node = mol.clone();
                node.partners.retain(|b| result.bonds.contains(b));
                if result.has_molecule(&node.name) {
                    node.mid = Some(result.next_instance_suffix(&node.name));
                }
                result.molecules.push(node);
            }
        }
        for condition in &other.input_conditions {
            result.input_conditions.insert(condition.clone());
        }
        result
    }
}

impl fmt::Display for BiologicalComplex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&str> = self.molecules.iter().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        write!(f, "Complex: {}", names.join(", "))
    }
}

/// The realized set of complexes produced for one boolean contingency clause.
/// `or_states`/`and_states` record the clause's disjunctive/conjunctive state
/// split, used later for cross-side propagation and bystander handling.
#[derive(Debug, Clone, Default)]
pub struct AlternativeComplexes {
    pub name: String,
    pub kind: ContingencyKind,
    pub complexes: Vec<BiologicalComplex>,
    pub or_states: Vec<State>,
    pub and_states: Vec<State>,
}

impl AlternativeComplexes {
    pub fn new(name: &str, kind: ContingencyKind) -> AlternativeComplexes {
        AlternativeComplexes {
            name: name.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.complexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }

    /// First complex that actually holds molecules, skipping input-only
    /// placeholders.
    pub fn get_first_non_empty(&self) -> Option<&BiologicalComplex> {
        self.complexes.iter().find(|c| !c.is_placeholder())
    }

    /// Drop complexes that carry neither molecules nor an input condition.
    pub fn discard_empty(&mut self) {
        self.complexes
            .retain(|c| !c.molecules.is_empty() || !c.input_conditions.is_empty());
    }

    /// All states of the clause, AND-joined first.
    pub fn clause_states(&self) -> Vec<State> {
        let mut states = self.and_states.clone();
        for state in &self.or_states {
            if !states.contains(state) {
                states.push(state.clone());
            }
        }
        states
    }
}
