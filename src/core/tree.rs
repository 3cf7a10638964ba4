use std::collections::VecDeque;

/// Stable handle into a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    pub id: NodeId,
    pub value: T,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Parent/children hierarchy stored as an arena of nodes addressed by integer
/// handles; relationships are ids, not owning references.
#[derive(Debug, Clone, Default)]
pub struct Tree<T> {
    nodes: Vec<TreeNode<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Depth,
    Width,
}

impl<T> Tree<T> {
    pub fn new() -> Tree<T> {
        Tree { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, value: T, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            value,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &TreeNode<T> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<T> {
        &mut self.nodes[id.0]
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Children of `parent`, or the root set when `parent` is `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        match parent {
            Some(id) => self.nodes[id.0].children.clone(),
            None => self.roots(),
        }
    }

    /// Depth- or width-first expansion starting at `from`.
    pub fn expand(&self, from: NodeId, mode: Traversal) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(from);
        while let Some(id) = match mode {
            Traversal::Depth => queue.pop_back(),
            Traversal::Width => queue.pop_front(),
        } {
            result.push(id);
            match mode {
                Traversal::Depth => {
                    for &child in self.nodes[id.0].children.iter().rev() {
                        queue.push_back(child);
                    }
                }
                Traversal::Width => {
                    for &child in &self.nodes[id.0].children {
                        queue.push_back(child);
                    }
                }
            }
        }
        result
    }

    /// Leaves below `from` in depth-first order.
    pub fn leaves(&self, from: NodeId) -> Vec<NodeId> {
        self.expand(from, Traversal::Depth)
            .into_iter()
            .filter(|id| self.nodes[id.0].children.is_empty())
            .collect()
    }

    /// Path from a root down to `id`, inclusive.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor.0].parent {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

impl<T: PartialEq> Tree<T> {
    /// Child of `parent` holding `value`, if any. Backs prefix sharing:
    /// inserting a path reuses existing nodes as long as values match.
    pub fn child_with(&self, parent: Option<NodeId>, value: &T) -> Option<NodeId> {
        self.children_of(parent)
            .into_iter()
            .find(|id| &self.nodes[id.0].value == value)
    }

    /// Insert `path` from the root level, sharing any existing prefix, and
    /// return the id of the final node.
    pub fn insert_path(&mut self, path: Vec<T>) -> Option<NodeId> {
        let mut parent: Option<NodeId> = None;
        for value in path {
            parent = Some(match self.child_with(parent, &value) {
                Some(existing) => existing,
                None => self.add_node(value, parent),
            });
        }
        parent
    }
}
