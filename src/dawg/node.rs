//! Mutable graph nodes and the arena that owns them.
//!
//! Nodes are identified by their index in the arena's backing vector.
//! Indices are assigned monotonically and never reused, so a node id is
//! stable for the node's lifetime. Nodes that become unreachable (after
//! a merge or a removal) simply stay in the arena unused; the whole
//! arena is dropped when the graph is frozen.

use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Arena index of a mutable node.
pub(crate) type NodeId = usize;

/// The source node every graph starts with.
pub(crate) const SOURCE: NodeId = 0;

/// Ordered outgoing edge list: `(label, target)` pairs sorted by label.
pub(crate) type EdgeList = SmallVec<[(u16, NodeId); 4]>;

/// Right-language fingerprint of a node.
///
/// Two nodes are equivalent iff their accept flags match, their label
/// sets match, and corresponding children are the *same node by
/// identity*. Minimization proceeds leaves-first, so children are
/// already canonical when a parent is fingerprinted, which reduces deep
/// right-language equality to this shallow comparison.
#[derive(Debug, Clone, Eq)]
pub(crate) struct Fingerprint {
    hash: u64,
    accept: bool,
    edges: EdgeList,
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.accept == other.accept && self.edges == other.edges
    }
}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// A mutable graph node.
#[derive(Debug, Clone)]
pub(crate) struct DawgNode {
    /// True if some stored string ends at this node.
    accept: bool,
    /// Outgoing edges, sorted by label.
    edges: EdgeList,
    /// Number of transitions in the graph targeting this node.
    incoming: u32,
    /// Memoized fingerprint hash; cleared on any structural change.
    cached_hash: Option<u64>,
}

impl DawgNode {
    fn new(accept: bool) -> Self {
        DawgNode {
            accept,
            edges: EdgeList::new(),
            incoming: 0,
            cached_hash: None,
        }
    }

    /// Position of `label` in the sorted edge list.
    ///
    /// Adaptive strategy: linear scan for small fanout (cache-friendly),
    /// binary search above the crossover.
    #[inline]
    fn edge_position(&self, label: u16) -> Result<usize, usize> {
        if self.edges.len() < 16 {
            for (pos, &(l, _)) in self.edges.iter().enumerate() {
                if l == label {
                    return Ok(pos);
                }
                if l > label {
                    return Err(pos);
                }
            }
            Err(self.edges.len())
        } else {
            self.edges.binary_search_by_key(&label, |&(l, _)| l)
        }
    }
}

/// Arena storage for mutable nodes.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena {
    nodes: Vec<DawgNode>,
}

impl NodeArena {
    /// Create an arena holding only the (non-accepting) source node.
    pub(crate) fn new() -> Self {
        NodeArena {
            nodes: vec![DawgNode::new(false)],
        }
    }

    /// Allocate a fresh node with no edges and no incoming transitions.
    pub(crate) fn new_node(&mut self, accept: bool) -> NodeId {
        self.nodes.push(DawgNode::new(accept));
        self.nodes.len() - 1
    }

    pub(crate) fn is_accept(&self, id: NodeId) -> bool {
        self.nodes[id].accept
    }

    /// Set the accept flag, returning whether it changed.
    pub(crate) fn set_accept(&mut self, id: NodeId, accept: bool) -> bool {
        let node = &mut self.nodes[id];
        if node.accept == accept {
            return false;
        }
        node.accept = accept;
        node.cached_hash = None;
        true
    }

    pub(crate) fn incoming(&self, id: NodeId) -> u32 {
        self.nodes[id].incoming
    }

    /// A confluence node is the target of two or more transitions.
    pub(crate) fn is_confluence(&self, id: NodeId) -> bool {
        self.nodes[id].incoming >= 2
    }

    pub(crate) fn edges(&self, id: NodeId) -> &[(u16, NodeId)] {
        &self.nodes[id].edges
    }

    pub(crate) fn out_count(&self, id: NodeId) -> usize {
        self.nodes[id].edges.len()
    }

    /// Follow the transition labeled `label` out of `id`.
    pub(crate) fn target(&self, id: NodeId, label: u16) -> Option<NodeId> {
        let node = &self.nodes[id];
        node.edge_position(label).ok().map(|pos| node.edges[pos].1)
    }

    /// Insert (or overwrite) the transition `from --label--> to`.
    pub(crate) fn add_transition(&mut self, from: NodeId, label: u16, to: NodeId) {
        let pos = self.nodes[from].edge_position(label);
        match pos {
            Ok(pos) => {
                let old = self.nodes[from].edges[pos].1;
                self.nodes[from].edges[pos].1 = to;
                self.nodes[old].incoming -= 1;
            }
            Err(pos) => {
                self.nodes[from].edges.insert(pos, (label, to));
            }
        }
        self.nodes[from].cached_hash = None;
        self.nodes[to].incoming += 1;
    }

    /// Remove the transition out of `from` labeled `label`.
    pub(crate) fn remove_transition(&mut self, from: NodeId, label: u16) {
        let pos = self.nodes[from]
            .edge_position(label)
            .unwrap_or_else(|_| panic!("no transition to remove on label {label}"));
        let (_, old) = self.nodes[from].edges.remove(pos);
        self.nodes[from].cached_hash = None;
        self.nodes[old].incoming -= 1;
    }

    /// Swap the target of the transition `from --label--> old_to` to
    /// `new_to`, adjusting both incoming counts.
    pub(crate) fn reassign(&mut self, from: NodeId, label: u16, old_to: NodeId, new_to: NodeId) {
        let pos = self.nodes[from]
            .edge_position(label)
            .unwrap_or_else(|_| panic!("no transition to reassign on label {label}"));
        debug_assert_eq!(self.nodes[from].edges[pos].1, old_to);
        self.nodes[from].edges[pos].1 = new_to;
        self.nodes[from].cached_hash = None;
        self.nodes[old_to].incoming -= 1;
        self.nodes[new_to].incoming += 1;
    }

    /// Clone a node: same accept flag, same child pointers. Each child's
    /// incoming count is incremented; the clone starts with none.
    pub(crate) fn clone_node(&mut self, id: NodeId) -> NodeId {
        let accept = self.nodes[id].accept;
        let edges = self.nodes[id].edges.clone();
        for &(_, child) in &edges {
            self.nodes[child].incoming += 1;
        }
        self.nodes.push(DawgNode {
            accept,
            edges,
            incoming: 0,
            cached_hash: None,
        });
        self.nodes.len() - 1
    }

    /// Clone a node and redirect `parent`'s transition on `label` from
    /// the original to the clone. Used by confluence splitting.
    pub(crate) fn clone_with_parent(&mut self, id: NodeId, parent: NodeId, label: u16) -> NodeId {
        let clone = self.clone_node(id);
        self.reassign(parent, label, id, clone);
        clone
    }

    /// Decrement the incoming count of every child of `id`.
    ///
    /// Called when `id` is about to be merged away: its outgoing edges
    /// semantically disappear even though the node object stays in the
    /// arena.
    pub(crate) fn decrement_child_incomings(&mut self, id: NodeId) {
        let targets: SmallVec<[NodeId; 4]> =
            self.nodes[id].edges.iter().map(|&(_, c)| c).collect();
        for child in targets {
            self.nodes[child].incoming -= 1;
        }
    }

    /// Clear the memoized fingerprint hash of `id`.
    pub(crate) fn clear_cached_hash(&mut self, id: NodeId) {
        self.nodes[id].cached_hash = None;
    }

    /// Compute (and memoize the hash of) the node's fingerprint.
    pub(crate) fn fingerprint(&mut self, id: NodeId) -> Fingerprint {
        let node = &mut self.nodes[id];
        let hash = match node.cached_hash {
            Some(hash) => hash,
            None => {
                let mut hasher = FxHasher::default();
                node.accept.hash(&mut hasher);
                for &(label, child) in &node.edges {
                    label.hash(&mut hasher);
                    child.hash(&mut hasher);
                }
                let hash = hasher.finish();
                node.cached_hash = Some(hash);
                hash
            }
        };
        Fingerprint {
            hash,
            accept: node.accept,
            edges: node.edges.clone(),
        }
    }

    /// Total number of nodes ever allocated, including unreachable ones.
    pub(crate) fn allocated(&self) -> usize {
        self.nodes.len()
    }
}
