//! Equivalence-class register.
//!
//! Maps a node's right-language fingerprint to the canonical node
//! representing that class. Since the graph is minimal, each class has
//! exactly one node, so the register size equals the number of
//! registered equivalence classes.
//!
//! The register holds node ids, not references; an entry is only valid
//! while the minimization discipline is observed (a node is unregistered
//! before any structural change to it).

use super::node::{Fingerprint, NodeId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct Register {
    classes: FxHashMap<Fingerprint, NodeId>,
}

impl Register {
    pub(crate) fn new() -> Self {
        Register::default()
    }

    /// Look up the canonical node for a fingerprint's class.
    pub(crate) fn canonical(&self, fingerprint: &Fingerprint) -> Option<NodeId> {
        self.classes.get(fingerprint).copied()
    }

    /// Make `id` the canonical node for its class.
    pub(crate) fn insert(&mut self, fingerprint: Fingerprint, id: NodeId) {
        self.classes.insert(fingerprint, id);
    }

    /// Drop `id` from the register if it is currently the canonical
    /// node for `fingerprint`; a different canonical node is left alone.
    pub(crate) fn remove_if_canonical(&mut self, fingerprint: &Fingerprint, id: NodeId) {
        if self.classes.get(fingerprint) == Some(&id) {
            self.classes.remove(fingerprint);
        }
    }

    /// Number of registered equivalence classes.
    pub(crate) fn len(&self) -> usize {
        self.classes.len()
    }

    /// All `(fingerprint, node)` entries, for consistency checks.
    #[cfg(test)]
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Fingerprint, NodeId)> {
        self.classes.iter().map(|(fingerprint, &id)| (fingerprint, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg::node::NodeArena;

    #[test]
    fn lookup_register_unregister() {
        let mut arena = NodeArena::new();
        let leaf = arena.new_node(true);
        let a = arena.new_node(false);
        let b = arena.new_node(false);
        arena.add_transition(a, 5, leaf);
        arena.add_transition(b, 5, leaf);

        let mut register = Register::new();
        let fp_a = arena.fingerprint(a);
        assert_eq!(register.canonical(&fp_a), None);
        register.insert(fp_a, a);

        // b has the same right language, so it resolves to a.
        let fp_b = arena.fingerprint(b);
        assert_eq!(register.canonical(&fp_b), Some(a));

        // Unregistering b (not canonical) is a no-op; unregistering a works.
        register.remove_if_canonical(&fp_b, b);
        assert_eq!(register.len(), 1);
        register.remove_if_canonical(&arena.fingerprint(a), a);
        assert_eq!(register.len(), 0);
    }
}
