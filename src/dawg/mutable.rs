//! The mutable graph and its incremental construction algorithms.
//!
//! Insertion and deletion keep the graph minimal at all times. The core
//! moves are:
//!
//! - **replace-or-register**: post-order over a string's transition
//!   path, merging each node into the canonical representative of its
//!   right-language class or registering it as that representative.
//! - **confluence splitting**: before a shared path segment is mutated,
//!   every node from the first confluence node onward is cloned so the
//!   change cannot leak into other strings' paths.
//!
//! Batch insertion defers the minimization of each string's divergent
//! tail until the next string is seen, which makes inserting
//! prefix-sharing runs (sorted input in particular) amortized constant
//! work per character.

use super::node::{NodeArena, NodeId, SOURCE};
use super::register::Register;
use super::{WordGraph, WordGraphNode};
use std::collections::BTreeSet;

/// A word graph under construction.
///
/// All mutation goes through [`DawgSet`](super::set::DawgSet); this type
/// is exposed for read-only traversal through [`WordGraph`].
#[derive(Debug, Clone)]
pub struct MutableDawg {
    arena: NodeArena,
    register: Register,
    /// Every symbol that labels at least one transition.
    symbols: BTreeSet<u16>,
    /// Number of distinct stored strings.
    size: usize,
    /// Number of transitions in the reachable graph.
    transition_count: usize,
}

impl MutableDawg {
    pub(crate) fn new() -> Self {
        MutableDawg {
            arena: NodeArena::new(),
            register: Register::new(),
            symbols: BTreeSet::new(),
            size: 0,
            transition_count: 0,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn transition_count(&self) -> usize {
        self.transition_count
    }

    pub(crate) fn equivalence_class_count(&self) -> usize {
        self.register.len()
    }

    pub(crate) fn symbols(&self) -> &BTreeSet<u16> {
        &self.symbols
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Handle to the source node for generic traversal.
    pub(crate) fn source_ref(&self) -> MutableNodeRef<'_> {
        MutableNodeRef {
            graph: self,
            id: SOURCE,
        }
    }

    /// Nodes reachable from the source, excluding the source itself.
    pub(crate) fn node_count(&self) -> usize {
        let mut visited = vec![false; self.arena.allocated()];
        let mut stack = vec![SOURCE];
        visited[SOURCE] = true;
        let mut count = 0;
        while let Some(id) = stack.pop() {
            for &(_, child) in self.arena.edges(id) {
                if !visited[child] {
                    visited[child] = true;
                    count += 1;
                    stack.push(child);
                }
            }
        }
        count
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Walk the transition path of `units` from `origin`.
    fn path_target(&self, origin: NodeId, units: &[u16]) -> Option<NodeId> {
        let mut current = origin;
        for &label in units {
            current = self.arena.target(current, label)?;
        }
        Some(current)
    }

    pub(crate) fn contains_units(&self, units: &[u16]) -> bool {
        self.path_target(SOURCE, units)
            .is_some_and(|end| self.arena.is_accept(end))
    }

    /// Length of the longest prefix of `units` whose transition path
    /// already exists from the source.
    pub(crate) fn longest_prefix_len(&self, units: &[u16]) -> usize {
        let mut current = SOURCE;
        for (i, &label) in units.iter().enumerate() {
            match self.arena.target(current, label) {
                Some(next) => current = next,
                None => return i,
            }
        }
        units.len()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Index in `prev` where minimization must resume before `cur` is
    /// inserted.
    ///
    /// `None` when `prev` is a prefix of `cur`: the new string only
    /// extends the right languages along `prev`'s path, so nothing may
    /// be merged yet. Otherwise the longest common prefix length: the
    /// divergent tail of `prev` is final and safe to minimize.
    pub(crate) fn minimization_start_index(prev: &[u16], cur: &[u16]) -> Option<usize> {
        if cur.starts_with(prev) {
            None
        } else {
            Some(
                prev.iter()
                    .zip(cur.iter())
                    .take_while(|(a, b)| a == b)
                    .count(),
            )
        }
    }

    /// Minimize the tail `prev[start..]` of the previously inserted
    /// string, whose path is guaranteed to exist.
    pub(crate) fn minimize_tail(&mut self, prev: &[u16], start: usize) {
        let origin = self
            .path_target(SOURCE, &prev[..start])
            .expect("previously inserted string has a transition path");
        self.replace_or_register(origin, &prev[start..]);
    }

    /// Run replace-or-register over the full path of the last inserted
    /// string. Must be called once after a batch of insertions.
    pub(crate) fn finish_batch(&mut self, last: &[u16]) {
        if !last.is_empty() {
            self.replace_or_register(SOURCE, last);
        }
    }

    /// Insert one string and immediately re-minimize its path.
    pub(crate) fn add_one(&mut self, units: &[u16]) -> bool {
        let changed = self.add_string_internal(units);
        self.finish_batch(units);
        changed
    }

    /// Insert a string without the trailing minimization pass.
    pub(crate) fn add_string_internal(&mut self, units: &[u16]) -> bool {
        let prefix_len = self.longest_prefix_len(units);
        let (prefix, suffix) = units.split_at(prefix_len);

        let confluence = self.first_confluence(SOURCE, prefix);

        // Entries for nodes beyond the first confluence node stay put:
        // those nodes are about to be cloned and the originals keep
        // representing their classes.
        match confluence {
            Some((index, _)) => self.unregister_path(&prefix[..index]),
            None => self.unregister_path(prefix),
        }

        if let Some((index, pivot)) = confluence {
            self.clone_transition_path(pivot, &prefix[..index + 1], &prefix[index + 1..]);
        }

        let attach = self
            .path_target(SOURCE, prefix)
            .expect("prefix path exists after cloning");
        self.add_suffix_chain(attach, suffix)
    }

    /// Append a fresh chain of nodes for `suffix` at `origin`, or mark
    /// `origin` accepting when the suffix is empty.
    fn add_suffix_chain(&mut self, origin: NodeId, suffix: &[u16]) -> bool {
        if suffix.is_empty() {
            if self.arena.set_accept(origin, true) {
                self.size += 1;
                return true;
            }
            return false;
        }
        let mut current = origin;
        for (i, &label) in suffix.iter().enumerate() {
            let next = self.arena.new_node(i == suffix.len() - 1);
            self.arena.add_transition(current, label, next);
            self.symbols.insert(label);
            self.transition_count += 1;
            current = next;
        }
        self.size += 1;
        true
    }

    /// First confluence node on the path of `units` from `origin`,
    /// together with the index of the transition that reached it.
    fn first_confluence(&self, origin: NodeId, units: &[u16]) -> Option<(usize, NodeId)> {
        let mut current = origin;
        for (i, &label) in units.iter().enumerate() {
            current = self.arena.target(current, label)?;
            if self.arena.is_confluence(current) {
                return Some((i, current));
            }
        }
        None
    }

    /// Drop register entries for every node on the path of `units` from
    /// the source and clear their memoized hashes; they are about to be
    /// restructured and re-examined.
    fn unregister_path(&mut self, units: &[u16]) {
        let mut current = SOURCE;
        for &label in units {
            current = self
                .arena
                .target(current, label)
                .expect("register cleanup follows an existing path");
            let fingerprint = self.arena.fingerprint(current);
            self.register.remove_if_canonical(&fingerprint, current);
            self.arena.clear_cached_hash(current);
        }
    }

    /// Clone the sub-path `rest` hanging off the confluence node
    /// `pivot`, right to left, so that subsequent changes apply to a
    /// path no other string shares.
    ///
    /// `path_to_pivot` is the transition path from the source up to and
    /// including the transition into `pivot`; cloning the pivot itself
    /// redirects its parent's transition to the clone.
    fn clone_transition_path(&mut self, pivot: NodeId, path_to_pivot: &[u16], rest: &[u16]) {
        let mut last_target = self
            .path_target(pivot, rest)
            .expect("confluence sub-path exists");
        let mut last_clone: Option<NodeId> = None;
        let mut last_label: u16 = 0;

        for i in (0..=rest.len()).rev() {
            let current_target = self
                .path_target(pivot, &rest[..i])
                .expect("confluence sub-path exists");
            let clone = if i == 0 {
                let (label, parent_path) = path_to_pivot
                    .split_last()
                    .expect("path into a confluence node is never empty");
                let parent = self
                    .path_target(SOURCE, parent_path)
                    .expect("parent of the confluence node exists");
                self.arena.clone_with_parent(pivot, parent, *label)
            } else {
                self.arena.clone_node(current_target)
            };
            self.transition_count += self.arena.out_count(clone);

            if let Some(previous) = last_clone {
                self.arena.reassign(clone, last_label, last_target, previous);
                last_target = current_target;
            }
            last_clone = Some(clone);
            last_label = if i > 0 { rest[i - 1] } else { 0 };
        }
    }

    /// Post-order minimization over the path of `units` from `origin`.
    fn replace_or_register(&mut self, origin: NodeId, units: &[u16]) {
        let label = units[0];
        let child = self
            .arena
            .target(origin, label)
            .expect("minimization follows an existing path");

        if self.arena.out_count(child) > 0 && units.len() > 1 {
            self.replace_or_register(child, &units[1..]);
        }

        let fingerprint = self.arena.fingerprint(child);
        match self.register.canonical(&fingerprint) {
            None => self.register.insert(fingerprint, child),
            Some(canonical) if canonical != child => {
                // The child's children were already canonicalized by the
                // recursion, so only its own out-edges vanish here.
                self.arena.decrement_child_incomings(child);
                self.transition_count -= self.arena.out_count(child);
                self.arena.reassign(origin, label, child, canonical);
            }
            Some(_) => {}
        }
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Remove a stored string; returns false (leaving the graph
    /// untouched) when it is absent.
    pub(crate) fn remove_units(&mut self, units: &[u16]) -> bool {
        if !self.contains_units(units) {
            return false;
        }
        if units.is_empty() {
            self.arena.set_accept(SOURCE, false);
            self.size -= 1;
            return true;
        }

        // Entries must be dropped before any restructuring: the register
        // is keyed by fingerprint, and a node mutated while registered
        // would strand its entry under the old key. Nodes from the first
        // confluence onward are about to be replaced by clones, so their
        // originals keep representing their classes.
        match self.first_confluence(SOURCE, units) {
            Some((index, _)) => self.unregister_path(&units[..index]),
            None => self.unregister_path(units),
        }

        // Make the whole path private to this string before touching it.
        self.split_transition_path(SOURCE, units);

        let end = self
            .path_target(SOURCE, units)
            .expect("stored string has a transition path");

        if self.arena.out_count(end) == 0 {
            let internal_len = units.len() - 1;
            let sole_len = self.sole_internal_path_length(units);
            if sole_len == internal_len {
                self.arena.remove_transition(SOURCE, units[0]);
                self.transition_count -= units.len();
            } else {
                let split_at = internal_len - sole_len;
                let keeper = self
                    .path_target(SOURCE, &units[..split_at])
                    .expect("shared prefix path exists");
                self.arena.remove_transition(keeper, units[split_at]);
                self.transition_count -= units.len() - split_at;
                self.replace_or_register(SOURCE, &units[..split_at]);
            }
            self.size -= 1;
            true
        } else {
            let changed = self.arena.set_accept(end, false);
            self.replace_or_register(SOURCE, units);
            if changed {
                self.size -= 1;
            }
            changed
        }
    }

    /// Clone every confluence node on the path of `units` from `origin`
    /// (recursively, so the whole path ends up unshared).
    fn split_transition_path(&mut self, origin: NodeId, units: &[u16]) {
        if let Some((index, pivot)) = self.first_confluence(origin, units) {
            let parent = self
                .path_target(origin, &units[..index])
                .expect("confluence parent exists");
            let clone = self.arena.clone_with_parent(pivot, parent, units[index]);
            self.transition_count += self.arena.out_count(clone);
            self.split_transition_path(clone, &units[index + 1..]);
        }
    }

    /// Number of trailing internal nodes on `units`'s path that are
    /// used by no other string: each has at most one outgoing
    /// transition and is not an accept node. The final node is not
    /// inspected; its outgoing transitions lie outside the path.
    fn sole_internal_path_length(&self, units: &[u16]) -> usize {
        let mut internal = Vec::with_capacity(units.len().saturating_sub(1));
        let mut current = SOURCE;
        for &label in &units[..units.len() - 1] {
            current = self
                .arena
                .target(current, label)
                .expect("stored string has a transition path");
            internal.push(current);
        }
        internal
            .iter()
            .rev()
            .take_while(|&&id| self.arena.out_count(id) <= 1 && !self.arena.is_accept(id))
            .count()
    }
}

/// Node handle into a [`MutableDawg`].
#[derive(Debug, Clone, Copy)]
pub struct MutableNodeRef<'a> {
    graph: &'a MutableDawg,
    id: NodeId,
}

impl<'a> WordGraph for &'a MutableDawg {
    type Node = MutableNodeRef<'a>;

    fn source(&self) -> MutableNodeRef<'a> {
        self.source_ref()
    }

    fn contains(&self, term: &str) -> bool {
        let units: Vec<u16> = term.encode_utf16().collect();
        self.contains_units(&units)
    }
}

impl<'a> WordGraphNode for MutableNodeRef<'a> {
    fn is_accept(&self) -> bool {
        self.graph.arena.is_accept(self.id)
    }

    fn transition(&self, label: u16) -> Option<Self> {
        let graph = self.graph;
        graph
            .arena
            .target(self.id, label)
            .map(|id| MutableNodeRef { graph, id })
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (u16, Self)> + '_> {
        let graph = self.graph;
        Box::new(
            graph
                .arena
                .edges(self.id)
                .iter()
                .map(move |&(label, id)| (label, MutableNodeRef { graph, id })),
        )
    }

    fn edge_count(&self) -> usize {
        self.graph.arena.out_count(self.id)
    }
}
