//! Depth-first enumeration over either graph representation.
//!
//! The walk operates purely through [`WordGraphNode`], so the mutable
//! and the frozen graph share one implementation. Children are visited
//! in ascending label order, which makes the walk emit accepted strings
//! in lexicographic code-unit order; results nevertheless land in a
//! sorted set, so ordering never depends on traversal details.

use super::unit::string_from_units;
use super::WordGraphNode;
use std::collections::BTreeSet;

/// Relationship a stored string must have with the query string to be
/// included in an enumeration result.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SearchCondition<'a> {
    /// Every stored string matches.
    All,
    /// Stored string starts with the query.
    Prefix(&'a [u16]),
    /// Stored string contains the query.
    Substring(&'a [u16]),
    /// Stored string ends with the query.
    Suffix(&'a [u16]),
}

impl SearchCondition<'_> {
    pub(crate) fn satisfied_by(&self, candidate: &[u16]) -> bool {
        match *self {
            SearchCondition::All => true,
            SearchCondition::Prefix(query) => candidate.starts_with(query),
            SearchCondition::Suffix(query) => candidate.ends_with(query),
            SearchCondition::Substring(query) => {
                query.is_empty()
                    || candidate
                        .windows(query.len())
                        .any(|window| window == query)
            }
        }
    }
}

/// Walk from `node` along `path`, one transition per unit.
pub(crate) fn descend<N: WordGraphNode>(node: N, path: &[u16]) -> Option<N> {
    let mut current = node;
    for &label in path {
        current = current.transition(label)?;
    }
    Some(current)
}

/// Collect every accepted string reachable from `origin` (whose own
/// path is `seed`) that satisfies `condition`.
pub(crate) fn collect_strings<N: WordGraphNode>(
    origin: N,
    seed: Vec<u16>,
    condition: SearchCondition<'_>,
    results: &mut BTreeSet<String>,
) {
    for (path, _) in AcceptWalk::new(origin, seed) {
        if condition.satisfied_by(&path) {
            results.insert(string_from_units(&path));
        }
    }
}

/// Depth-first iterator over accept nodes, yielding each node's full
/// path from the source together with the node itself.
///
/// The iterator is lazy; abandoning it abandons the walk.
pub(crate) struct AcceptWalk<N: WordGraphNode> {
    stack: Vec<(N, Vec<u16>)>,
}

impl<N: WordGraphNode> AcceptWalk<N> {
    pub(crate) fn new(origin: N, seed: Vec<u16>) -> Self {
        AcceptWalk {
            stack: vec![(origin, seed)],
        }
    }
}

impl<N: WordGraphNode> Iterator for AcceptWalk<N> {
    type Item = (Vec<u16>, N);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            // Reverse push order keeps emission lexicographic.
            let children: Vec<(u16, N)> = node.edges().collect();
            for (label, child) in children.into_iter().rev() {
                let mut child_path = path.clone();
                child_path.push(label);
                self.stack.push((child, child_path));
            }
            if node.is_accept() {
                return Some((path, node));
            }
        }
        None
    }
}
