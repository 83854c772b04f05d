//! The frozen, bit-packed graph representation.
//!
//! Freezing lays the graph out into three parallel arrays:
//!
//! - `data`: one stride of `W = ceil(|alphabet| / 32) + 1` 32-bit words
//!   per node. Word 0 is the header: bit 31 is the accept flag, the low
//!   31 bits are the start of the node's run in `children`. Words
//!   `1..W` are a bitmap over the alphabet marking which outgoing
//!   labels exist.
//! - `children`: for each node, a dense run of `popcount(bitmap)`
//!   entries holding the `data` offsets of its children in alphabet
//!   order.
//! - `letters`: the alphabet by slot, with an inverse index for lookup.
//!
//! A transition is one bitmap test plus a popcount rank; the rank picks
//! the child entry. The frozen graph is immutable and safe to share
//! across threads.

use super::alphabet::Alphabet;
use super::mutable::MutableDawg;
use super::node::SOURCE;
use super::{WordGraph, WordGraphNode};
use std::collections::BTreeSet;

const ACCEPT_MASK: u32 = 1 << 31;
const CHILD_START_MASK: u32 = !ACCEPT_MASK;

/// An immutable, array-backed word graph.
#[derive(Debug, Clone)]
pub struct FrozenDawg {
    data: Box<[u32]>,
    children: Box<[u32]>,
    alphabet: Alphabet,
    /// Words per node in `data`.
    stride: usize,
    /// Number of distinct stored strings.
    size: usize,
}

impl FrozenDawg {
    /// Lay out a mutable graph into the packed arrays.
    pub(crate) fn from_mutable(graph: &MutableDawg) -> Self {
        let alphabet = Alphabet::from_sorted_symbols(graph.symbols().iter().copied());
        let stride = alphabet.len().div_ceil(32) + 1;
        let arena = graph.arena();

        // First pass: assign each reachable node its data offset and its
        // child-region start, in depth-first first-visit order with the
        // source at offset 0.
        let allocated = arena.allocated();
        let mut data_offset = vec![0u32; allocated];
        let mut child_start = vec![0u32; allocated];
        let mut visited = vec![false; allocated];
        let mut order = Vec::new();
        let mut next_data = 0u32;
        let mut next_child = 0u32;
        let mut stack = vec![SOURCE];
        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            order.push(id);
            data_offset[id] = next_data;
            child_start[id] = next_child;
            next_data += stride as u32;
            next_child += arena.out_count(id) as u32;
            for &(_, child) in arena.edges(id).iter().rev() {
                if !visited[child] {
                    stack.push(child);
                }
            }
        }
        assert!(
            next_child <= CHILD_START_MASK,
            "graph exceeds the packable transition count"
        );

        // Second pass: headers, bitmaps, and child offsets. Edges are
        // label-sorted, so the edge position equals the bitmap rank.
        let mut data = vec![0u32; next_data as usize];
        let mut children = vec![0u32; next_child as usize];
        for &id in &order {
            let offset = data_offset[id] as usize;
            let accept = if arena.is_accept(id) { ACCEPT_MASK } else { 0 };
            data[offset] = accept | child_start[id];
            for (position, &(label, child)) in arena.edges(id).iter().enumerate() {
                let slot = alphabet
                    .slot(label)
                    .expect("every transition label is in the alphabet");
                data[offset + 1 + (slot >> 5)] |= 1 << (slot & 31);
                children[child_start[id] as usize + position] = data_offset[child];
            }
        }
        debug_assert_eq!(children.len(), graph.transition_count());

        FrozenDawg {
            data: data.into_boxed_slice(),
            children: children.into_boxed_slice(),
            alphabet,
            stride,
            size: graph.size(),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Number of nodes, excluding the source.
    pub(crate) fn node_count(&self) -> usize {
        self.data.len() / self.stride - 1
    }

    pub(crate) fn transition_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn letters(&self) -> BTreeSet<u16> {
        self.alphabet.letters().iter().copied().collect()
    }

    /// Handle to the source node for generic traversal.
    pub(crate) fn source_ref(&self) -> FrozenNodeRef<'_> {
        FrozenNodeRef {
            graph: self,
            offset: 0,
        }
    }

    pub(crate) fn contains_units(&self, units: &[u16]) -> bool {
        let mut offset = 0usize;
        for &label in units {
            match self.child_offset(offset, label) {
                Some(next) => offset = next,
                None => return false,
            }
        }
        self.data[offset] & ACCEPT_MASK != 0
    }

    #[inline]
    fn child_region_start(&self, offset: usize) -> usize {
        (self.data[offset] & CHILD_START_MASK) as usize
    }

    /// Offset of the child reached from the node at `offset` via
    /// `label`, using the bitmap-rank arithmetic.
    fn child_offset(&self, offset: usize, label: u16) -> Option<usize> {
        let slot = self.alphabet.slot(label)?;
        let word_idx = offset + 1 + (slot >> 5);
        let bit_in_word = slot & 31;
        if self.data[word_idx] & (1 << bit_in_word) == 0 {
            return None;
        }
        let mut rank = 0usize;
        for &word in &self.data[offset + 1..word_idx] {
            rank += word.count_ones() as usize;
        }
        if bit_in_word > 0 {
            rank += (self.data[word_idx] << (32 - bit_in_word)).count_ones() as usize;
        }
        Some(self.children[self.child_region_start(offset) + rank] as usize)
    }

    fn edge_count_at(&self, offset: usize) -> usize {
        self.data[offset + 1..offset + self.stride]
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }
}

impl<'a> WordGraph for &'a FrozenDawg {
    type Node = FrozenNodeRef<'a>;

    fn source(&self) -> FrozenNodeRef<'a> {
        self.source_ref()
    }

    fn contains(&self, term: &str) -> bool {
        let units: Vec<u16> = term.encode_utf16().collect();
        self.contains_units(&units)
    }
}

/// Node handle into a [`FrozenDawg`].
#[derive(Debug, Clone, Copy)]
pub struct FrozenNodeRef<'a> {
    graph: &'a FrozenDawg,
    offset: usize,
}

impl<'a> WordGraphNode for FrozenNodeRef<'a> {
    fn is_accept(&self) -> bool {
        self.graph.data[self.offset] & ACCEPT_MASK != 0
    }

    fn transition(&self, label: u16) -> Option<Self> {
        let graph = self.graph;
        graph
            .child_offset(self.offset, label)
            .map(|offset| FrozenNodeRef { graph, offset })
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (u16, Self)> + '_> {
        Box::new(FrozenEdgeIter {
            graph: self.graph,
            offset: self.offset,
            word_idx: self.offset,
            current: 0,
            child_idx: self.graph.child_region_start(self.offset),
        })
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count_at(self.offset)
    }
}

/// Iterates a frozen node's bitmap lowest-slot-first; since child
/// entries are stored in rank order, a running index into `children`
/// pairs each set bit with its target.
struct FrozenEdgeIter<'a> {
    graph: &'a FrozenDawg,
    /// Data offset of the node whose edges are being iterated.
    offset: usize,
    /// Bitmap word currently being drained (starts on the header word).
    word_idx: usize,
    current: u32,
    child_idx: usize,
}

impl<'a> Iterator for FrozenEdgeIter<'a> {
    type Item = (u16, FrozenNodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.offset + self.graph.stride {
                return None;
            }
            self.current = self.graph.data[self.word_idx];
        }
        let slot_base = (self.word_idx - self.offset - 1) * 32;
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        let letter = self.graph.alphabet.letter(slot_base + bit);
        let child = FrozenNodeRef {
            graph: self.graph,
            offset: self.graph.children[self.child_idx] as usize,
        };
        self.child_idx += 1;
        Some((letter, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg::unit::units_of;

    fn frozen(terms: &[&str]) -> FrozenDawg {
        let mut graph = MutableDawg::new();
        for term in terms {
            graph.add_one(&units_of(term));
        }
        FrozenDawg::from_mutable(&graph)
    }

    #[test]
    fn stride_matches_alphabet_width() {
        // 4 distinct letters -> one bitmap word plus the header.
        let graph = frozen(&["cab", "cad"]);
        assert_eq!(graph.stride, 2);
        assert_eq!(
            graph.letters(),
            BTreeSet::from([b'a', b'b', b'c', b'd'].map(u16::from))
        );
    }

    #[test]
    fn lookups_match_mutable_graph() {
        let terms = ["cat", "cats", "fact", "facts", "tap", "taps"];
        let mut graph = MutableDawg::new();
        for term in &terms {
            graph.add_one(&units_of(term));
        }
        let packed = FrozenDawg::from_mutable(&graph);

        assert_eq!(packed.size(), 6);
        assert_eq!(packed.node_count(), graph.node_count());
        assert_eq!(packed.transition_count(), graph.transition_count());
        for term in terms {
            assert!(packed.contains_units(&units_of(term)), "missing {term}");
        }
        for absent in ["ca", "cast", "fats", "", "tapse"] {
            assert!(!packed.contains_units(&units_of(absent)), "ghost {absent}");
        }
    }

    #[test]
    fn edges_iterate_in_label_order() {
        let packed = frozen(&["pd", "pb", "pc", "pa"]);
        let source = packed.source_ref();
        let p = source.transition(b'p' as u16).unwrap();
        let labels: Vec<u16> = p.edges().map(|(label, _)| label).collect();
        assert_eq!(labels, [b'a', b'b', b'c', b'd'].map(u16::from));
        assert_eq!(p.edge_count(), 4);
        assert!(p.edges().all(|(_, child)| child.is_accept()));
    }

    #[test]
    fn wide_alphabet_spans_bitmap_words() {
        // 40 distinct first letters force a two-word bitmap (stride 3).
        let terms: Vec<String> = (0..40u32)
            .map(|i| char::from_u32('a' as u32 + i).unwrap().to_string())
            .collect();
        let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        let packed = frozen(&refs);
        assert_eq!(packed.stride, 3);
        for term in &refs {
            assert!(packed.contains_units(&units_of(term)));
        }
        assert_eq!(packed.source_ref().edge_count(), 40);
        let labels: Vec<u16> = packed.source_ref().edges().map(|(l, _)| l).collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
        assert_eq!(labels.len(), 40);
    }

    #[test]
    fn empty_graph_freezes() {
        let graph = MutableDawg::new();
        let packed = FrozenDawg::from_mutable(&graph);
        assert_eq!(packed.size(), 0);
        assert_eq!(packed.node_count(), 0);
        assert_eq!(packed.transition_count(), 0);
        assert!(!packed.contains_units(&[]));
        assert_eq!(packed.source_ref().edges().count(), 0);
    }

    #[test]
    fn empty_string_survives_freeze() {
        let packed = frozen(&["", "a"]);
        assert!(packed.contains_units(&[]));
        assert!(packed.contains_units(&units_of("a")));
        assert_eq!(packed.size(), 2);
    }

    #[test]
    fn frozen_graph_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FrozenDawg>();
    }
}
