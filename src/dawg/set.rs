//! The public string-set type over both graph representations.

use super::error::{DawgError, IngestError};
use super::frozen::FrozenDawg;
use super::mutable::MutableDawg;
use super::traverse::{collect_strings, descend, AcceptWalk, SearchCondition};
use super::unit::{string_from_units, units_of};
use super::WordGraphNode;
use std::collections::BTreeSet;

/// A set of strings stored as a minimal deterministic acyclic word
/// graph.
///
/// The set starts out **mutable**: strings can be added and removed in
/// any order, and the underlying graph is re-minimized after every
/// operation, so storage stays proportional to the set's shared
/// structure rather than its raw size.
///
/// Calling [`freeze`](DawgSet::freeze) converts the set **in place**
/// into a bit-packed array representation. Lookups and enumeration keep
/// working (and get cheaper); mutation fails with
/// [`DawgError::Frozen`] from then on.
///
/// # Examples
///
/// ```rust
/// use dawgset::prelude::*;
///
/// let mut words = DawgSet::new();
/// words.add("top").unwrap();
/// words.add("tops").unwrap();
/// words.add("tap").unwrap();
///
/// assert_eq!(words.len(), 3);
/// let tops: Vec<String> = words.strings_starting_with("to").into_iter().collect();
/// assert_eq!(tops, ["top", "tops"]);
/// ```
#[derive(Debug, Clone)]
pub struct DawgSet {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Mutable(MutableDawg),
    Frozen(FrozenDawg),
}

impl DawgSet {
    /// Create an empty set.
    pub fn new() -> Self {
        DawgSet {
            repr: Repr::Mutable(MutableDawg::new()),
        }
    }

    /// Create a set containing every string in `terms`.
    ///
    /// Input order does not matter for the result; runs of strings
    /// sharing prefixes (sorted input in particular) build fastest.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = MutableDawg::new();
        add_batch(&mut graph, terms);
        DawgSet {
            repr: Repr::Mutable(graph),
        }
    }

    /// Create a set from a fallible string source.
    ///
    /// The first producer error is returned unchanged; every string
    /// yielded before it is lost with the partially built set.
    pub fn try_from_terms<I, S, E>(terms: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<S, E>>,
        S: AsRef<str>,
    {
        let mut set = DawgSet::new();
        set.try_add_all(terms).map_err(|err| match err {
            IngestError::Source(err) => err,
            IngestError::Frozen => unreachable!("freshly created set is not frozen"),
        })?;
        Ok(set)
    }

    fn mutable_mut(&mut self) -> Result<&mut MutableDawg, DawgError> {
        match &mut self.repr {
            Repr::Mutable(graph) => Ok(graph),
            Repr::Frozen(_) => Err(DawgError::Frozen),
        }
    }

    /// Add one string. Returns `true` if the set changed.
    ///
    /// # Errors
    ///
    /// [`DawgError::Frozen`] if the set has been frozen.
    pub fn add(&mut self, term: &str) -> Result<bool, DawgError> {
        let units = units_of(term);
        Ok(self.mutable_mut()?.add_one(&units))
    }

    /// Add every string in `terms`. Returns `true` if the set changed.
    ///
    /// Minimization of each string's divergent tail is deferred until
    /// the next string is seen, making this the preferred entry point
    /// for bulk loads.
    ///
    /// # Errors
    ///
    /// [`DawgError::Frozen`] if the set has been frozen; no strings are
    /// added in that case.
    pub fn add_all<I, S>(&mut self, terms: I) -> Result<bool, DawgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(add_batch(self.mutable_mut()?, terms))
    }

    /// Add strings from a fallible source, stopping at its first error.
    ///
    /// On [`IngestError::Source`] the set remains valid and contains
    /// every string yielded before the failure.
    ///
    /// # Errors
    ///
    /// [`IngestError::Frozen`] if the set has been frozen,
    /// [`IngestError::Source`] wrapping the producer's error otherwise.
    pub fn try_add_all<I, S, E>(&mut self, terms: I) -> Result<bool, IngestError<E>>
    where
        I: IntoIterator<Item = Result<S, E>>,
        S: AsRef<str>,
    {
        let graph = self.mutable_mut()?;
        let mut changed = false;
        let mut prev: Vec<u16> = Vec::new();
        for item in terms {
            let term = match item {
                Ok(term) => term,
                Err(err) => {
                    // Leave the graph minimal before surfacing the error.
                    graph.finish_batch(&prev);
                    return Err(IngestError::Source(err));
                }
            };
            let cur = units_of(term.as_ref());
            if let Some(start) = MutableDawg::minimization_start_index(&prev, &cur) {
                graph.minimize_tail(&prev, start);
            }
            changed |= graph.add_string_internal(&cur);
            prev = cur;
        }
        graph.finish_batch(&prev);
        Ok(changed)
    }

    /// Remove one string. Returns `true` if the set changed; removing
    /// an absent string is a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// [`DawgError::Frozen`] if the set has been frozen.
    pub fn remove(&mut self, term: &str) -> Result<bool, DawgError> {
        let units = units_of(term);
        Ok(self.mutable_mut()?.remove_units(&units))
    }

    /// Check whether a string is stored in the set.
    pub fn contains(&self, term: &str) -> bool {
        let units = units_of(term);
        match &self.repr {
            Repr::Mutable(graph) => graph.contains_units(&units),
            Repr::Frozen(graph) => graph.contains_units(&units),
        }
    }

    /// Number of distinct stored strings.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Mutable(graph) => graph.size(),
            Repr::Frozen(graph) => graph.size(),
        }
    }

    /// Check whether the set stores no strings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored strings, sorted.
    pub fn all_strings(&self) -> BTreeSet<String> {
        self.collect(SearchCondition::All)
    }

    /// All stored strings starting with `prefix`, sorted.
    pub fn strings_starting_with(&self, prefix: &str) -> BTreeSet<String> {
        let query = units_of(prefix);
        let mut results = BTreeSet::new();
        match &self.repr {
            Repr::Mutable(graph) => {
                if let Some(origin) = descend(graph.source_ref(), &query) {
                    collect_strings(
                        origin,
                        query.clone(),
                        SearchCondition::Prefix(&query),
                        &mut results,
                    );
                }
            }
            Repr::Frozen(graph) => {
                if let Some(origin) = descend(graph.source_ref(), &query) {
                    collect_strings(
                        origin,
                        query.clone(),
                        SearchCondition::Prefix(&query),
                        &mut results,
                    );
                }
            }
        }
        results
    }

    /// All stored strings ending with `suffix`, sorted.
    pub fn strings_ending_with(&self, suffix: &str) -> BTreeSet<String> {
        let query = units_of(suffix);
        self.collect(SearchCondition::Suffix(&query))
    }

    /// All stored strings containing `substring`, sorted.
    pub fn strings_containing(&self, substring: &str) -> BTreeSet<String> {
        let query = units_of(substring);
        self.collect(SearchCondition::Substring(&query))
    }

    fn collect(&self, condition: SearchCondition<'_>) -> BTreeSet<String> {
        let mut results = BTreeSet::new();
        match &self.repr {
            Repr::Mutable(graph) => {
                collect_strings(graph.source_ref(), Vec::new(), condition, &mut results)
            }
            Repr::Frozen(graph) => {
                collect_strings(graph.source_ref(), Vec::new(), condition, &mut results)
            }
        }
        results
    }

    /// Iterate over stored strings in lexicographic code-unit order.
    ///
    /// The walk is lazy; dropping the iterator abandons it.
    pub fn iter(&self) -> Box<dyn Iterator<Item = String> + '_> {
        match &self.repr {
            Repr::Mutable(graph) => Box::new(
                AcceptWalk::new(graph.source_ref(), Vec::new())
                    .map(|(path, _)| string_from_units(&path)),
            ),
            Repr::Frozen(graph) => Box::new(
                AcceptWalk::new(graph.source_ref(), Vec::new())
                    .map(|(path, _)| string_from_units(&path)),
            ),
        }
    }

    /// The longest prefix of `term` that is also a prefix of some
    /// stored string.
    pub fn longest_stored_prefix(&self, term: &str) -> String {
        let units = units_of(term);
        let matched = match &self.repr {
            Repr::Mutable(graph) => walk_prefix(graph.source_ref(), &units),
            Repr::Frozen(graph) => walk_prefix(graph.source_ref(), &units),
        };
        string_from_units(&units[..matched])
    }

    /// Number of transitions in the graph.
    pub fn transition_count(&self) -> usize {
        match &self.repr {
            Repr::Mutable(graph) => graph.transition_count(),
            Repr::Frozen(graph) => graph.transition_count(),
        }
    }

    /// Number of nodes reachable from the source, excluding the source
    /// itself.
    pub fn node_count(&self) -> usize {
        match &self.repr {
            Repr::Mutable(graph) => graph.node_count(),
            Repr::Frozen(graph) => graph.node_count(),
        }
    }

    /// Number of registered equivalence classes, or `None` once the set
    /// is frozen and the register is gone.
    pub fn equivalence_class_count(&self) -> Option<usize> {
        match &self.repr {
            Repr::Mutable(graph) => Some(graph.equivalence_class_count()),
            Repr::Frozen(_) => None,
        }
    }

    /// Every symbol that labels at least one transition, as 16-bit code
    /// units.
    pub fn transition_label_set(&self) -> BTreeSet<u16> {
        match &self.repr {
            Repr::Mutable(graph) => graph.symbols().clone(),
            Repr::Frozen(graph) => graph.letters(),
        }
    }

    /// Check whether the set has been frozen.
    pub fn is_frozen(&self) -> bool {
        matches!(self.repr, Repr::Frozen(_))
    }

    /// Convert the set in place into the immutable bit-packed form,
    /// dropping the mutable arena and the equivalence register.
    ///
    /// Idempotent: freezing a frozen set does nothing.
    pub fn freeze(&mut self) {
        let packed = match &self.repr {
            Repr::Mutable(graph) => FrozenDawg::from_mutable(graph),
            Repr::Frozen(_) => return,
        };
        self.repr = Repr::Frozen(packed);
    }
}

impl Default for DawgSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DawgSet {
    fn from_iter<I: IntoIterator<Item = S>>(terms: I) -> Self {
        DawgSet::from_terms(terms)
    }
}

impl<S: AsRef<str>> Extend<S> for DawgSet {
    /// Adds the strings to the set.
    ///
    /// # Panics
    ///
    /// Panics if the set has been frozen; use
    /// [`add_all`](DawgSet::add_all) to handle that case gracefully.
    fn extend<I: IntoIterator<Item = S>>(&mut self, terms: I) {
        match self.add_all(terms) {
            Ok(_) => {}
            Err(err) => panic!("{err}"),
        }
    }
}

/// Batch insertion with deferred tail minimization.
fn add_batch<I, S>(graph: &mut MutableDawg, terms: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut changed = false;
    let mut prev: Vec<u16> = Vec::new();
    for term in terms {
        let cur = units_of(term.as_ref());
        if let Some(start) = MutableDawg::minimization_start_index(&prev, &cur) {
            graph.minimize_tail(&prev, start);
        }
        changed |= graph.add_string_internal(&cur);
        prev = cur;
    }
    graph.finish_batch(&prev);
    changed
}

/// Length of the longest prefix of `units` with a transition path from
/// `node`.
fn walk_prefix<N: WordGraphNode>(node: N, units: &[u16]) -> usize {
    let mut current = node;
    for (i, &label) in units.iter().enumerate() {
        match current.transition(label) {
            Some(next) => current = next,
            None => return i,
        }
    }
    units.len()
}
