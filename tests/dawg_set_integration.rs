//! End-to-end behavior of `DawgSet` across both representations.

use dawgset::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn sorted(strings: &[&str]) -> BTreeSet<String> {
    strings.iter().map(|s| s.to_string()).collect()
}

#[test]
fn shared_tails_after_freeze() {
    let mut set = DawgSet::from_terms(["cat", "cats", "fact", "facts"]);
    set.freeze();
    assert_eq!(set.len(), 4);
    assert_eq!(
        set.all_strings(),
        sorted(&["cat", "cats", "fact", "facts"])
    );
    // The shared "s" tail collapses: well below the trie's 12 nodes.
    assert!(set.node_count() < 12);
}

#[test]
fn removing_middle_string_keeps_extension() {
    let mut set = DawgSet::from_terms(["a", "ab", "abc"]);
    assert_eq!(set.remove("ab"), Ok(true));
    assert_eq!(set.len(), 2);
    assert_eq!(set.all_strings(), sorted(&["a", "abc"]));
    // The path through "ab" still exists for "abc".
    assert_eq!(set.longest_stored_prefix("abx"), "ab");
    assert!(!set.contains("ab"));
}

#[test]
fn prefix_suffix_substring_queries() {
    let set = DawgSet::from_terms(["top", "tops", "tap", "taps"]);
    assert_eq!(set.strings_starting_with("to"), sorted(&["top", "tops"]));
    assert_eq!(set.strings_ending_with("s"), sorted(&["taps", "tops"]));
    assert_eq!(set.strings_containing("ap"), sorted(&["tap", "taps"]));
    assert!(set.strings_starting_with("x").is_empty());
    assert!(set.strings_ending_with("q").is_empty());
}

#[test]
fn remove_then_extend_near_removed_path() {
    let mut set = DawgSet::from_terms(["abc", "abd"]);
    assert_eq!(set.remove("abc"), Ok(true));
    assert_eq!(set.add("abce"), Ok(true));
    assert_eq!(set.all_strings(), sorted(&["abce", "abd"]));
    assert_eq!(set.len(), 2);
}

#[test]
fn empty_string_is_a_member() {
    let mut set = DawgSet::new();
    assert_eq!(set.add(""), Ok(true));
    assert_eq!(set.len(), 1);
    assert!(set.contains(""));
    assert_eq!(set.all_strings(), sorted(&[""]));

    set.add("a").unwrap();
    set.freeze();
    assert!(set.contains(""));
    assert_eq!(set.all_strings(), sorted(&["", "a"]));
}

#[test]
fn freeze_round_trip_preserves_everything() {
    let terms = [
        "graph", "graphs", "grape", "grapes", "grasp", "gasp", "gas", "zip",
    ];
    let mut set = DawgSet::from_terms(terms);
    let before_strings = set.all_strings();
    let before_nodes = set.node_count();
    let before_transitions = set.transition_count();

    set.freeze();
    assert_eq!(set.all_strings(), before_strings);
    assert_eq!(set.node_count(), before_nodes);
    assert_eq!(set.transition_count(), before_transitions);
    for term in terms {
        assert!(set.contains(term));
    }
    assert!(!set.contains("grap"));
    assert!(!set.contains("zips"));
}

#[test]
fn query_laws() {
    let set = DawgSet::from_terms(["we", "web", "weave", "east", "beast", ""]);
    assert_eq!(set.all_strings(), set.strings_starting_with(""));
    assert_eq!(set.all_strings(), set.strings_ending_with(""));
    assert_eq!(set.all_strings(), set.strings_containing(""));

    for s in set.all_strings() {
        assert!(set.strings_starting_with("we").contains(&s) == s.starts_with("we"));
        assert!(set.strings_ending_with("st").contains(&s) == s.ends_with("st"));
        assert!(set.strings_containing("ea").contains(&s) == s.contains("ea"));
    }
}

#[test]
fn idempotent_add_and_remove() {
    let mut set = DawgSet::from_terms(["same"]);
    assert_eq!(set.add("same"), Ok(false));
    assert_eq!(set.len(), 1);
    assert_eq!(set.remove("other"), Ok(false));
    assert_eq!(set.remove("same"), Ok(true));
    assert_eq!(set.remove("same"), Ok(false));
    assert!(set.is_empty());
}

#[test]
fn unordered_input_builds_the_same_graph() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut terms: Vec<String> = (0..500).map(|_| random_word(&mut rng)).collect();
    let ordered = {
        let mut sorted_terms = terms.clone();
        sorted_terms.sort();
        DawgSet::from_terms(&sorted_terms)
    };
    // A couple of deterministic reorderings.
    terms.reverse();
    let reversed = DawgSet::from_terms(&terms);

    assert_eq!(ordered.len(), reversed.len());
    assert_eq!(ordered.node_count(), reversed.node_count());
    assert_eq!(ordered.transition_count(), reversed.transition_count());
    assert_eq!(ordered.all_strings(), reversed.all_strings());
}

#[test]
fn unicode_terms_round_trip() {
    let terms = ["caf\u{e9}", "cafeteria", "\u{4e2d}\u{6587}", "na\u{ef}ve"];
    let mut set = DawgSet::from_terms(terms);
    for term in terms {
        assert!(set.contains(term));
    }
    set.freeze();
    for term in terms {
        assert!(set.contains(term));
    }
    assert_eq!(set.all_strings().len(), 4);
}

fn random_word(rng: &mut StdRng) -> String {
    let len = rng.gen_range(3..=10);
    (0..len)
        .map(|_| char::from(b'a' + rng.gen_range(0..8u8)))
        .collect()
}

#[test]
fn bulk_random_membership() {
    let mut rng = StdRng::seed_from_u64(20_000);
    let mut model = BTreeSet::new();
    while model.len() < 20_000 {
        model.insert(random_word(&mut rng));
    }

    let mut set = DawgSet::from_terms(model.iter());
    assert_eq!(set.len(), model.len());
    set.freeze();
    assert_eq!(set.len(), model.len());

    for present in model.iter().take(10_000) {
        assert!(set.contains(present), "missing {present}");
    }
    let mut absent_checked = 0;
    while absent_checked < 10_000 {
        let probe = random_word(&mut rng);
        if !model.contains(&probe) {
            assert!(!set.contains(&probe), "ghost {probe}");
            absent_checked += 1;
        }
    }
}

#[test]
fn interleaved_add_remove_matches_model() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut model = BTreeSet::new();
    let mut set = DawgSet::new();

    for _ in 0..3_000 {
        let word = random_word(&mut rng);
        if rng.gen_bool(0.3) {
            assert_eq!(set.remove(&word), Ok(model.remove(&word)));
        } else {
            assert_eq!(set.add(&word), Ok(model.insert(word.clone())));
        }
        assert_eq!(set.len(), model.len());
    }

    let strings: BTreeSet<String> = set.all_strings();
    assert_eq!(strings, model);

    // The incrementally mutated graph is the same minimal graph a
    // from-scratch build produces.
    let rebuilt = DawgSet::from_terms(model.iter());
    assert_eq!(set.node_count(), rebuilt.node_count());
    assert_eq!(set.transition_count(), rebuilt.transition_count());
}
