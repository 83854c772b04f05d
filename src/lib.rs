//! # dawgset
//!
//! Compact string-set storage using minimal deterministic acyclic word
//! graphs (MDAWG), built incrementally with the algorithm described in:
//!
//! > Daciuk, Jan, et al. "Incremental construction of minimal acyclic
//! > finite-state automata." Computational Linguistics 26.1 (2000): 3-16.
//!
//! extended with support for unsorted input, deletion, and confluence
//! splitting. The graph stays minimal after every insertion and removal,
//! so equivalent suffix subgraphs are always shared and the structure is
//! typically orders of magnitude smaller than a trie.
//!
//! Once a set is fully built it can be [frozen](dawg::set::DawgSet::freeze)
//! into an immutable bit-packed array representation that supports the
//! same lookups and enumerations with a fraction of the memory.
//!
//! ## Example
//!
//! ```rust
//! use dawgset::prelude::*;
//!
//! let mut words = DawgSet::from_terms(["cat", "cats", "fact", "facts"]);
//! assert!(words.contains("cats"));
//! assert_eq!(words.len(), 4);
//!
//! words.remove("fact").unwrap();
//! assert!(!words.contains("fact"));
//!
//! words.freeze();
//! assert!(words.contains("facts"));
//! assert!(words.add("more").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dawg;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::dawg::error::{DawgError, IngestError};
    pub use crate::dawg::set::DawgSet;
    pub use crate::dawg::{WordGraph, WordGraphNode};
}
