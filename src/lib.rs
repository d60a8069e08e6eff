// src/lib.rs

pub mod core;
pub mod dictionary;
pub mod error;
pub mod persistence;

pub use crate::core::engine::{AutoComplete, Autocompleter};
pub use crate::core::lino::SkipListIndex;
pub use crate::core::trie::TrieIndex;
pub use crate::core::types::{DEFAULT_RADIUS, DEFAULT_RESULT_SIZE};
pub use crate::error::{AutocompleteError, Result};
