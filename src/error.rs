// File: src/error.rs
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, AutocompleteError>;

/// Everything that can go wrong constructing or operating an autocompleter.
#[derive(Error, Debug)]
pub enum AutocompleteError {
    /// Trie construction was given an empty alphabet
    #[error("empty alphabet")]
    EmptyAlphabet,

    /// A dictionary-backed constructor was given no words
    #[error("empty dictionary")]
    EmptyDictionary,

    /// result_size must never exceed radius
    #[error("result size {result_size} exceeds radius {radius}")]
    ResultSizeExceedsRadius { result_size: usize, radius: usize },

    /// A character in a word/stem falls outside the declared alphabet
    #[error("character {0:?} outside the configured alphabet")]
    IllegalCharacter(char),

    /// Accept/unlearn target is not in the dictionary
    #[error("word {0:?} not in dictionary")]
    WordNotFound(String),

    /// Learn target is already in the dictionary
    #[error("word {0:?} already in dictionary")]
    WordAlreadyKnown(String),

    /// A dictionary file contained an empty line
    #[error("empty word on line {line} of dictionary file")]
    EmptyDictionaryLine { line: usize },

    /// I/O failure on save/retrieve or dictionary load
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted delta record could not be decoded
    #[error("malformed delta record: {0}")]
    Codec(String),
}
