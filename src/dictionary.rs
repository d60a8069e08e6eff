// File: src/dictionary.rs
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{AutocompleteError, Result};

/// Loads a dictionary file: one word per line, no empty lines.
///
/// Engines consume the returned list only at construction time.
pub fn load_words(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let word = line?;
        if word.is_empty() {
            return Err(AutocompleteError::EmptyDictionaryLine { line: idx + 1 });
        }
        words.push(word);
    }
    Ok(words)
}
