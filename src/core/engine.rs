// File: src/core/engine.rs
use std::path::Path;

use crate::core::lino::SkipListIndex;
use crate::core::trie::TrieIndex;
use crate::error::Result;

/// The capability contract both index variants implement.
///
/// `accept` raises the completion rank of an already-indexed word,
/// `learn`/`unlearn` grow and shrink the dictionary, `complete` returns
/// a bounded ranked list of words extending a stem, and `save`/
/// `retrieve` persist and replay the deltas accumulated since
/// construction. The engines are single-writer: callers wanting shared
/// mutation must wrap them in their own lock.
pub trait AutoComplete {
    fn accept(&mut self, word: &str) -> Result<()>;
    fn learn(&mut self, word: &str) -> Result<()>;
    fn unlearn(&mut self, word: &str) -> Result<()>;
    fn complete(&self, stem: &str) -> Result<Vec<String>>;
    fn save(&self, path: &Path) -> Result<()>;
    fn retrieve(&mut self, path: &Path) -> Result<()>;
}

impl AutoComplete for TrieIndex {
    fn accept(&mut self, word: &str) -> Result<()> {
        TrieIndex::accept(self, word)
    }
    fn learn(&mut self, word: &str) -> Result<()> {
        TrieIndex::learn(self, word)
    }
    fn unlearn(&mut self, word: &str) -> Result<()> {
        TrieIndex::unlearn(self, word)
    }
    fn complete(&self, stem: &str) -> Result<Vec<String>> {
        TrieIndex::complete(self, stem)
    }
    fn save(&self, path: &Path) -> Result<()> {
        TrieIndex::save(self, path)
    }
    fn retrieve(&mut self, path: &Path) -> Result<()> {
        TrieIndex::retrieve(self, path)
    }
}

impl AutoComplete for SkipListIndex {
    fn accept(&mut self, word: &str) -> Result<()> {
        SkipListIndex::accept(self, word)
    }
    fn learn(&mut self, word: &str) -> Result<()> {
        SkipListIndex::learn(self, word)
    }
    fn unlearn(&mut self, word: &str) -> Result<()> {
        SkipListIndex::unlearn(self, word)
    }
    fn complete(&self, stem: &str) -> Result<Vec<String>> {
        SkipListIndex::complete(self, stem)
    }
    fn save(&self, path: &Path) -> Result<()> {
        SkipListIndex::save(self, path)
    }
    fn retrieve(&mut self, path: &Path) -> Result<()> {
        SkipListIndex::retrieve(self, path)
    }
}

/// Closed union over the two engine variants, picked at construction.
pub enum Autocompleter {
    Trie(TrieIndex),
    Lino(SkipListIndex),
}

impl Autocompleter {
    pub fn contains(&self, word: &str) -> bool {
        match self {
            Autocompleter::Trie(t) => t.contains(word),
            Autocompleter::Lino(l) => l.contains(word),
        }
    }
}

impl AutoComplete for Autocompleter {
    fn accept(&mut self, word: &str) -> Result<()> {
        match self {
            Autocompleter::Trie(t) => t.accept(word),
            Autocompleter::Lino(l) => l.accept(word),
        }
    }
    fn learn(&mut self, word: &str) -> Result<()> {
        match self {
            Autocompleter::Trie(t) => t.learn(word),
            Autocompleter::Lino(l) => l.learn(word),
        }
    }
    fn unlearn(&mut self, word: &str) -> Result<()> {
        match self {
            Autocompleter::Trie(t) => t.unlearn(word),
            Autocompleter::Lino(l) => l.unlearn(word),
        }
    }
    fn complete(&self, stem: &str) -> Result<Vec<String>> {
        match self {
            Autocompleter::Trie(t) => t.complete(stem),
            Autocompleter::Lino(l) => l.complete(stem),
        }
    }
    fn save(&self, path: &Path) -> Result<()> {
        match self {
            Autocompleter::Trie(t) => t.save(path),
            Autocompleter::Lino(l) => l.save(path),
        }
    }
    fn retrieve(&mut self, path: &Path) -> Result<()> {
        match self {
            Autocompleter::Trie(t) => t.retrieve(path),
            Autocompleter::Lino(l) => l.retrieve(path),
        }
    }
}

impl From<TrieIndex> for Autocompleter {
    fn from(index: TrieIndex) -> Self {
        Autocompleter::Trie(index)
    }
}

impl From<SkipListIndex> for Autocompleter {
    fn from(index: SkipListIndex) -> Self {
        Autocompleter::Lino(index)
    }
}
