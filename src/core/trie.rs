// File: src/core/trie.rs
use std::collections::VecDeque;
use std::path::Path;

use log::debug;

use crate::core::ranked::RankedResultList;
use crate::core::types::SearchParams;
use crate::error::{AutocompleteError, Result};
use crate::persistence::{self, ChangeSet, DeltaRecord};

type NodeId = usize;

const ROOT: NodeId = 0;

/// One code point at one tree depth. `symbol` is the offset of the
/// represented character from the alphabet minimum; the root carries a
/// meaningless 0 and is never terminal.
#[derive(Debug, Clone)]
struct TrieNode {
    is_word: bool,
    symbol: usize,
    accepts: u64,
    children: Box<[Option<NodeId>]>,
}

/// A fixed-fan-out character trie over a contiguous code-point range.
///
/// Nodes live in an arena indexed by `NodeId`; pruning returns slots to
/// a free list instead of touching pointers. Completion is a bounded
/// breadth-first descent, so shorter completions are found before
/// longer ones and, at equal depth, in alphabet order.
///
/// `learn` here is idempotent on repeated words; the sorted-chain
/// engine rejects duplicates instead.
pub struct TrieIndex {
    nodes: Vec<TrieNode>,
    free: Vec<NodeId>,
    alphabet_min: u32,
    alphabet_max: u32,
    alphabet_size: usize,
    params: SearchParams,
    changes: ChangeSet,
}

impl TrieIndex {
    /// Builds an empty trie for `alphabet`, a set of characters whose
    /// min and max code points bound every word the trie will accept.
    /// `result_size` and `radius` fall back to the defaults when 0.
    pub fn new(alphabet: &str, result_size: usize, radius: usize) -> Result<Self> {
        if alphabet.is_empty() {
            return Err(AutocompleteError::EmptyAlphabet);
        }
        let min = alphabet.chars().map(|c| c as u32).min().unwrap_or(0);
        let max = alphabet.chars().map(|c| c as u32).max().unwrap_or(0);
        let alphabet_size = (max - min + 1) as usize;

        let mut trie = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            alphabet_min: min,
            alphabet_max: max,
            alphabet_size,
            params: SearchParams::new(result_size, radius),
            changes: ChangeSet::new(),
        };
        let root = trie.blank_node(0);
        trie.nodes.push(root);
        Ok(trie)
    }

    /// Builds a trie pre-populated with `words`. Bulk-loaded words are
    /// not recorded as new, so an immediate `save` writes nothing.
    pub fn with_words<I, S>(
        alphabet: &str,
        words: I,
        result_size: usize,
        radius: usize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new(alphabet, result_size, radius)?;
        for word in words {
            let offsets = trie.offsets(word.as_ref())?;
            trie.insert_offsets(&offsets);
        }
        Ok(trie)
    }

    /// Builds a trie from a dictionary file, one word per line.
    pub fn from_file(
        alphabet: &str,
        path: &Path,
        result_size: usize,
        radius: usize,
    ) -> Result<Self> {
        let words = crate::dictionary::load_words(path)?;
        Self::with_words(alphabet, &words, result_size, radius)
    }

    /// Adds `word` to the dictionary and records it for the next save.
    /// Re-learning a known word is a no-op beyond that record.
    pub fn learn(&mut self, word: &str) -> Result<()> {
        let offsets = self.offsets(word)?;
        self.insert_offsets(&offsets);
        self.changes.note_learned(word);
        debug!("learned {:?}", word);
        Ok(())
    }

    /// Removes `word` if present, pruning exactly the suffix chain that
    /// no other word shares. Unknown or non-terminal paths are no-ops.
    pub fn unlearn(&mut self, word: &str) -> Result<()> {
        let offsets = self.offsets(word)?;
        if self.remove_offsets(&offsets) {
            self.changes.note_unlearned(word);
            debug!("unlearned {:?}", word);
        }
        Ok(())
    }

    /// Bumps the accept count of `word`, raising its completion rank.
    pub fn accept(&mut self, word: &str) -> Result<()> {
        let offsets = self.offsets(word)?;
        let node_id = self
            .walk(&offsets)
            .ok_or_else(|| AutocompleteError::WordNotFound(word.to_string()))?;
        self.nodes[node_id].accepts += 1;
        Ok(())
    }

    /// Returns up to `result_size` completions of `stem`, most-accepted
    /// first, then shortest, then alphabetical.
    pub fn complete(&self, stem: &str) -> Result<Vec<String>> {
        let offsets = self.offsets(stem)?;
        if offsets.is_empty() {
            return Ok(Vec::new());
        }
        let stem_end = match self.walk(&offsets) {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let mut hits = RankedResultList::new();
        let mut queue: VecDeque<(NodeId, String, usize)> = VecDeque::new();

        // The accumulated prefix excludes the dequeued node's own
        // character; the stem minus its last character seeds the walk.
        let mut seed: Vec<char> = stem.chars().collect();
        seed.pop();
        let seed_depth = seed.len();
        queue.push_back((stem_end, seed.into_iter().collect(), seed_depth));

        let mut results = 0;
        while let Some((node_id, prefix, depth)) = queue.pop_front() {
            if results == self.params.result_size {
                break;
            }
            let node = &self.nodes[node_id];
            if node.is_word {
                let mut word = prefix.clone();
                word.push(self.symbol_char(node.symbol));
                hits.insert(word, node.accepts);
                results += 1;
            }
            if depth < self.params.radius - 1 {
                let mut child_prefix = prefix;
                child_prefix.push(self.symbol_char(node.symbol));
                for child_id in node.children.iter().flatten() {
                    queue.push_back((*child_id, child_prefix.clone(), depth + 1));
                }
            }
        }
        Ok(hits.flush(0))
    }

    /// Writes the accumulated deltas: every word accepted or learned
    /// since load, plus one tombstone per removed word. Unchanged
    /// bulk-loaded words are never re-serialized.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut records = Vec::new();
        let mut queue: VecDeque<(NodeId, String)> = VecDeque::new();
        queue.push_back((ROOT, String::new()));

        while let Some((node_id, word)) = queue.pop_front() {
            let node = &self.nodes[node_id];
            if node.is_word && (node.accepts > 0 || self.changes.is_new(&word)) {
                records.push(DeltaRecord::learned(word.clone(), node.accepts));
            }
            for child_id in node.children.iter().flatten() {
                let mut child_word = word.clone();
                child_word.push(self.symbol_char(self.nodes[*child_id].symbol));
                queue.push_back((*child_id, child_word));
            }
        }
        records.extend(self.changes.tombstones());
        persistence::write_records(path, records)
    }

    /// Replays a delta file: unknown words are learned, positive counts
    /// overwrite the accept count, tombstones unlearn. A tombstone for
    /// a word this trie never knew is a no-op. Records are applied in
    /// order; on a malformed file or an out-of-alphabet word the first
    /// error is returned with the earlier records left in effect.
    pub fn retrieve(&mut self, path: &Path) -> Result<()> {
        let records = persistence::read_records(path)?;
        for record in records {
            if record.is_tombstone() {
                self.unlearn(&record.word)?;
                continue;
            }
            if !self.contains(&record.word) {
                self.learn(&record.word)?;
            }
            if record.accepts > 0 {
                let offsets = self.offsets(&record.word)?;
                let node_id = self
                    .walk(&offsets)
                    .ok_or_else(|| AutocompleteError::WordNotFound(record.word.clone()))?;
                self.nodes[node_id].accepts = record.accepts as u64;
            }
        }
        Ok(())
    }

    /// True if `word` is currently indexed (terminal path exists).
    pub fn contains(&self, word: &str) -> bool {
        match self.offsets(word) {
            Ok(offsets) if !offsets.is_empty() => self
                .walk(&offsets)
                .map(|id| self.nodes[id].is_word)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn offsets(&self, word: &str) -> Result<Vec<usize>> {
        word.chars()
            .map(|c| {
                let cp = c as u32;
                if cp < self.alphabet_min || cp > self.alphabet_max {
                    Err(AutocompleteError::IllegalCharacter(c))
                } else {
                    Ok((cp - self.alphabet_min) as usize)
                }
            })
            .collect()
    }

    fn symbol_char(&self, symbol: usize) -> char {
        // Symbols only exist on nodes created from validated characters.
        char::from_u32(self.alphabet_min + symbol as u32)
            .expect("symbol derived from a validated character")
    }

    fn blank_node(&self, symbol: usize) -> TrieNode {
        TrieNode {
            is_word: false,
            symbol,
            accepts: 0,
            children: vec![None; self.alphabet_size].into_boxed_slice(),
        }
    }

    fn alloc(&mut self, symbol: usize) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                let size = self.alphabet_size;
                let node = &mut self.nodes[id];
                node.is_word = false;
                node.symbol = symbol;
                node.accepts = 0;
                node.children = vec![None; size].into_boxed_slice();
                id
            }
            None => {
                let node = self.blank_node(symbol);
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn walk(&self, offsets: &[usize]) -> Option<NodeId> {
        let mut node_id = ROOT;
        for &off in offsets {
            node_id = self.nodes[node_id].children[off]?;
        }
        Some(node_id)
    }

    fn insert_offsets(&mut self, offsets: &[usize]) {
        let mut node_id = ROOT;
        for (i, &off) in offsets.iter().enumerate() {
            let existing = self.nodes[node_id].children[off];
            let next = match existing {
                Some(id) => id,
                None => {
                    let id = self.alloc(off);
                    self.nodes[node_id].children[off] = Some(id);
                    id
                }
            };
            node_id = next;
            if i == offsets.len() - 1 {
                self.nodes[node_id].is_word = true;
            }
        }
    }

    /// Returns true if a word was actually removed. Prunes upward from
    /// the cleared terminal until an ancestor is terminal itself or
    /// still has another live child.
    fn remove_offsets(&mut self, offsets: &[usize]) -> bool {
        let mut stack = Vec::with_capacity(offsets.len());
        let mut node_id = ROOT;
        for &off in offsets {
            match self.nodes[node_id].children[off] {
                Some(next) => {
                    stack.push(node_id);
                    node_id = next;
                }
                None => return false,
            }
        }
        if node_id == ROOT || !self.nodes[node_id].is_word {
            return false;
        }
        self.nodes[node_id].is_word = false;
        if self.nodes[node_id].children.iter().any(Option::is_some) {
            return true;
        }
        while let Some(parent_id) = stack.pop() {
            let symbol = self.nodes[node_id].symbol;
            self.nodes[parent_id].children[symbol] = None;
            self.free.push(node_id);
            if self.nodes[parent_id].is_word
                || self.nodes[parent_id].children.iter().any(Option::is_some)
            {
                return true;
            }
            node_id = parent_id;
        }
        true
    }

    #[cfg(test)]
    fn live_node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    #[cfg(test)]
    fn root_child_count(&self) -> usize {
        self.nodes[ROOT].children.iter().flatten().count()
    }
}
