// File: src/core/lino.rs
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::core::ranked::RankedResultList;
use crate::core::types::SearchParams;
use crate::error::{AutocompleteError, Result};
use crate::persistence::{self, ChangeSet, DeltaRecord};

/// One chain link. `next` names the lexicographically next word, so the
/// words themselves act as stable pointers into the map.
#[derive(Debug, Clone, Default)]
struct Entry {
    accepts: u64,
    next: Option<String>,
}

/// The whole dictionary as one sorted singly-linked chain, accelerated
/// by a prefix→anchor map: for every prefix up to `prefix_depth`
/// characters, the map holds the lexicographically smallest word
/// carrying it. Queries jump to an anchor instead of scanning from the
/// head. Alphabet-agnostic; any string orders itself.
pub struct SkipListIndex {
    words: HashMap<String, Entry>,
    head: Option<String>,
    tail: Option<String>,
    prefix_map: HashMap<String, String>,
    prefix_depth: usize,
    params: SearchParams,
    changes: ChangeSet,
}

/// Character-boundary prefixes of `word`, shortest first, at most
/// `max_depth` of them.
fn prefixes_up_to(word: &str, max_depth: usize) -> Vec<&str> {
    let mut prefixes = Vec::new();
    for (depth, (idx, ch)) in word.char_indices().enumerate() {
        if depth >= max_depth {
            break;
        }
        prefixes.push(&word[..idx + ch.len_utf8()]);
    }
    prefixes
}

impl SkipListIndex {
    /// An empty index. `result_size` must not exceed `radius` (zeros
    /// mean the defaults).
    pub fn new(prefix_depth: usize, result_size: usize, radius: usize) -> Result<Self> {
        let params = SearchParams::checked(result_size, radius)?;
        Ok(Self {
            words: HashMap::new(),
            head: None,
            tail: None,
            prefix_map: HashMap::new(),
            prefix_depth,
            params,
            changes: ChangeSet::new(),
        })
    }

    /// Builds the sorted chain and prefix map from a word list. An
    /// empty list is a configuration error; use `new` for an engine
    /// that starts with nothing.
    pub fn from_words<I, S>(
        words: I,
        prefix_depth: usize,
        result_size: usize,
        radius: usize,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary: Vec<String> =
            words.into_iter().map(|w| w.as_ref().to_string()).collect();
        if dictionary.is_empty() {
            return Err(AutocompleteError::EmptyDictionary);
        }
        dictionary.sort();
        dictionary.dedup();

        let mut index = Self::new(prefix_depth, result_size, radius)?;
        for pair in dictionary.windows(2) {
            index.words.insert(
                pair[0].clone(),
                Entry {
                    accepts: 0,
                    next: Some(pair[1].clone()),
                },
            );
        }
        let last = dictionary.last().cloned();
        if let Some(last) = &last {
            index.words.insert(last.clone(), Entry::default());
        }
        index.head = dictionary.first().cloned();
        index.tail = last;

        for word in &dictionary {
            for prefix in prefixes_up_to(word, prefix_depth) {
                index
                    .prefix_map
                    .entry(prefix.to_string())
                    .or_insert_with(|| word.clone());
            }
        }
        Ok(index)
    }

    /// Builds an index from a dictionary file, one word per line.
    pub fn from_file(
        path: &Path,
        prefix_depth: usize,
        result_size: usize,
        radius: usize,
    ) -> Result<Self> {
        let words = crate::dictionary::load_words(path)?;
        Self::from_words(&words, prefix_depth, result_size, radius)
    }

    /// Splices `word` into the chain at its sorted position and records
    /// it for the next save.
    pub fn learn(&mut self, word: &str) -> Result<()> {
        if self.words.contains_key(word) {
            return Err(AutocompleteError::WordAlreadyKnown(word.to_string()));
        }
        let entry = match self.find_previous_word(word) {
            Some(prev) => {
                let prev_entry = self
                    .words
                    .get_mut(&prev)
                    .expect("predecessor is always indexed");
                Entry {
                    accepts: 0,
                    next: prev_entry.next.replace(word.to_string()),
                }
            }
            None => Entry {
                accepts: 0,
                next: self.head.replace(word.to_string()),
            },
        };
        self.words.insert(word.to_string(), entry);

        if self.tail.as_deref().map_or(true, |tail| word > tail) {
            self.tail = Some(word.to_string());
        }

        for prefix in prefixes_up_to(word, self.prefix_depth) {
            match self.prefix_map.entry(prefix.to_string()) {
                MapEntry::Occupied(mut anchor) => {
                    if word < anchor.get().as_str() {
                        anchor.insert(word.to_string());
                    }
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(word.to_string());
                }
            }
        }
        self.changes.note_learned(word);
        debug!("learned {:?}", word);
        Ok(())
    }

    /// Splices `word` out of the chain, re-anchoring or dropping every
    /// prefix-map entry that pointed at it.
    pub fn unlearn(&mut self, word: &str) -> Result<()> {
        let entry = self
            .words
            .remove(word)
            .ok_or_else(|| AutocompleteError::WordNotFound(word.to_string()))?;
        let next = entry.next;
        let prev = self.find_previous_word(word);

        match &prev {
            Some(prev) => {
                self.words
                    .get_mut(prev)
                    .expect("predecessor is always indexed")
                    .next = next.clone();
            }
            None => self.head = next.clone(),
        }
        if self.tail.as_deref() == Some(word) {
            self.tail = prev;
        }

        for prefix in prefixes_up_to(word, self.prefix_depth) {
            if self.prefix_map.get(prefix).map(String::as_str) == Some(word) {
                match &next {
                    Some(next) if next.starts_with(prefix) => {
                        self.prefix_map.insert(prefix.to_string(), next.clone());
                    }
                    _ => {
                        self.prefix_map.remove(prefix);
                    }
                }
            }
        }
        self.changes.note_unlearned(word);
        debug!("unlearned {:?}", word);
        Ok(())
    }

    /// Bumps the accept count of `word`, raising its completion rank.
    pub fn accept(&mut self, word: &str) -> Result<()> {
        let entry = self
            .words
            .get_mut(word)
            .ok_or_else(|| AutocompleteError::WordNotFound(word.to_string()))?;
        entry.accepts += 1;
        Ok(())
    }

    /// Returns up to `result_size` completions of `stem`. At most
    /// `radius` chain entries carrying the stem are scanned, so the
    /// accept ranking chooses among the `radius` shortest matches.
    pub fn complete(&self, stem: &str) -> Result<Vec<String>> {
        let mut result = RankedResultList::new();
        let mut hits = 0usize;

        let mut cursor: Option<String> = match self.words.get(stem) {
            Some(entry) => {
                result.insert(stem, entry.accepts);
                hits += 1;
                entry.next.clone()
            }
            None => match self.first_match(stem) {
                Some(first) => {
                    let entry = &self.words[&first];
                    result.insert(first.clone(), entry.accepts);
                    hits += 1;
                    entry.next.clone()
                }
                None => return Ok(Vec::new()),
            },
        };

        while hits < self.params.radius {
            let word = match cursor.take() {
                Some(word) if word.starts_with(stem) => word,
                _ => break,
            };
            let entry = &self.words[&word];
            result.insert(word.clone(), entry.accepts);
            hits += 1;
            cursor = entry.next.clone();
        }
        Ok(result.flush(self.params.result_size))
    }

    /// True if `word` is currently indexed.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Writes the accumulated deltas: accepted words, newly learned
    /// words, and one tombstone per removed word.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut records = Vec::new();
        for (word, entry) in &self.words {
            if entry.accepts > 0 || self.changes.is_new(word) {
                records.push(DeltaRecord::learned(word.clone(), entry.accepts));
            }
        }
        records.extend(self.changes.tombstones());
        persistence::write_records(path, records)
    }

    /// Replays a delta file: unknown words are learned, positive counts
    /// overwrite the accept count, tombstones unlearn. A tombstone for
    /// a word this index never knew is a no-op. Records are applied in
    /// order; the first error is returned with earlier records left in
    /// effect.
    pub fn retrieve(&mut self, path: &Path) -> Result<()> {
        let records = persistence::read_records(path)?;
        for record in records {
            if record.is_tombstone() {
                if self.words.contains_key(&record.word) {
                    self.unlearn(&record.word)?;
                }
                continue;
            }
            if !self.words.contains_key(&record.word) {
                self.learn(&record.word)?;
            }
            if record.accepts > 0 {
                if let Some(entry) = self.words.get_mut(&record.word) {
                    entry.accepts = record.accepts as u64;
                }
            }
        }
        Ok(())
    }

    /// The greatest indexed word sorting strictly before `candidate`,
    /// reached by anchoring at the longest mapped prefix whose anchor
    /// precedes the candidate and walking forward from there.
    fn find_previous_word(&self, candidate: &str) -> Option<String> {
        let head = self.head.as_deref()?;
        let mut start: Option<&str> = None;
        for prefix in prefixes_up_to(candidate, self.prefix_depth).iter().rev() {
            if let Some(anchor) = self.prefix_map.get(*prefix) {
                if anchor.as_str() < candidate {
                    start = Some(anchor.as_str());
                    break;
                }
            }
        }
        let first = start.unwrap_or(head);
        if first >= candidate {
            return None;
        }
        let mut prev = first.to_string();
        loop {
            match &self.words[&prev].next {
                Some(next) if next.as_str() < candidate => prev = next.clone(),
                _ => return Some(prev),
            }
        }
    }

    /// First chain entry starting with the full `stem`, found by
    /// anchoring at the longest registered prefix of the stem and
    /// scanning while that shorter prefix still holds.
    fn first_match(&self, stem: &str) -> Option<String> {
        let mut anchored: Option<(&str, &String)> = None;
        for prefix in prefixes_up_to(stem, stem.chars().count()).iter().rev() {
            if let Some(anchor) = self.prefix_map.get(*prefix) {
                anchored = Some((*prefix, anchor));
                break;
            }
        }
        let (prefix, anchor) = anchored?;
        let mut cursor = anchor.clone();
        while !cursor.starts_with(stem) {
            match &self.words[&cursor].next {
                Some(next) if next.starts_with(prefix) => cursor = next.clone(),
                _ => return None,
            }
        }
        Some(cursor)
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        // Chain: strictly ascending head-to-tail walk covering every word.
        let mut seen = 0usize;
        let mut cursor = self.head.clone();
        let mut last: Option<String> = None;
        while let Some(word) = cursor {
            if let Some(prev) = &last {
                assert!(prev < &word, "chain out of order: {:?} -> {:?}", prev, word);
            }
            let entry = self.words.get(&word).expect("chain names an unknown word");
            seen += 1;
            last = Some(word);
            cursor = entry.next.clone();
        }
        assert_eq!(seen, self.words.len(), "chain does not cover the word map");
        assert_eq!(self.tail, last, "tail does not match the chain end");

        // Prefix map: every anchor is the smallest word with its prefix,
        // and every live prefix is mapped.
        for (prefix, anchor) in &self.prefix_map {
            let min = self
                .words
                .keys()
                .filter(|w| w.starts_with(prefix.as_str()))
                .min()
                .unwrap_or_else(|| panic!("prefix {:?} maps to no live word", prefix));
            assert_eq!(anchor, min, "anchor for {:?} is not minimal", prefix);
        }
        for word in self.words.keys() {
            for prefix in prefixes_up_to(word, self.prefix_depth) {
                assert!(
                    self.prefix_map.contains_key(prefix),
                    "live prefix {:?} missing from map",
                    prefix
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_index() -> SkipListIndex {
        SkipListIndex::from_words(["aaa", "aaab", "aaac", "aaad", "abbbbb"], 3, 0, 0).unwrap()
    }

    #[test]
    fn rejects_empty_dictionary() {
        assert!(matches!(
            SkipListIndex::from_words(Vec::<String>::new(), 3, 0, 0),
            Err(AutocompleteError::EmptyDictionary)
        ));
    }

    #[test]
    fn rejects_result_size_over_radius() {
        assert!(matches!(
            SkipListIndex::new(3, 10, 5),
            Err(AutocompleteError::ResultSizeExceedsRadius { .. })
        ));
    }

    #[test]
    fn construction_satisfies_invariants() {
        small_index().assert_invariants();
    }

    #[test]
    fn completes_in_chain_order() {
        let index = small_index();
        assert_eq!(
            index.complete("aaa").unwrap(),
            vec!["aaa", "aaab", "aaac", "aaad"]
        );
        assert_eq!(index.complete("ab").unwrap(), vec!["abbbbb"]);
    }

    #[test]
    fn unknown_stem_yields_empty_result() {
        let index = small_index();
        assert_eq!(index.complete("zzz").unwrap(), Vec::<String>::new());
        assert_eq!(index.complete("").unwrap(), Vec::<String>::new());
        assert_eq!(index.complete("aaaba").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn accept_boosts_rank() {
        let mut index = small_index();
        index.accept("aaad").unwrap();
        assert_eq!(
            index.complete("aaa").unwrap(),
            vec!["aaad", "aaa", "aaab", "aaac"]
        );
        index.accept("aaac").unwrap();
        assert_eq!(
            index.complete("aaa").unwrap(),
            vec!["aaac", "aaad", "aaa", "aaab"]
        );
    }

    #[test]
    fn accept_of_unknown_word_fails() {
        let mut index = small_index();
        assert!(matches!(
            index.accept("zebra"),
            Err(AutocompleteError::WordNotFound(_))
        ));
    }

    #[test]
    fn radius_bounds_scanned_hits() {
        let index =
            SkipListIndex::from_words(["1234", "12345", "123456", "1234567", "12345678"], 3, 3, 4)
                .unwrap();
        // Four chain entries are scanned, the first three flushed.
        assert_eq!(
            index.complete("1234").unwrap(),
            vec!["1234", "12345", "123456"]
        );
    }

    #[test]
    fn learn_splices_at_head_middle_and_tail() {
        let mut index = SkipListIndex::from_words(["bbb", "ddd"], 3, 0, 0).unwrap();
        index.learn("aaa").unwrap();
        index.learn("ccc").unwrap();
        index.learn("eee").unwrap();
        index.assert_invariants();
        assert_eq!(index.head.as_deref(), Some("aaa"));
        assert_eq!(index.tail.as_deref(), Some("eee"));
        assert_eq!(
            index.complete("").unwrap(),
            Vec::<String>::new() // empty stem is never completed
        );
        assert_eq!(index.complete("c").unwrap(), vec!["ccc"]);
    }

    #[test]
    fn learn_rejects_known_words() {
        let mut index = small_index();
        assert!(matches!(
            index.learn("aaa"),
            Err(AutocompleteError::WordAlreadyKnown(_))
        ));
    }

    #[test]
    fn unlearn_rejects_unknown_words() {
        let mut index = small_index();
        assert!(matches!(
            index.unlearn("zzz"),
            Err(AutocompleteError::WordNotFound(_))
        ));
    }

    #[test]
    fn learn_then_unlearn_round_trips() {
        let mut index = small_index();
        let before = index.complete("a").unwrap();
        index.learn("aardvark").unwrap();
        index.unlearn("aardvark").unwrap();
        index.assert_invariants();
        assert_eq!(index.complete("a").unwrap(), before);
    }

    #[test]
    fn unlearn_of_extremes_moves_head_and_tail() {
        let mut index = small_index();
        index.unlearn("aaa").unwrap();
        assert_eq!(index.head.as_deref(), Some("aaab"));
        index.unlearn("abbbbb").unwrap();
        assert_eq!(index.tail.as_deref(), Some("aaad"));
        index.assert_invariants();
    }

    #[test]
    fn unlearning_everything_empties_the_chain() {
        let mut index = SkipListIndex::from_words(["aaa", "bbb"], 3, 0, 0).unwrap();
        index.unlearn("bbb").unwrap();
        index.unlearn("aaa").unwrap();
        assert!(index.head.is_none());
        assert!(index.tail.is_none());
        assert!(index.prefix_map.is_empty());
        index.assert_invariants();
        assert_eq!(index.complete("a").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn prefix_map_stays_minimal_under_churn() {
        let mut index = small_index();
        index.learn("aa").unwrap();
        index.assert_invariants();
        assert_eq!(index.prefix_map.get("aa").map(String::as_str), Some("aa"));
        index.unlearn("aa").unwrap();
        index.assert_invariants();
        assert_eq!(index.prefix_map.get("aa").map(String::as_str), Some("aaa"));
        index.unlearn("aaa").unwrap();
        index.unlearn("aaab").unwrap();
        index.unlearn("aaac").unwrap();
        index.unlearn("aaad").unwrap();
        index.assert_invariants();
        assert!(!index.prefix_map.contains_key("aa"));
        assert_eq!(index.prefix_map.get("a").map(String::as_str), Some("abbbbb"));
    }

    #[test]
    fn empty_engine_learns_from_scratch() {
        let mut index = SkipListIndex::new(3, 0, 0).unwrap();
        assert_eq!(index.complete("a").unwrap(), Vec::<String>::new());
        index.learn("banana").unwrap();
        index.learn("apple").unwrap();
        index.assert_invariants();
        assert_eq!(index.complete("a").unwrap(), vec!["apple"]);
        assert_eq!(index.head.as_deref(), Some("apple"));
        assert_eq!(index.tail.as_deref(), Some("banana"));
    }

    #[test]
    fn save_and_retrieve_reproduce_the_deltas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");

        let mut index = small_index();
        index.accept("aaad").unwrap();
        index.learn("azure").unwrap();
        index.unlearn("abbbbb").unwrap();
        index.save(&path).unwrap();

        let mut fresh =
            SkipListIndex::from_words(["aaa", "aaab", "aaac", "aaad", "abbbbb"], 3, 0, 0).unwrap();
        fresh.retrieve(&path).unwrap();
        fresh.assert_invariants();

        assert_eq!(
            fresh.complete("aaa").unwrap(),
            vec!["aaad", "aaa", "aaab", "aaac"]
        );
        assert!(fresh.contains("azure"));
        assert!(!fresh.contains("abbbbb"));
    }

    #[test]
    fn untouched_words_are_never_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");
        let index = small_index();
        index.save(&path).unwrap();
        assert_eq!(persistence::read_records(&path).unwrap(), Vec::new());
    }

    #[test]
    fn tombstone_for_unknown_word_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");
        persistence::write_records(&path, vec![DeltaRecord::removed("ghost")]).unwrap();

        let mut index = small_index();
        index.retrieve(&path).unwrap();
        assert!(!index.contains("ghost"));
        index.assert_invariants();

        let out = dir.path().join("out.bin");
        index.save(&out).unwrap();
        assert_eq!(persistence::read_records(&out).unwrap(), Vec::new());
    }
}
