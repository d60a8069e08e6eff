// File: src/core/ranked.rs

/// One completion hit waiting to be flushed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Hit {
    word: String,
    accepts: u64,
}

/// An insertion-order-stable priority list of completion hits.
///
/// Hits are kept sorted by accept count descending. Unboosted hits
/// (count 0) append at the tail, so among them arrival order is result
/// order. A boosted hit lands in front of the first entry with a
/// strictly smaller count; within a band of equal counts arrival order
/// is preserved, except that a hit strictly greater than the current
/// head always becomes the new head.
///
/// Built fresh per completion query and discarded after flushing.
#[derive(Debug, Default)]
pub struct RankedResultList {
    hits: Vec<Hit>,
}

impl RankedResultList {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(k) in the current list length, which is bounded by the
    /// engine's result size.
    pub fn insert(&mut self, word: impl Into<String>, accepts: u64) {
        let hit = Hit {
            word: word.into(),
            accepts,
        };
        if accepts == 0 || self.hits.is_empty() {
            self.hits.push(hit);
            return;
        }
        if accepts > self.hits[0].accepts {
            self.hits.insert(0, hit);
            return;
        }
        let pos = self.hits[1..]
            .iter()
            .position(|existing| accepts > existing.accepts)
            .map(|p| p + 1)
            .unwrap_or(self.hits.len());
        self.hits.insert(pos, hit);
    }

    /// Returns the first `limit` words in list order, or all of them if
    /// `limit` is 0. Does not consume the list.
    pub fn flush(&self, limit: usize) -> Vec<String> {
        let take = if limit == 0 { self.hits.len() } else { limit };
        self.hits
            .iter()
            .take(take)
            .map(|hit| hit.word.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
