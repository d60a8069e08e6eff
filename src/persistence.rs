// File: src/persistence.rs
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{AutocompleteError, Result};

/// One persisted delta: a word and a signed accept count.
///
/// `accepts > 0` means the word carries that many accepts (newly learned
/// or boosted), `accepts == 0` means newly learned with no boost, and
/// `accepts == -1` is a removal tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub word: String,
    pub accepts: i64,
}

impl DeltaRecord {
    pub const TOMBSTONE: i64 = -1;

    pub fn learned(word: impl Into<String>, accepts: u64) -> Self {
        Self {
            word: word.into(),
            accepts: accepts as i64,
        }
    }

    pub fn removed(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            accepts: Self::TOMBSTONE,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.accepts < 0
    }
}

/// Writes the records back-to-back with bincode, no header. The write
/// goes through a temp file in the target directory and is persisted
/// atomically, so a crash mid-save never truncates an existing log.
pub fn write_records<I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = DeltaRecord>,
{
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let mut writer = BufWriter::new(&temp_file);

    let mut written = 0usize;
    for record in records {
        bincode::serialize_into(&mut writer, &record)
            .map_err(|e| AutocompleteError::Codec(e.to_string()))?;
        written += 1;
    }
    writer.flush()?;
    drop(writer);

    temp_file
        .persist(path)
        .map_err(|e| AutocompleteError::Io(e.error))?;
    debug!("saved {} delta records to {}", written, path.display());
    Ok(())
}

/// Reads records until end of file. A clean EOF terminates the stream;
/// anything else mid-record is a codec error.
pub fn read_records(path: &Path) -> Result<Vec<DeltaRecord>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();

    loop {
        match bincode::deserialize_from::<_, DeltaRecord>(&mut reader) {
            Ok(record) => records.push(record),
            Err(e) => match *e {
                bincode::ErrorKind::Io(ref io_err)
                    if io_err.kind() == ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                _ => return Err(AutocompleteError::Codec(e.to_string())),
            },
        }
    }
    debug!("read {} delta records from {}", records.len(), path.display());
    Ok(records)
}

/// Bookkeeping of what changed since construction (or the last
/// retrieve): words learned at runtime and words removed that the save
/// path must tombstone. Unchanged bulk-loaded words never appear here.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    new_words: HashSet<String>,
    removed_words: HashSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_learned(&mut self, word: &str) {
        self.new_words.insert(word.to_string());
    }

    /// A word that was never persisted as new is simply forgotten;
    /// otherwise it becomes a tombstone candidate.
    pub fn note_unlearned(&mut self, word: &str) {
        if !self.new_words.remove(word) {
            self.removed_words.insert(word.to_string());
        }
    }

    pub fn is_new(&self, word: &str) -> bool {
        self.new_words.contains(word)
    }

    pub fn tombstones(&self) -> impl Iterator<Item = DeltaRecord> + '_ {
        self.removed_words.iter().map(|w| DeltaRecord::removed(w.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_record_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");
        let records = vec![
            DeltaRecord::learned("alpha", 3),
            DeltaRecord::learned("beta", 0),
            DeltaRecord::removed("gamma"),
        ];
        write_records(&path, records.clone()).unwrap();
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn empty_stream_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");
        write_records(&path, Vec::new()).unwrap();
        assert_eq!(read_records(&path).unwrap(), Vec::new());
    }

    #[test]
    fn truncated_stream_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltas.bin");
        write_records(&path, vec![DeltaRecord::learned("alpha", 1)]).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 1);
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(
            read_records(&path),
            Err(AutocompleteError::Codec(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_records(&dir.path().join("absent.bin")),
            Err(AutocompleteError::Io(_))
        ));
    }

    #[test]
    fn unlearning_a_new_word_forgets_it() {
        let mut changes = ChangeSet::new();
        changes.note_learned("alpha");
        changes.note_unlearned("alpha");
        assert!(!changes.is_new("alpha"));
        assert_eq!(changes.tombstones().count(), 0);
    }

    #[test]
    fn unlearning_a_preexisting_word_tombstones_it() {
        let mut changes = ChangeSet::new();
        changes.note_unlearned("alpha");
        let tombs: Vec<_> = changes.tombstones().collect();
        assert_eq!(tombs, vec![DeltaRecord::removed("alpha")]);
    }
}
