//! Process-wide misspelling statistics shared by every task.

use parking_lot::Mutex;
use serde::Serialize;

/// Maximum number of distinct misspelled words tracked at once.
pub const DEFAULT_CAPACITY: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MisspellingRecord {
    pub word: String,
    pub count: u64,
}

/// What a single [`MisspellingAggregator::record_misspelling`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Incremented,
    Inserted,
    /// The table is full and the word was not tracked yet.
    Dropped,
}

/// Ranked tally of misspelled words across all tasks.
///
/// Records live in a list capped at `capacity`. Once full, unseen words are
/// dropped while tracked words keep counting. Every mutation and every
/// ranking snapshot goes through the same lock.
pub struct MisspellingAggregator {
    records: Mutex<Vec<MisspellingRecord>>,
    capacity: usize,
}

impl MisspellingAggregator {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Linear scan for `word`, then increment or append.
    pub fn record_misspelling(&self, word: &str) -> RecordOutcome {
        let mut records = self.records.lock();

        if let Some(record) = records.iter_mut().find(|r| r.word == word) {
            record.count += 1;
            return RecordOutcome::Incremented;
        }

        if records.len() >= self.capacity {
            log::debug!("misspelling table full, dropping '{}'", word);
            return RecordOutcome::Dropped;
        }

        records.push(MisspellingRecord {
            word: word.to_string(),
            count: 1,
        });
        RecordOutcome::Inserted
    }

    /// The `k` most frequent misspellings, highest count first.
    pub fn top_ranked(&self, k: usize) -> Vec<MisspellingRecord> {
        let records = self.records.lock();
        rank(&records, k)
    }

    /// Run `f` on the current top `k` while the lock is still held, so no
    /// task can record a misspelling until `f` returns.
    pub fn with_top_ranked<T>(&self, k: usize, f: impl FnOnce(&[MisspellingRecord]) -> T) -> T {
        let records = self.records.lock();
        let top = rank(&records, k);
        f(&top)
    }

    pub fn total_distinct_words(&self) -> usize {
        self.records.lock().len()
    }

    pub fn count_of(&self, word: &str) -> Option<u64> {
        self.records
            .lock()
            .iter()
            .find(|r| r.word == word)
            .map(|r| r.count)
    }

    /// Copy of every record in insertion order.
    pub fn snapshot(&self) -> Vec<MisspellingRecord> {
        self.records.lock().clone()
    }
}

impl Default for MisspellingAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// Stable sort: ties keep first-seen order.
fn rank(records: &[MisspellingRecord], k: usize) -> Vec<MisspellingRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(k);
    sorted
}

/// Per-process totals reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Documents in which at least one misspelling was found. Documents
    /// without errors are not counted here.
    pub files_with_errors: u64,
    pub total_misspelled: u64,
    pub failed_tasks: u64,
}

/// Lock-guarded [`Tally`].
#[derive(Debug, Default)]
pub struct Counters {
    tally: Mutex<Tally>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished document with `misspelled` errors.
    pub fn record_document(&self, misspelled: u64) {
        if misspelled == 0 {
            return;
        }
        let mut tally = self.tally.lock();
        tally.files_with_errors += 1;
        tally.total_misspelled += misspelled;
    }

    pub fn record_failure(&self) {
        self.tally.lock().failed_tasks += 1;
    }

    pub fn snapshot(&self) -> Tally {
        *self.tally.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_increments_existing_word() {
        let agg = MisspellingAggregator::new(10);
        assert_eq!(agg.record_misspelling("teh"), RecordOutcome::Inserted);
        assert_eq!(agg.record_misspelling("teh"), RecordOutcome::Incremented);
        assert_eq!(agg.record_misspelling("recieve"), RecordOutcome::Inserted);

        assert_eq!(agg.count_of("teh"), Some(2));
        assert_eq!(agg.count_of("recieve"), Some(1));
        assert_eq!(agg.count_of("other"), None);
        assert_eq!(agg.total_distinct_words(), 2);
    }

    #[test]
    fn test_capacity_drops_new_words_only() {
        let agg = MisspellingAggregator::new(2);
        agg.record_misspelling("one");
        agg.record_misspelling("two");
        assert_eq!(agg.record_misspelling("three"), RecordOutcome::Dropped);
        assert_eq!(agg.record_misspelling("one"), RecordOutcome::Incremented);

        assert_eq!(agg.total_distinct_words(), 2);
        assert_eq!(agg.count_of("three"), None);
        assert_eq!(agg.count_of("one"), Some(2));
    }

    #[test]
    fn test_top_ranked_sorted_descending() {
        let agg = MisspellingAggregator::new(100);
        for (word, times) in [("a", 1), ("b", 5), ("c", 3), ("d", 5), ("e", 2)] {
            for _ in 0..times {
                agg.record_misspelling(word);
            }
        }

        let top = agg.top_ranked(3);
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        // Ties keep first-seen order.
        assert_eq!(top[0].word, "b");
        assert_eq!(top[1].word, "d");
        assert_eq!(top[2].word, "c");

        assert_eq!(agg.top_ranked(50).len(), 5);
        assert!(agg.top_ranked(0).is_empty());
    }

    #[test]
    fn test_ranking_does_not_reorder_records() {
        let agg = MisspellingAggregator::new(100);
        agg.record_misspelling("first");
        agg.record_misspelling("second");
        agg.record_misspelling("second");
        let _ = agg.top_ranked(2);

        let snapshot = agg.snapshot();
        assert_eq!(snapshot[0].word, "first");
        assert_eq!(snapshot[1].word, "second");
    }

    #[test]
    fn test_concurrent_recording_counts_every_call() {
        let agg = Arc::new(MisspellingAggregator::new(100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let agg = Arc::clone(&agg);
                thread::spawn(move || {
                    for _ in 0..500 {
                        agg.record_misspelling("teh");
                        agg.record_misspelling("wrod");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(agg.count_of("teh"), Some(4000));
        assert_eq!(agg.count_of("wrod"), Some(4000));
        assert_eq!(agg.total_distinct_words(), 2);
    }

    #[test]
    fn test_counters_ignore_clean_documents() {
        let counters = Counters::new();
        counters.record_document(0);
        counters.record_document(3);
        counters.record_document(2);
        counters.record_failure();

        let tally = counters.snapshot();
        assert_eq!(tally.files_with_errors, 2);
        assert_eq!(tally.total_misspelled, 5);
        assert_eq!(tally.failed_tasks, 1);
    }
}
