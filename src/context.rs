use crate::cli::output::Console;
use crate::report::ReportLog;
use crate::tally::{Counters, MisspellingAggregator, MisspellingRecord, Tally};
use crate::Config;
use serde::Serialize;

/// State shared by every task of one engine run.
///
/// Each piece carries its own lock; the context itself is immutable and is
/// handed to tasks behind an `Arc`.
pub struct EngineContext {
    aggregator: MisspellingAggregator,
    counters: Counters,
    report_log: Option<ReportLog>,
    console: Console,
    hash_buckets: usize,
    top_n: usize,
}

impl EngineContext {
    pub fn new(config: &Config, console: Console) -> Self {
        let report_log = config
            .log_to_file
            .then(|| ReportLog::new(config.log_file.clone()));

        Self {
            aggregator: MisspellingAggregator::new(config.max_misspelled_words),
            counters: Counters::new(),
            report_log,
            console,
            hash_buckets: config.hash_buckets,
            top_n: config.top_n,
        }
    }

    pub fn aggregator(&self) -> &MisspellingAggregator {
        &self.aggregator
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn report_log(&self) -> Option<&ReportLog> {
        self.report_log.as_ref()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn hash_buckets(&self) -> usize {
        self.hash_buckets
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn summary(&self) -> Summary {
        let tally = self.counters.snapshot();
        Summary {
            files_with_errors: tally.files_with_errors,
            total_misspelled: tally.total_misspelled,
            failed_tasks: tally.failed_tasks,
            distinct_words: self.aggregator.total_distinct_words(),
            top_n: self.top_n,
            top: self.aggregator.top_ranked(self.top_n),
        }
    }

    pub fn tally(&self) -> Tally {
        self.counters.snapshot()
    }
}

/// Final figures handed to the output layer at shutdown.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub files_with_errors: u64,
    pub total_misspelled: u64,
    pub failed_tasks: u64,
    pub distinct_words: usize,
    pub top_n: usize,
    pub top: Vec<MisspellingRecord>,
}
