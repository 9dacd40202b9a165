pub mod dictionary;
pub mod tokenizer;

use crate::context::EngineContext;
use crate::error::{EngineError, Result};
use crate::scheduler::{TaskHandle, TaskScheduler};
use dictionary::DictionarySet;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizer::for_each_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    DictionaryLoading,
    Scanning,
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Created => "created",
            TaskState::DictionaryLoading => "dictionary-loading",
            TaskState::Scanning => "scanning",
            TaskState::Reporting => "reporting",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub label: String,
    pub misspelled: u64,
}

/// One document checked against one dictionary.
pub struct SpellCheckTask {
    label: String,
    input: PathBuf,
    dictionary: PathBuf,
    ctx: Arc<EngineContext>,
    history: Vec<TaskState>,
}

impl SpellCheckTask {
    /// `label` names the document in reports; `input` is the file actually
    /// scanned, which may be a preprocessed copy.
    pub fn new(
        label: impl Into<String>,
        input: impl Into<PathBuf>,
        dictionary: impl Into<PathBuf>,
        ctx: Arc<EngineContext>,
    ) -> Self {
        Self {
            label: label.into(),
            input: input.into(),
            dictionary: dictionary.into(),
            ctx,
            history: vec![TaskState::Created],
        }
    }

    pub fn state(&self) -> TaskState {
        self.history.last().copied().unwrap_or(TaskState::Created)
    }

    /// Every state visited so far, starting with `Created`.
    pub fn history(&self) -> &[TaskState] {
        &self.history
    }

    /// Drive the task to `Done` or `Failed`.
    ///
    /// Failures are counted and reported on the console before being
    /// returned; they never touch other tasks.
    pub fn run(&mut self) -> Result<TaskResult> {
        match self.execute() {
            Ok(result) => Ok(result),
            Err(err) => {
                self.transition(TaskState::Failed);
                self.ctx.counters().record_failure();
                self.ctx.console().error(&err);
                Err(err)
            }
        }
    }

    /// Run the task on its own thread, subject to the scheduler's limit.
    pub fn spawn(mut self, scheduler: &TaskScheduler) -> Result<TaskHandle> {
        let name = thread_name(&self.input);
        scheduler.spawn(name, move || {
            if let Ok(result) = self.run() {
                log::info!("{}: {} misspelled words", result.label, result.misspelled);
            }
        })
    }

    fn execute(&mut self) -> Result<TaskResult> {
        let mut dictionary = DictionarySet::with_buckets(self.ctx.hash_buckets())?;

        self.transition(TaskState::DictionaryLoading);
        dictionary.load_file(&self.dictionary)?;

        self.transition(TaskState::Scanning);
        let misspelled = self.scan(&dictionary)?;

        if misspelled > 0 {
            self.transition(TaskState::Reporting);
            self.report(misspelled);
        }

        drop(dictionary);
        self.transition(TaskState::Done);

        Ok(TaskResult {
            label: self.label.clone(),
            misspelled,
        })
    }

    fn scan(&self, dictionary: &DictionarySet) -> Result<u64> {
        let file = File::open(&self.input).map_err(|source| EngineError::DocumentOpen {
            path: self.input.clone(),
            source,
        })?;

        let aggregator = self.ctx.aggregator();
        let mut misspelled = 0u64;
        for_each_word(BufReader::new(file), |word| {
            if !dictionary.contains(&word) {
                misspelled += 1;
                aggregator.record_misspelling(&word);
            }
        })
        .map_err(|source| EngineError::Read {
            path: self.input.clone(),
            source,
        })?;

        Ok(misspelled)
    }

    fn report(&self, misspelled: u64) {
        self.ctx.counters().record_document(misspelled);

        let Some(log) = self.ctx.report_log() else {
            return;
        };

        // The ranking is read and written out under the aggregator lock.
        let appended = self
            .ctx
            .aggregator()
            .with_top_ranked(self.ctx.top_n(), |top| log.append(&self.label, misspelled, top));
        if let Err(err) = appended {
            self.ctx.console().error(&err);
        }
    }

    fn transition(&mut self, next: TaskState) {
        log::debug!("task {}: {} -> {}", self.label, self.state(), next);
        self.history.push(next);
    }
}

fn thread_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "task".to_string());
    format!("spellcheck-{}", name)
}
