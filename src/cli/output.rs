use crate::context::Summary;
use crate::tally::MisspellingRecord;
use colored::*;
use parking_lot::{Mutex, MutexGuard};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Terminal writer shared by the menu and every task.
///
/// All writes take the console lock so lines from concurrent tasks never
/// interleave.
pub struct Console {
    lock: Mutex<()>,
    colored: bool,
}

impl Console {
    pub fn new(colored: bool) -> Self {
        Self {
            lock: Mutex::new(()),
            colored,
        }
    }

    pub fn colored(&self) -> bool {
        self.colored
    }

    /// Hold the console for a multi-line write.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    pub fn notice(&self, message: &str) {
        let _guard = self.lock();
        if self.colored {
            println!("{}", message.yellow());
        } else {
            println!("{}", message);
        }
    }

    /// Report a failure on stderr, including its underlying cause.
    pub fn error(&self, err: &(dyn Error + 'static)) {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }

        let _guard = self.lock();
        if self.colored {
            eprintln!("{} {}", "Error:".red().bold(), message);
        } else {
            eprintln!("Error: {}", message);
        }
    }
}

pub fn print_summary(summary: &Summary, console: &Console, format: OutputFormat) {
    let _guard = console.lock();
    match format {
        OutputFormat::Text => print_text_summary(summary, console.colored()),
        OutputFormat::Json => print_json_summary(summary),
    }
}

fn print_text_summary(summary: &Summary, colored_output: bool) {
    println!();
    if colored_output {
        println!(
            "Number of files processed: {}",
            summary.files_with_errors.to_string().bold()
        );
        println!(
            "Number of spelling errors: {}",
            summary.total_misspelled.to_string().red().bold()
        );
        if summary.failed_tasks > 0 {
            println!(
                "Number of failed tasks: {}",
                summary.failed_tasks.to_string().red().bold()
            );
        }
    } else {
        println!("Number of files processed: {}", summary.files_with_errors);
        println!("Number of spelling errors: {}", summary.total_misspelled);
        if summary.failed_tasks > 0 {
            println!("Number of failed tasks: {}", summary.failed_tasks);
        }
    }

    println!("{}", ranking_line(&summary.top, summary.top_n, colored_output));
    println!();
}

fn print_json_summary(summary: &Summary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize summary: {}", e),
    }
}

/// Sentence describing the most common misspellings, e.g.
/// `Three most common misspellings: teh (4 times) wrod (1 time)`.
pub fn ranking_line(top: &[MisspellingRecord], requested: usize, colored_output: bool) -> String {
    let heading = match top.len() {
        0 => return "There are no misspelled words".to_string(),
        1 if requested > 1 => "There is only one misspelled word:".to_string(),
        n if n < requested => format!("There are only {} misspelled words:", number_word(n)),
        1 => "Most common misspelling:".to_string(),
        n => format!("{} most common misspellings:", capitalize(&number_word(n))),
    };

    let entries = top
        .iter()
        .map(|record| {
            let unit = if record.count == 1 { "time" } else { "times" };
            let word = if colored_output {
                record.word.red().bold().to_string()
            } else {
                record.word.clone()
            };
            format!("{} ({} {})", word, record.count, unit)
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!("{} {}", heading, entries)
}

fn number_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
