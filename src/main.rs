use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use dialoguer::{Input, Select};
use spelltally::cli::output::{self, Console, OutputFormat};
use spelltally::config::Overrides;
use spelltally::{logging, preprocess, Config, EngineContext, EngineError, SpellCheckTask, TaskScheduler};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "spelltally")]
#[command(version, about = "Concurrent spellchecker with a global misspelling ranking", long_about = None)]
struct Cli {
    /// Tasks to run, each given as INPUT=DICTIONARY. Starts the interactive menu when empty
    #[arg(value_name = "INPUT=DICTIONARY")]
    tasks: Vec<TaskSpec>,

    /// Append one line per document with misspellings to the log file
    #[arg(short, long)]
    log: bool,

    /// Log file to append to
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Check files as they are, without straightening apostrophes first
    #[arg(long)]
    no_preprocess: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

#[derive(Debug, Clone)]
struct TaskSpec {
    input: PathBuf,
    dictionary: PathBuf,
}

impl FromStr for TaskSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((input, dictionary)) if !input.is_empty() && !dictionary.is_empty() => {
                Ok(TaskSpec {
                    input: PathBuf::from(input),
                    dictionary: PathBuf::from(dictionary),
                })
            }
            _ => Err(format!("Expected INPUT=DICTIONARY, got: {}", s)),
        }
    }
}

/// Everything one run of the program shares between the menu and its tasks.
struct Session {
    config: Config,
    ctx: Arc<EngineContext>,
    scheduler: TaskScheduler,
    // Original path -> preprocessed copy, so each file is rewritten once.
    prepared: HashMap<PathBuf, PathBuf>,
}

impl Session {
    fn new(config: Config, colored: bool) -> Self {
        let ctx = Arc::new(EngineContext::new(&config, Console::new(colored)));
        let scheduler = TaskScheduler::new(config.thread_limit);
        Self {
            config,
            ctx,
            scheduler,
            prepared: HashMap::new(),
        }
    }

    fn console(&self) -> &Console {
        self.ctx.console()
    }

    /// Spawn one task. With `wait`, a denied admission blocks until a slot
    /// frees up and retries with the same preprocessed files.
    fn submit(&mut self, input: &Path, dictionary: &Path, wait: bool) -> Result<(), EngineError> {
        let label = input.display().to_string();
        let input = self.prepare(input);
        let dictionary = self.prepare(dictionary);

        loop {
            let task = SpellCheckTask::new(
                label.clone(),
                input.clone(),
                dictionary.clone(),
                Arc::clone(&self.ctx),
            );
            match task.spawn(&self.scheduler) {
                Err(e) if wait && e.is_admission_denied() => self.scheduler.wait_for_capacity(),
                Err(e) => return Err(e),
                Ok(_) => return Ok(()),
            }
        }
    }

    // A file that cannot be preprocessed is passed through untouched so the
    // task reports the underlying open failure itself.
    fn prepare(&mut self, path: &Path) -> PathBuf {
        if !self.config.preprocess {
            return path.to_path_buf();
        }
        if let Some(processed) = self.prepared.get(path) {
            return processed.clone();
        }

        match preprocess::replace_apostrophes(path) {
            Ok(processed) => {
                self.prepared.insert(path.to_path_buf(), processed.clone());
                processed
            }
            Err(e) => {
                log::warn!("{:#}", e);
                path.to_path_buf()
            }
        }
    }

    fn run_batch(&mut self, tasks: &[TaskSpec]) {
        for spec in tasks {
            if let Err(e) = self.submit(&spec.input, &spec.dictionary, true) {
                self.console().error(&e);
            }
        }
    }

    fn run_menu(&mut self) -> Result<()> {
        let items = ["Start a new spellchecking task", "Exit"];
        loop {
            let choice = Select::new()
                .with_prompt("Main Menu")
                .items(&items)
                .default(0)
                .interact()?;

            if choice != 0 {
                return Ok(());
            }

            if self.scheduler.active() >= self.scheduler.limit() {
                self.console().notice("Maximum number of active tasks reached.");
                continue;
            }

            let (input, dictionary) = {
                let _guard = self.console().lock();
                let input: String = Input::new()
                    .with_prompt("Enter the input text file name")
                    .interact_text()?;
                let dictionary: String = Input::new()
                    .with_prompt("Enter the dictionary file name")
                    .interact_text()?;
                (PathBuf::from(input), PathBuf::from(dictionary))
            };

            if let Err(e) = self.submit(&input, &dictionary, false) {
                self.console().error(&e);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spelltally", &mut io::stdout());
        return Ok(());
    }

    logging::init(cli.verbose);

    let config = Config::load(Overrides {
        log_to_file: cli.log,
        log_file: cli.log_file.clone(),
        no_preprocess: cli.no_preprocess,
    })?;

    let mut session = Session::new(config, !cli.no_color);
    let interactive = cli.tasks.is_empty();

    if interactive {
        session.run_menu()?;
    } else {
        session.run_batch(&cli.tasks);
    }

    session.scheduler.join_all();

    let summary = session.ctx.summary();
    output::print_summary(&summary, session.console(), cli.format);

    // Exit with appropriate code
    let failed = summary.total_misspelled > 0 || summary.failed_tasks > 0;
    if !interactive && failed && !cli.no_fail {
        std::process::exit(1);
    }

    Ok(())
}
