pub mod checker;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod preprocess;
pub mod report;
pub mod scheduler;
pub mod tally;

pub use checker::{SpellCheckTask, TaskResult, TaskState};
pub use config::Config;
pub use context::{EngineContext, Summary};
pub use error::EngineError;
pub use scheduler::TaskScheduler;
pub use tally::{MisspellingAggregator, MisspellingRecord};
