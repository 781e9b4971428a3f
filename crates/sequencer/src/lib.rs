//! Drives one title-maintenance run: authenticate, read the latest comment,
//! read the video's statistics and snippet, compose the target title and
//! write it back only when it differs from the current one.

mod config;
mod error;
mod observer;
mod run;
mod state;

pub use config::{ConfigError, RunConfig};
pub use error::{EmptyResultError, RunError, Stage};
pub use observer::{StageObserver, TracingObserver};
pub use run::{RunOutcome, Sequencer};
pub use state::RunState;
