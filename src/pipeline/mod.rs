//! Pipeline entry points for watcher operations.
//!
//! - `MatchPipeline::tick`: one fetch → evaluate → notify cycle
//! - `Scheduler`: repeating timer driving ticks
//! - `reload_conditions`: swap in a condition table from a spreadsheet

pub mod scheduler;
pub mod state;
pub mod tick;

use std::path::Path;

use crate::error::Result;
use crate::services::ConditionLoader;

pub use scheduler::Scheduler;
pub use state::WatchState;
pub use tick::{MatchPipeline, TickOutcome, find_first_match};

/// Load a condition file and install it. On error the installed table is
/// left untouched.
pub fn reload_conditions(
    state: &WatchState,
    loader: &ConditionLoader,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let table = loader.load(path)?;
    let count = table.len();
    state.install_conditions(table);
    Ok(count)
}
