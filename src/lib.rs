pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod state;
pub mod stopwatch;

pub use error::FormatError;
pub use format::{DurationFormat, Field, derive_format, format_with_units, parse_simple};
pub use stopwatch::{Clock, Stopwatch, StopwatchState, SystemClock, TickUnit};

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, ValueEnum, Debug, Default, Serialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
