//! Duration text formats: pattern-driven rendering and parsing, pattern
//! inference from samples, and the short `1h 15m 34s` style.

pub mod derive;
pub mod descriptor;
pub mod pattern;
pub mod units;

pub use derive::{derive_format, parse_simple};
pub use descriptor::{DEFAULT_PATTERN, DurationFormat};
pub use pattern::Field;
pub use units::format_with_units;
