pub mod constants;
pub mod filename;
pub mod progress;
pub mod time;

pub use constants::*;
pub use filename::{generate_default_delta_filename, generate_default_snapshot_filename};
pub use progress::ProgressReporter;
pub use time::{checked_minutes, non_negative_minutes, parse_instant, parse_observation_time};
