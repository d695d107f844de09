pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, Commands, FrameArgs};
pub use commands::run;
pub use logging::init_logging;
