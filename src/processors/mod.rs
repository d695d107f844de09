pub mod delta_calculator;
pub mod frame_builder;
pub mod frame_sequencer;
pub mod observation_checker;
pub mod time_window;

pub use delta_calculator::{compute_deltas, DeltaCalculator, JoinMode};
pub use frame_builder::FrameBuilder;
pub use frame_sequencer::{FrameInstants, FrameSequence};
pub use observation_checker::{DuplicateKey, ObservationChecker, ObservationReport};
pub use time_window::{select_within, TimeWindow};
