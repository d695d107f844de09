pub mod frame_analyzer;

pub use frame_analyzer::{DeltaStatistics, ExtremeChange, FrameAnalyzer, FrameStatistics};
