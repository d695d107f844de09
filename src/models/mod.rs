pub mod delta;
pub mod frame;
pub mod observation;

pub use delta::TemperatureDelta;
pub use frame::{DeltaFrame, SnapshotFrame};
pub use observation::{Observation, ObservationTable};
