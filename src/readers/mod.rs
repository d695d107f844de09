pub mod concurrent_reader;
pub mod observation_reader;

pub use concurrent_reader::ConcurrentReader;
pub use observation_reader::{parse_measurement, ObservationReader};
