pub mod parquet_writer;

pub use parquet_writer::{DeltaRow, ParquetFileInfo, ParquetWriter};
