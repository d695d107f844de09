use crate::error::{ProcessingError, Result};
use crate::models::{DeltaFrame, SnapshotFrame};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write temperature-change frames, one batch per frame
    pub fn write_delta_frames(&self, frames: &[DeltaFrame], path: &Path) -> Result<usize> {
        let schema = Self::delta_schema();
        let mut writer = self.open(path, schema.clone())?;
        let mut rows = 0;

        for frame in frames.iter().filter(|f| !f.deltas.is_empty()) {
            let batch = Self::delta_frame_to_batch(frame, schema.clone())?;
            rows += batch.num_rows();
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(rows)
    }

    /// Write observation snapshot frames, one batch per frame
    pub fn write_snapshot_frames(&self, frames: &[SnapshotFrame], path: &Path) -> Result<usize> {
        let schema = Self::snapshot_schema();
        let mut writer = self.open(path, schema.clone())?;
        let mut rows = 0;

        for frame in frames.iter().filter(|f| !f.observations.is_empty()) {
            let batch = Self::snapshot_frame_to_batch(frame, schema.clone())?;
            rows += batch.num_rows();
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(rows)
    }

    fn open(&self, path: &Path, schema: Arc<Schema>) -> Result<ArrowWriter<File>> {
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        Ok(ArrowWriter::try_new(file, schema, Some(props))?)
    }

    fn timestamp_field(name: &str, nullable: bool) -> Field {
        Field::new(name, DataType::Timestamp(TimeUnit::Second, None), nullable)
    }

    /// Arrow schema for temperature-change frames
    pub fn delta_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("frame_index", DataType::UInt32, false),
            Self::timestamp_field("frame_time", false),
            Field::new("station", DataType::Utf8, false),
            Field::new("longitude", DataType::Float64, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("temp_change", DataType::Float64, true),
            Self::timestamp_field("early_valid", true),
            Self::timestamp_field("late_valid", true),
        ]))
    }

    /// Arrow schema for snapshot frames
    pub fn snapshot_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("frame_index", DataType::UInt32, false),
            Self::timestamp_field("frame_time", false),
            Field::new("station", DataType::Utf8, false),
            Self::timestamp_field("valid", true),
            Field::new("longitude", DataType::Float64, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("temperature", DataType::Float64, true),
        ]))
    }

    fn delta_frame_to_batch(frame: &DeltaFrame, schema: Arc<Schema>) -> Result<RecordBatch> {
        let rows = frame.deltas.len();
        let deltas = &frame.deltas;

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt32Array::from(vec![frame.index; rows])),
                Arc::new(TimestampSecondArray::from(vec![to_epoch(frame.time); rows])),
                Arc::new(StringArray::from_iter_values(
                    deltas.iter().map(|d| d.station.as_str()),
                )),
                Arc::new(Float64Array::from_iter(deltas.iter().map(|d| d.longitude))),
                Arc::new(Float64Array::from_iter(deltas.iter().map(|d| d.latitude))),
                Arc::new(Float64Array::from_iter(
                    deltas.iter().map(|d| d.temperature_change),
                )),
                Arc::new(TimestampSecondArray::from(
                    deltas.iter().map(|d| d.early_valid.map(to_epoch)).collect::<Vec<_>>(),
                )),
                Arc::new(TimestampSecondArray::from(
                    deltas.iter().map(|d| d.late_valid.map(to_epoch)).collect::<Vec<_>>(),
                )),
            ],
        )?;

        Ok(batch)
    }

    fn snapshot_frame_to_batch(frame: &SnapshotFrame, schema: Arc<Schema>) -> Result<RecordBatch> {
        let rows = frame.observations.len();
        let observations = &frame.observations;

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt32Array::from(vec![frame.index; rows])),
                Arc::new(TimestampSecondArray::from(vec![to_epoch(frame.time); rows])),
                Arc::new(StringArray::from_iter_values(
                    observations.iter().map(|o| o.station.as_str()),
                )),
                Arc::new(TimestampSecondArray::from(
                    observations.iter().map(|o| o.valid.map(to_epoch)).collect::<Vec<_>>(),
                )),
                Arc::new(Float64Array::from_iter(observations.iter().map(|o| o.longitude))),
                Arc::new(Float64Array::from_iter(observations.iter().map(|o| o.latitude))),
                Arc::new(Float64Array::from_iter(observations.iter().map(|o| o.temperature))),
            ],
        )?;

        Ok(batch)
    }

    /// Read temperature-change rows back from a frame file
    pub fn read_delta_rows(&self, path: &Path, limit: usize) -> Result<Vec<DeltaRow>> {
        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(8192)
            .build()?;

        let mut rows = Vec::new();

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let frame_index = column::<UInt32Array>(&batch, "frame_index")?;
            let frame_time = column::<TimestampSecondArray>(&batch, "frame_time")?;
            let station = column::<StringArray>(&batch, "station")?;
            let longitude = column::<Float64Array>(&batch, "longitude")?;
            let latitude = column::<Float64Array>(&batch, "latitude")?;
            let temp_change = column::<Float64Array>(&batch, "temp_change")?;

            for i in 0..batch.num_rows() {
                if limit > 0 && rows.len() >= limit {
                    return Ok(rows);
                }

                rows.push(DeltaRow {
                    frame_index: frame_index.value(i),
                    frame_time: from_epoch(frame_time.value(i))?,
                    station: station.value(i).to_string(),
                    longitude: optional(longitude, i),
                    latitude: optional(latitude, i),
                    temp_change: optional(temp_change, i),
                });
            }
        }

        Ok(rows)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            Some(metadata.row_group(0).column(0).compression())
        } else {
            None
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// One temperature-change row read back from Parquet
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow {
    pub frame_index: u32,
    pub frame_time: NaiveDateTime,
    pub station: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub temp_change: Option<f64>,
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub file_size: u64,
    pub compression: Option<Compression>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression
                .map(|c| format!("{:?}", c))
                .unwrap_or_else(|| "n/a".to_string()),
            avg_rows
        )
    }
}

fn to_epoch(time: NaiveDateTime) -> i64 {
    time.and_utc().timestamp()
}

fn from_epoch(seconds: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0)
        .map(|t| t.naive_utc())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid timestamp: {}", seconds)))
}

fn optional(array: &Float64Array, i: usize) -> Option<f64> {
    if array.is_null(i) {
        None
    } else {
        Some(array.value(i))
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::MissingColumn {
            column: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Observation, TemperatureDelta};
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 8, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn delta_frame(index: u32, time: NaiveDateTime) -> DeltaFrame {
        let early = Observation::new(
            "OTM",
            Some(time - chrono::Duration::hours(1)),
            Some(-92.45),
            Some(41.1),
            Some(80.0),
        );
        let late = Observation::new("OTM", Some(time), Some(-92.45), Some(41.1), Some(74.5));
        let no_temp = Observation::new("BRL", Some(time), Some(-91.12), Some(40.78), None);

        DeltaFrame {
            index,
            time,
            deltas: vec![
                TemperatureDelta::from_pair(&early, &late),
                TemperatureDelta::from_pair(&no_temp, &no_temp),
            ],
        }
    }

    #[test]
    fn test_write_and_read_delta_frames() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        let frames = vec![delta_frame(0, at(18, 0)), delta_frame(1, at(18, 10))];
        let written = writer.write_delta_frames(&frames, temp_file.path())?;
        assert_eq!(written, 4);

        let rows = writer.read_delta_rows(temp_file.path(), 0)?;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].frame_index, 0);
        assert_eq!(rows[0].frame_time, at(18, 0));
        assert_eq!(rows[0].station, "OTM");
        assert_eq!(rows[0].temp_change, Some(-5.5));
        assert_eq!(rows[1].temp_change, None);
        assert_eq!(rows[3].frame_time, at(18, 10));

        let limited = writer.read_delta_rows(temp_file.path(), 3)?;
        assert_eq!(limited.len(), 3);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 4);

        Ok(())
    }

    #[test]
    fn test_write_empty_frames() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        let frames = vec![DeltaFrame {
            index: 0,
            time: at(15, 0),
            deltas: vec![],
        }];
        let written = writer.write_delta_frames(&frames, temp_file.path())?;
        assert_eq!(written, 0);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 0);
        assert!(info.summary().contains("Total rows: 0"));

        Ok(())
    }

    #[test]
    fn test_write_snapshot_frames() -> Result<()> {
        let writer = ParquetWriter::new().with_compression("zstd")?;
        let temp_file = NamedTempFile::new()?;

        let frames = vec![SnapshotFrame {
            index: 0,
            time: at(18, 0),
            observations: vec![
                Observation::new("OTM", Some(at(17, 58)), Some(-92.45), Some(41.1), Some(74.5)),
                Observation::new("BRL", Some(at(18, 2)), None, None, Some(76.0)),
            ],
        }];

        let written = writer.write_snapshot_frames(&frames, temp_file.path())?;
        assert_eq!(written, 2);
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 2);

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_delta_frames(&[delta_frame(0, at(18, 0))], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-max").is_err());

        Ok(())
    }
}
