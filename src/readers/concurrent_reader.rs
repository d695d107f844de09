use crate::error::{ProcessingError, Result};
use crate::models::ObservationTable;
use crate::readers::ObservationReader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::info;

/// Reads several observation files at once
pub struct ConcurrentReader {
    max_workers: usize,
}

impl ConcurrentReader {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Read every file and concatenate the tables in the order given
    pub async fn read_all(&self, paths: &[PathBuf]) -> Result<ObservationTable> {
        let permits = Arc::new(Semaphore::new(self.max_workers));

        let handles: Vec<JoinHandle<Result<ObservationTable>>> = paths
            .iter()
            .cloned()
            .map(|path| tokio::spawn(Self::read_one(path, permits.clone())))
            .collect();

        // Await in spawn order so the table keeps argument order
        let mut tables = Vec::with_capacity(handles.len());
        for handle in handles {
            tables.push(handle.await??);
        }

        let table = ObservationTable::concat(tables);
        info!(
            files = paths.len(),
            rows = table.len(),
            "loaded observations"
        );

        Ok(table)
    }

    async fn read_one(path: PathBuf, permits: Arc<Semaphore>) -> Result<ObservationTable> {
        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|e| ProcessingError::Config(format!("Reader pool closed: {}", e)))?;

        tokio::task::spawn_blocking(move || ObservationReader::new().read_observations(&path))
            .await?
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn observation_file(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "station,valid,lon,lat,tmpf").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_read_all_keeps_argument_order() -> Result<()> {
        let first = observation_file(&[
            "AAA,2017-08-21 15:00,-100.0,40.0,80.0",
            "AAA,2017-08-21 16:00,-100.0,40.0,75.0",
        ]);
        let second = observation_file(&["BBB,2017-08-21 15:00,-101.0,41.0,82.0"]);

        let reader = ConcurrentReader::new(2);
        let table = reader
            .read_all(&[second.path().to_path_buf(), first.path().to_path_buf()])
            .await?;

        let stations: Vec<&str> = table
            .observations()
            .iter()
            .map(|o| o.station.as_str())
            .collect();
        assert_eq!(stations, ["BBB", "AAA", "AAA"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_read_all_missing_file() {
        let reader = ConcurrentReader::new(1);
        let result = reader
            .read_all(&[PathBuf::from("/nonexistent/asos.txt")])
            .await;

        assert!(result.is_err());
    }
}
