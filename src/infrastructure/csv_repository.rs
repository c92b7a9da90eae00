// CSV repository implementation for the append-only sample log
use crate::application::sample_repository::SampleRepository;
use crate::domain::sample::Sample;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleLogError {
    #[error("Failed to read sample log {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed record at line {line} of the sample log")]
    Record {
        line: usize,
        #[source]
        source: csv::Error,
    },
}

/// Header-less rows of `time,in_operation,power,error`
#[derive(Debug, Clone)]
pub struct CsvSampleRepository {
    path: PathBuf,
}

impl CsvSampleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(bytes: &[u8]) -> Result<Vec<Sample>, SampleLogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut samples = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|source| SampleLogError::Record {
                line: i + 1,
                source,
            })?;
            let field = |idx: usize| record.get(idx).unwrap_or("");
            samples.push(Sample::from_fields(field(0), field(1), field(2), field(3)));
        }

        Ok(samples)
    }
}

#[async_trait]
impl SampleRepository for CsvSampleRepository {
    async fn load_samples(&self) -> anyhow::Result<Vec<Sample>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SampleLogError::Read {
                path: self.path.clone(),
                source,
            })?;

        let samples = Self::parse(&bytes)?;
        tracing::debug!("Loaded {} samples from {}", samples.len(), self.path.display());
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::PowerReading;
    use std::io::Write;

    #[tokio::test]
    async fn test_loads_rows_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-05T10:00:00.000Z,true,7.3,").unwrap();
        writeln!(file, "2024-01-05T10:05:00.000Z,false,0,Boiler is in operation but the power value is 0.").unwrap();
        writeln!(file, "garbage,true,abc").unwrap();

        let repository = CsvSampleRepository::new(file.path());
        let samples = repository.load_samples().await.unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].power, PowerReading::Value(7.3));
        assert!(samples[0].in_operation);
        assert!(samples[1].error.is_some());
        assert_eq!(samples[2].time, None);
        assert_eq!(samples[2].error, None);
    }

    #[tokio::test]
    async fn test_empty_log() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let samples = CsvSampleRepository::new(file.path()).load_samples().await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_missing_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repository = CsvSampleRepository::new(dir.path().join("missing.csv"));

        let err = repository.load_samples().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SampleLogError>(),
            Some(SampleLogError::Read { .. })
        ));
    }

    #[test]
    fn test_quoted_error_column() {
        let samples =
            CsvSampleRepository::parse(b"2024-01-05T10:00:00Z,true,3,\"bad, really bad\"\n").unwrap();
        assert_eq!(samples[0].error.as_deref(), Some("bad, really bad"));
    }
}
