// service/source.rs
// Where observation windows come from. The engine never fetches on its own.

use async_trait::async_trait;
use hilo_common::Observation;
use std::path::{Path, PathBuf};

use super::errors::ServiceError;

#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Recent observations, newest first.
    async fn fetch(&self) -> Result<Vec<Observation>, ServiceError>;
}

/// Reads a JSON array of `{ "value": n, "period_id": "..." }`, newest first.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ObservationSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Observation>, ServiceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        // Tolerate a UTF-8 BOM from hand-edited files.
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "\u{feff}[{{\"value\":8,\"period_id\":\"1002\"}},{{\"value\":1,\"period_id\":\"1001\"}}]"
        )
        .unwrap();

        let observations = JsonFileSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].period_id, "1002");
        assert_eq!(observations[0].value.value(), 8);
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let missing = JsonFileSource::new("/nonexistent/draws.json").fetch().await;
        assert!(matches!(missing, Err(ServiceError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{\"value\":11,\"period_id\":\"1\"}}]").unwrap();
        let invalid = JsonFileSource::new(file.path()).fetch().await;
        assert!(matches!(invalid, Err(ServiceError::Parse(_))));
    }
}
