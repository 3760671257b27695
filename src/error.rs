use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the occupancy core.
#[derive(Error, Debug)]
pub enum ShopSenseError {
    /// The history store could not be opened, initialized, written or queried.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The export destination could not be created or written.
    #[error("Failed to write export file {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShopSenseError {
    pub fn is_storage(&self) -> bool {
        matches!(self, ShopSenseError::Storage(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShopSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_export() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ShopSenseError::Export { path: PathBuf::from("/ro/Mall_history.csv"), source: io_err };
        let msg = err.to_string();
        assert!(msg.contains("Failed to write export file"));
        assert!(msg.contains("/ro/Mall_history.csv"));
        assert!(msg.contains("denied"));
        assert!(!err.is_storage());
    }

    #[test]
    fn test_error_display_config() {
        let err = ShopSenseError::Config("no locations configured".to_string());
        assert_eq!(err.to_string(), "Configuration error: no locations configured");
    }

    #[test]
    fn test_error_from_rusqlite() {
        let err: ShopSenseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_storage());
        assert!(err.to_string().starts_with("Storage error:"));
    }
}
