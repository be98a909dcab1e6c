/*!
Error types for the Palimpsest core engine.
*/

use thiserror::Error;

/// Result type used throughout the Palimpsest core.
pub type Result<T> = std::result::Result<T, PalimpsestError>;

/// Errors that can occur during snapshot operations.
#[derive(Error, Debug)]
pub enum PalimpsestError {
    /// Failure while capturing a new snapshot
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Failure while rewriting a snapshot entry's metadata
    #[error("Metadata update failed: {0}")]
    MetadataUpdate(String),

    /// Failure at any step of a restore
    #[error("Restore failed: {0}")]
    Restore(String),

    /// A snapshot entry could not be decoded at all (no recoverable timestamp)
    #[error("Undecodable snapshot entry: {0}")]
    Decode(String),

    /// Document store (vault) errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PalimpsestError {
    /// Create a new capture error
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Self::Capture(msg.into())
    }

    /// Create a new metadata update error
    pub fn metadata_update<S: Into<String>>(msg: S) -> Self {
        Self::MetadataUpdate(msg.into())
    }

    /// Create a new restore error
    pub fn restore<S: Into<String>>(msg: S) -> Self {
        Self::Restore(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PalimpsestError::capture("disk full");
        assert_eq!(err.to_string(), "Capture failed: disk full");

        let err = PalimpsestError::decode("no recoverable timestamp");
        assert!(err.to_string().contains("Undecodable"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PalimpsestError = io_err.into();
        assert!(matches!(err, PalimpsestError::Io(_)));
    }
}
