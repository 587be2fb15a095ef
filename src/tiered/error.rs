//! Tiered index error types
//!
//! Every error here is local to one call; the index stays usable afterwards.

use crate::btree::Key;
use thiserror::Error;

/// Errors that can occur in the tiering layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TieredError {
    /// Key falls outside `[0, max_key]`
    #[error("Key {key} out of range [0, {max_key}]")]
    OutOfRange { key: Key, max_key: Key },

    /// Only inclusive tiering (hot keys also live in cold) is implemented
    #[error("Unsupported tiering mode: only inclusive tiering is implemented")]
    UnsupportedMode,

    /// A parameter is outside its allowed range
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Result type alias for tiered index operations
pub type TieredResult<T> = Result<T, TieredError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TieredError::OutOfRange { key: 120, max_key: 99 };
        assert_eq!(err.to_string(), "Key 120 out of range [0, 99]");

        let err = TieredError::UnsupportedMode;
        assert_eq!(
            err.to_string(),
            "Unsupported tiering mode: only inclusive tiering is implemented"
        );

        let err = TieredError::InvalidParams("decay_alpha must be in [0, 1)".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameters: decay_alpha must be in [0, 1)"
        );
    }
}
