//! Error types for scribe

use thiserror::Error;

/// Result type alias for scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Unified error type for all scribe operations
///
/// Every error is terminal for the invocation: nothing is retried, the
/// failure is reported once to the host and the process exits non-zero.
#[derive(Error, Debug, Clone)]
pub enum ScribeError {
    /// The driver could not be instantiated before any connection attempt
    #[error("Driver error: {0}")]
    Driver(String),

    /// Server unreachable or authentication rejected
    #[error("Connection error: {0}")]
    Connection(String),

    /// Partial login credentials and no usable fallback file
    #[error("Credential error: {0}")]
    Credential(String),

    /// Known-bad server/driver pairing
    #[error("Incompatible version: {0}")]
    IncompatibleVersion(String),

    /// Malformed parameter record, name, or data/filter document
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Driver-level failure while performing the write action
    #[error("Unable to {action}: {message}")]
    Write { action: String, message: String },
}

impl ScribeError {
    /// The failing stage reported to the host in the failure envelope
    ///
    /// For write failures this is the action name (insert/update/upsert).
    pub fn stage(&self) -> &str {
        match self {
            ScribeError::Driver(_) => "driver",
            ScribeError::Connection(_) => "connect",
            ScribeError::Credential(_) => "credentials",
            ScribeError::IncompatibleVersion(_) => "compatibility",
            ScribeError::Validation(_) => "validation",
            ScribeError::Serialization(_) | ScribeError::Deserialization(_) => "serialization",
            ScribeError::Write { action, .. } => action,
        }
    }

    /// The underlying cause without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            ScribeError::Driver(m)
            | ScribeError::Connection(m)
            | ScribeError::Credential(m)
            | ScribeError::IncompatibleVersion(m)
            | ScribeError::Validation(m)
            | ScribeError::Serialization(m)
            | ScribeError::Deserialization(m) => m,
            ScribeError::Write { message, .. } => message,
        }
    }

    /// Builds a write error carrying the action name
    pub fn write(action: impl Into<String>, message: impl Into<String>) -> Self {
        ScribeError::Write {
            action: action.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        ScribeError::Deserialization(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for ScribeError {
    fn from(err: mongodb::error::Error) -> Self {
        ScribeError::Connection(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for ScribeError {
    fn from(err: bson::ser::Error) -> Self {
        ScribeError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for ScribeError {
    fn from(err: bson::de::Error) -> Self {
        ScribeError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_driver() {
        let err = ScribeError::Driver("tls init failed".to_string());
        assert_eq!(err.to_string(), "Driver error: tls init failed");
    }

    #[test]
    fn test_error_display_connection() {
        let err = ScribeError::Connection("connection refused".to_string());
        assert_eq!(err.to_string(), "Connection error: connection refused");
    }

    #[test]
    fn test_error_display_credential() {
        let err = ScribeError::Credential("login_user without login_password".to_string());
        assert_eq!(
            err.to_string(),
            "Credential error: login_user without login_password"
        );
    }

    #[test]
    fn test_error_display_incompatible_version() {
        let err = ScribeError::IncompatibleVersion("server 8.0 needs driver 3.0+".to_string());
        assert_eq!(
            err.to_string(),
            "Incompatible version: server 8.0 needs driver 3.0+"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let err = ScribeError::Validation("collection name cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: collection name cannot be empty"
        );
    }

    #[test]
    fn test_error_display_write() {
        let err = ScribeError::write("upsert", "duplicate key");
        assert_eq!(err.to_string(), "Unable to upsert: duplicate key");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ScribeError::Driver("x".into()).stage(), "driver");
        assert_eq!(ScribeError::Connection("x".into()).stage(), "connect");
        assert_eq!(ScribeError::Credential("x".into()).stage(), "credentials");
        assert_eq!(
            ScribeError::IncompatibleVersion("x".into()).stage(),
            "compatibility"
        );
        assert_eq!(ScribeError::Validation("x".into()).stage(), "validation");
        assert_eq!(ScribeError::write("insert", "x").stage(), "insert");
        assert_eq!(ScribeError::write("update", "x").stage(), "update");
    }

    #[test]
    fn test_message_strips_variant_prefix() {
        assert_eq!(ScribeError::Connection("refused".into()).message(), "refused");
        assert_eq!(ScribeError::write("insert", "dup key").message(), "dup key");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: ScribeError = json_err.into();
        assert!(matches!(err, ScribeError::Deserialization(_)));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(ScribeError::Validation("failed".to_string()));
        assert!(result.is_err());
    }
}
