//! Error types for settings operations

use thiserror::Error;

use crate::value::ValueType;

/// Errors that can occur when parsing key binding text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid key syntax: {0}")]
    InvalidKeySyntax(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),
}

/// Errors that can occur when reading or writing a setting value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error("Type mismatch for setting {key}: declared {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Setting kind {kind} cannot hold a {actual} value")]
    KindMismatch { kind: String, actual: ValueType },

    #[error("Value out of range for setting {key}: {message}")]
    OutOfRange { key: String, message: String },

    #[error("Key binding {binding} rejected by setting {key}")]
    BindingRejected { key: String, binding: String },

    #[error("Setting {0} is not a button")]
    NotAButton(String),
}

/// Errors that can occur while registering settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate setting key: {0}")]
    DuplicateKey(String),

    #[error("Default key binding {binding} already registered by {existing}")]
    DuplicateBinding { binding: String, existing: String },

    #[error("Key binding setting {0} needs a bound default")]
    UnboundDefault(String),

    #[error("Invalid default for setting {key}: {reason}")]
    InvalidDefault { key: String, reason: String },

    #[error("A settings registry already exists in this process")]
    AlreadyCreated,
}

/// Errors that can occur in the persistence layer
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corrupted snapshot: {0}")]
    CorruptedSnapshot(String),

    #[error("Store has not been loaded yet")]
    NotLoaded,

    #[error("Store error: {0}")]
    Store(String),

    #[error("No default settings location available")]
    NoDefaultLocation,
}

/// Errors that can occur while loading registry configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
