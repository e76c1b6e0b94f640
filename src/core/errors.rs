//! Custom error types for model loading and translation

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Language pair label is not part of the registry
    #[error("Unknown language pair: {label}")]
    NotFound {
        /// The label that was asked for
        label: String,
    },

    /// A tokenizer or model could not be loaded at startup
    #[error("Failed to load model {model}: {message}")]
    StartupLoadError {
        /// Model name
        model: String,
        /// Underlying cause
        message: String,
    },

    /// The underlying model call failed
    #[error("Generation failed: {message}")]
    GenerationError {
        /// Underlying cause
        message: String,
    },

    /// Input text was empty or whitespace only
    #[error("Please enter text.")]
    EmptyInput,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Layered configuration could not be built
    #[error("Settings error: {0}")]
    SettingsError(#[from] config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Build a startup load error for the named model
    pub fn load(model: impl Into<String>, err: impl std::fmt::Display) -> Self {
        TranslationError::StartupLoadError {
            model: model.into(),
            message: err.to_string(),
        }
    }

    /// Build a generation error from any displayable failure
    pub fn generation(err: impl std::fmt::Display) -> Self {
        TranslationError::GenerationError {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
