//! Translation service: encode, generate, decode

use std::time::Instant;
use tracing::{debug, warn};

use crate::core::config::{GenerationConfig, DEFAULT_MAX_LENGTH};
use crate::core::errors::Result;
use crate::core::registry::ModelHandle;

/// Runs one translation against a borrowed [`ModelHandle`]
#[derive(Debug, Clone, Copy)]
pub struct TranslationService {
    max_length: usize,
}

impl Default for TranslationService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl TranslationService {
    /// Service capping output at `max_length` tokens
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Service using the configured generation settings
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.max_length)
    }

    /// Generated-token limit
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Translate `text` with the given handle.
    ///
    /// Input is not validated here: callers reject blank text first.
    /// Output beyond `max_length` generated tokens is cut off silently.
    pub fn translate(&self, text: &str, handle: &ModelHandle) -> Result<String> {
        let started = Instant::now();

        let input_ids = handle.tokenizer.encode(text)?;
        let mut output_ids = handle
            .model
            .generate(&input_ids, self.max_length)
            .inspect_err(|e| warn!("{} failed: {}", handle.model_name, e))?;
        output_ids.truncate(self.max_length);

        let translation = handle.tokenizer.decode(&output_ids)?;

        debug!(
            "Translated {} chars -> {} chars ({} tokens) with {} in {:?}",
            text.chars().count(),
            translation.chars().count(),
            output_ids.len(),
            handle.model_name,
            started.elapsed()
        );

        Ok(translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TranslatorConfig;
    use crate::core::errors::TranslationError;
    use crate::core::mock::MockLoader;
    use crate::core::registry::ModelRegistry;

    fn registry(loader: &MockLoader) -> ModelRegistry {
        ModelRegistry::initialize(&TranslatorConfig::default(), loader).unwrap()
    }

    #[test]
    fn test_translation_differs_from_input() {
        let registry = registry(&MockLoader::new());
        let handle = registry.lookup("English → Hindi").unwrap();

        let output = TranslationService::default().translate("Hello", handle).unwrap();
        assert!(!output.is_empty());
        assert_ne!(output, "Hello");
    }

    #[test]
    fn test_hindi_output_uses_another_script() {
        let registry = registry(&MockLoader::new());
        let handle = registry.lookup("English → Hindi").unwrap();

        let output = TranslationService::default().translate("Good morning", handle).unwrap();
        assert!(!output.is_empty());
        assert!(!output.is_ascii());
    }

    #[test]
    fn test_translation_is_idempotent() {
        let registry = registry(&MockLoader::new());
        let handle = registry.lookup("French → English").unwrap();
        let service = TranslationService::default();

        let first = service.translate("Bonjour tout le monde", handle).unwrap();
        let second = service.translate("Bonjour tout le monde", handle).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_long_output_is_truncated() {
        let registry = registry(&MockLoader::new());
        let handle = registry.lookup("English → Spanish").unwrap();
        let service = TranslationService::new(50);

        let output = service.translate(&"word ".repeat(100), handle).unwrap();
        // one id is the decoder start token
        assert_eq!(output.chars().count(), 49);
    }

    #[test]
    fn test_empty_input_is_delegated() {
        let registry = registry(&MockLoader::new());
        let handle = registry.lookup("English → French").unwrap();

        let output = TranslationService::default().translate("", handle).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_generation_error_propagates() {
        let registry = registry(&MockLoader::new().fail_generation_on("opus-mt-hi-en"));
        let handle = registry.lookup("Hindi → English").unwrap();

        let err = TranslationService::default().translate("नमस्ते", handle).unwrap_err();
        assert!(matches!(err, TranslationError::GenerationError { .. }));
    }
}
