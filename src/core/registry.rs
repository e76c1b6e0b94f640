//! Model registry: every configured language pair, preloaded once per process

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::backend::{ModelLoader, Seq2SeqModel, TextTokenizer};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::LanguageCodePair;

/// Loaded tokenizer + model for one language pair
#[derive(Debug, Clone)]
pub struct ModelHandle {
    /// Display label, e.g. `English → Hindi`
    pub label: String,
    /// Source and target language codes
    pub codes: LanguageCodePair,
    /// Model name, e.g. `opus-mt-en-hi`
    pub model_name: String,
    /// Tokenizer loaded with the model
    pub tokenizer: Arc<dyn TextTokenizer>,
    /// The model itself
    pub model: Arc<dyn Seq2SeqModel>,
}

/// Read-only label → handle table, built by [`ModelRegistry::initialize`]
#[derive(Debug)]
pub struct ModelRegistry {
    order: Vec<String>,
    entries: HashMap<String, ModelHandle>,
}

impl ModelRegistry {
    /// Eagerly load every configured pair; the first failure aborts
    pub fn initialize(config: &TranslatorConfig, loader: &dyn ModelLoader) -> Result<Self> {
        Self::initialize_with(config, loader, |_| {})
    }

    /// Same as [`initialize`](Self::initialize), reporting each loaded handle
    pub fn initialize_with<F>(
        config: &TranslatorConfig,
        loader: &dyn ModelLoader,
        mut on_loaded: F,
    ) -> Result<Self>
    where
        F: FnMut(&ModelHandle),
    {
        config.validate()?;

        let started = Instant::now();
        let mut order = Vec::with_capacity(config.pairs.len());
        let mut entries = HashMap::with_capacity(config.pairs.len());

        for pair in &config.pairs {
            let source = config.model_source(pair);
            let loaded_at = Instant::now();

            let loaded = loader.load(&source)?;
            let handle = ModelHandle {
                label: pair.label.clone(),
                codes: pair.codes(),
                model_name: source.name.clone(),
                tokenizer: Arc::from(loaded.tokenizer),
                model: Arc::from(loaded.model),
            };

            info!(
                "Loaded {} for '{}' in {:?}",
                source.name,
                pair.label,
                loaded_at.elapsed()
            );
            on_loaded(&handle);

            order.push(pair.label.clone());
            entries.insert(pair.label.clone(), handle);
        }

        info!("Preloaded {} models in {:?}", entries.len(), started.elapsed());
        Ok(Self { order, entries })
    }

    /// Handle for a display label
    pub fn lookup(&self, label: &str) -> Result<&ModelHandle> {
        self.entries.get(label).ok_or_else(|| {
            warn!("Lookup of unknown language pair '{}'", label);
            TranslationError::NotFound {
                label: label.to_string(),
            }
        })
    }

    /// Handle for a (source, target) code pair
    pub fn lookup_codes(&self, codes: &LanguageCodePair) -> Result<&ModelHandle> {
        self.handles().find(|h| &h.codes == codes).ok_or_else(|| {
            warn!("Lookup of unknown language codes {}", codes);
            TranslationError::NotFound {
                label: codes.to_string(),
            }
        })
    }

    /// Labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Handles in declaration order
    pub fn handles(&self) -> impl Iterator<Item = &ModelHandle> {
        self.order.iter().filter_map(|label| self.entries.get(label))
    }

    /// Number of loaded models
    pub fn model_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_pairs;
    use crate::core::mock::MockLoader;

    #[test]
    fn test_all_default_labels_resolve() {
        let loader = MockLoader::new();
        let registry = ModelRegistry::initialize(&TranslatorConfig::default(), &loader).unwrap();

        assert_eq!(registry.model_count(), 6);
        assert_eq!(loader.load_count(), 6);
        for pair in default_pairs() {
            let handle = registry.lookup(&pair.label).unwrap();
            assert_eq!(handle.codes, pair.codes());
            assert_eq!(handle.model_name, format!("opus-mt-{}-{}", pair.source, pair.target));
        }
    }

    #[test]
    fn test_unknown_label_is_not_found() {
        let registry =
            ModelRegistry::initialize(&TranslatorConfig::default(), &MockLoader::new()).unwrap();

        let err = registry.lookup("unknown-label").unwrap_err();
        assert!(matches!(err, TranslationError::NotFound { ref label } if label == "unknown-label"));
    }

    #[test]
    fn test_labels_keep_declaration_order() {
        let registry =
            ModelRegistry::initialize(&TranslatorConfig::default(), &MockLoader::new()).unwrap();

        let labels: Vec<&str> = registry.labels().collect();
        let expected: Vec<String> = default_pairs().into_iter().map(|p| p.label).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_lookup_by_codes() {
        let registry =
            ModelRegistry::initialize(&TranslatorConfig::default(), &MockLoader::new()).unwrap();

        let handle = registry.lookup_codes(&LanguageCodePair::new("es", "en")).unwrap();
        assert_eq!(handle.label, "Spanish → English");
        assert!(registry.lookup_codes(&LanguageCodePair::new("de", "en")).is_err());
    }

    #[test]
    fn test_load_failure_is_fatal() {
        let loader = MockLoader::new().fail_on("opus-mt-es-en");
        let err = ModelRegistry::initialize(&TranslatorConfig::default(), &loader).unwrap_err();

        assert!(matches!(
            err,
            TranslationError::StartupLoadError { ref model, .. } if model == "opus-mt-es-en"
        ));
        // Loading stops at the first failure
        assert_eq!(loader.load_count(), 3);
    }

    #[test]
    fn test_progress_callback_sees_every_model() {
        let mut seen = Vec::new();
        ModelRegistry::initialize_with(&TranslatorConfig::default(), &MockLoader::new(), |h| {
            seen.push(h.model_name.clone())
        })
        .unwrap();

        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], "opus-mt-en-hi");
    }

    #[test]
    fn test_invalid_config_is_rejected_before_loading() {
        let loader = MockLoader::new();
        let config = TranslatorConfig {
            pairs: vec![],
            ..Default::default()
        };
        assert!(ModelRegistry::initialize(&config, &loader).is_err());
        assert_eq!(loader.load_count(), 0);
    }
}
