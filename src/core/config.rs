//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ModelSource, PairSpec, TokenizerSource};

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "translator";

/// Prefix for environment overrides, e.g. `TRANSLATOR_SERVER__PORT`
pub const ENV_PREFIX: &str = "TRANSLATOR";

/// Maximum number of generated tokens per translation
pub const DEFAULT_MAX_LENGTH: usize = 200;

/// Default language pairs, in display order
const DEFAULT_PAIRS: &[(&str, &str, &str)] = &[
    ("English → Hindi", "en", "hi"),
    ("Hindi → English", "hi", "en"),
    ("English → Spanish", "en", "es"),
    ("Spanish → English", "es", "en"),
    ("English → French", "en", "fr"),
    ("French → English", "fr", "en"),
];

/// Where models come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Hub namespace, e.g. `Helsinki-NLP`
    pub vendor: String,
    /// Model name prefix, e.g. `opus-mt`
    pub model_prefix: String,
    /// Load from `<models_dir>/<model-name>/` instead of the hub
    pub models_dir: Option<PathBuf>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            vendor: "Helsinki-NLP".to_string(),
            model_prefix: "opus-mt".to_string(),
            models_dir: None,
        }
    }
}

/// Decoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens, decoder start token included
    pub max_length: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// HTTP bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Model source settings
    pub hub: HubConfig,
    /// Decoding settings
    pub generation: GenerationConfig,
    /// HTTP bind settings
    pub server: ServerConfig,
    /// Language pairs, in display order
    pub pairs: Vec<PairSpec>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            generation: GenerationConfig::default(),
            server: ServerConfig::default(),
            pairs: default_pairs(),
        }
    }
}

/// The built-in six language pairs
pub fn default_pairs() -> Vec<PairSpec> {
    DEFAULT_PAIRS
        .iter()
        .map(|(label, source, target)| PairSpec::new(*label, *source, *target))
        .collect()
}

impl TranslatorConfig {
    /// Load configuration: defaults, then the config file, then `TRANSLATOR_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                config::File::from(path).required(true)
            }
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        debug!("Configured {} language pairs", config.pairs.len());
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.hub.vendor.trim().is_empty() {
            return Err(config_error("hub.vendor is required"));
        }

        if self.hub.model_prefix.trim().is_empty() {
            return Err(config_error("hub.model_prefix is required"));
        }

        if self.generation.max_length == 0 {
            return Err(config_error("generation.max_length must be greater than 0"));
        }

        if self.pairs.is_empty() {
            return Err(config_error("at least one language pair is required"));
        }

        let mut labels = HashSet::new();
        let mut codes = HashSet::new();
        for pair in &self.pairs {
            if pair.label.trim().is_empty() {
                return Err(config_error("language pair label cannot be empty"));
            }
            if pair.source.trim().is_empty() || pair.target.trim().is_empty() {
                return Err(config_error(format!(
                    "language codes for '{}' cannot be empty",
                    pair.label
                )));
            }
            if !labels.insert(pair.label.as_str()) {
                return Err(config_error(format!("duplicate pair label '{}'", pair.label)));
            }
            if !codes.insert(pair.codes()) {
                return Err(config_error(format!(
                    "duplicate language codes {} for '{}'",
                    pair.codes(),
                    pair.label
                )));
            }
        }

        Ok(())
    }

    /// Resolve the model name, repo and tokenizer files for a pair
    pub fn model_source(&self, pair: &PairSpec) -> ModelSource {
        let name = pair.codes().model_name(&self.hub.model_prefix);
        let repo_id = format!("{}/{}", self.hub.vendor, name);

        let tokenizer = match &pair.tokenizer {
            Some(files) => TokenizerSource::Json {
                repo: files.repo.clone().unwrap_or_else(|| repo_id.clone()),
                source: files.source.clone(),
                target: files.target.clone(),
            },
            None => TokenizerSource::SentencePiece,
        };

        ModelSource {
            name,
            repo_id,
            tokenizer,
        }
    }
}

fn config_error(message: impl Into<String>) -> TranslationError {
    TranslationError::ConfigError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TokenizerFiles;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pairs.len(), 6);
        assert_eq!(config.pairs[0].label, "English → Hindi");
        assert_eq!(config.pairs[5].label, "French → English");
        assert_eq!(config.generation.max_length, 200);
    }

    #[test]
    fn test_model_source_naming() {
        let config = TranslatorConfig::default();
        let source = config.model_source(&config.pairs[0]);

        assert_eq!(source.name, "opus-mt-en-hi");
        assert_eq!(source.repo_id, "Helsinki-NLP/opus-mt-en-hi");
    }

    #[test]
    fn test_default_pairs_use_repo_sentencepiece() {
        let config = TranslatorConfig::default();
        for pair in &config.pairs {
            assert_eq!(config.model_source(pair).tokenizer, TokenizerSource::SentencePiece);
        }
    }

    #[test]
    fn test_model_source_tokenizer_override() {
        let config = TranslatorConfig::default();
        let pair = PairSpec::new("French → English", "fr", "en").with_tokenizer(TokenizerFiles {
            repo: Some("someone/marian-tokenizers".to_string()),
            source: "fr.json".to_string(),
            target: "en.json".to_string(),
        });
        let source = config.model_source(&pair);

        assert_eq!(source.repo_id, "Helsinki-NLP/opus-mt-fr-en");
        assert_eq!(
            source.tokenizer,
            TokenizerSource::Json {
                repo: "someone/marian-tokenizers".to_string(),
                source: "fr.json".to_string(),
                target: "en.json".to_string(),
            }
        );
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        let mut config = TranslatorConfig::default();
        config.pairs.push(PairSpec::new("English → Hindi", "en", "mr"));
        assert!(config.validate().is_err());

        let mut config = TranslatorConfig::default();
        config.pairs.push(PairSpec::new("English to Hindi", "en", "hi"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = TranslatorConfig {
            pairs: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = TranslatorConfig::default();
        config.generation.max_length = 0;
        assert!(config.validate().is_err());

        let mut config = TranslatorConfig::default();
        config.pairs[0].target = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[generation]
max_length = 64

[[pairs]]
label = "English → German"
source = "en"
target = "de"
"#
        )
        .unwrap();

        let config = TranslatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.max_length, 64);
        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.model_source(&config.pairs[0]).name, "opus-mt-en-de");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(TranslatorConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_offline_models_dir() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[hub]\nmodels_dir = \"/srv/models\"").unwrap();

        let config = TranslatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.hub.models_dir, Some(PathBuf::from("/srv/models")));
        assert_eq!(config.hub.vendor, "Helsinki-NLP");
        assert_eq!(config.pairs, default_pairs());
    }
}
