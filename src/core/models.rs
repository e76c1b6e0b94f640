//! Core data models for language pairs and translation requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::TranslationError;

/// Ordered (source, target) language code pair, e.g. `("en", "hi")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageCodePair {
    /// Language of the input text
    pub source: String,
    /// Language of the translation
    pub target: String,
}

impl LanguageCodePair {
    /// Create a code pair
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Deterministic model name, `<prefix>-<source>-<target>`
    pub fn model_name(&self, prefix: &str) -> String {
        format!("{}-{}-{}", prefix, self.source, self.target)
    }
}

impl fmt::Display for LanguageCodePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

impl FromStr for LanguageCodePair {
    type Err = TranslationError;

    /// Parse the `src-tgt` form used on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('-') {
            Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                Ok(Self::new(source, target))
            }
            _ => Err(TranslationError::NotFound {
                label: s.to_string(),
            }),
        }
    }
}

/// `tokenizers` JSON files used instead of the model repo's SentencePiece files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerFiles {
    /// Repo (or local directory name) holding the tokenizer files
    #[serde(default)]
    pub repo: Option<String>,
    /// Tokenizer used to encode source text
    pub source: String,
    /// Tokenizer used to decode generated ids
    pub target: String,
}

/// One selectable registry entry: display label plus its code pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSpec {
    /// Display label, e.g. `English → Hindi`
    pub label: String,
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
    /// Optional tokenizer override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<TokenizerFiles>,
}

impl PairSpec {
    /// Create a pair using the model repo's own tokenizer files
    pub fn new(label: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            target: target.into(),
            tokenizer: None,
        }
    }

    /// Use `tokenizers` JSON files instead of SentencePiece
    pub fn with_tokenizer(mut self, tokenizer: TokenizerFiles) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// The (source, target) code pair
    pub fn codes(&self) -> LanguageCodePair {
        LanguageCodePair::new(&self.source, &self.target)
    }
}

/// Everything a loader needs to resolve one model by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    /// Short model name, e.g. `opus-mt-en-hi`
    pub name: String,
    /// Hub repository id, e.g. `Helsinki-NLP/opus-mt-en-hi`
    pub repo_id: String,
    /// Where the tokenizers come from
    pub tokenizer: TokenizerSource,
}

/// Tokenizer files for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerSource {
    /// `vocab.json` plus `source.spm` / `target.spm` from the model repo
    SentencePiece,
    /// `tokenizers` JSON files, possibly from another repo
    Json {
        /// Repo (or local directory name) holding the files
        repo: String,
        /// Encodes source text
        source: String,
        /// Decodes generated ids
        target: String,
    },
}

/// Translation request as submitted by the web form or the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Raw input text
    pub text: String,
    /// Chosen pair label
    pub pair: String,
}

impl TranslationRequest {
    /// Create a request
    pub fn new(text: impl Into<String>, pair: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pair: pair.into(),
        }
    }

    /// Whitespace-only input never reaches the translation service
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Translation result returned by the JSON API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Translated text
    pub translation: String,
    /// Pair label used
    pub pair: String,
    /// Model name used
    pub model: String,
}
