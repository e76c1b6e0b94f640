//! Opus Translator - offline language translator
//!
//! This library preloads one Marian (opus-mt) model per configured language
//! pair and serves a small web form plus JSON API to translate text with them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    backend::{LoadedModel, ModelLoader, Seq2SeqModel, TextTokenizer},
    config::TranslatorConfig,
    errors::TranslationError,
    marian::HubModelLoader,
    models::{LanguageCodePair, PairSpec, TranslationRequest, TranslationResult},
    registry::{ModelHandle, ModelRegistry},
    service::TranslationService,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
