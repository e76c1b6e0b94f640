//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::backend::ModelLoader;
use crate::core::config::TranslatorConfig;
use crate::core::marian::HubModelLoader;
use crate::core::mock::MockLoader;
use crate::core::models::LanguageCodePair;
use crate::core::registry::{ModelHandle, ModelRegistry};
use crate::core::service::TranslationService;
use crate::server::api::{run_server, AppState};

/// Commands for the translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preload all models and serve the translator page (default)
    Serve {
        /// Bind address (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default from config: 8501)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Translate a single text and print the result
    Translate {
        /// Pair label ("English → Hindi") or codes ("en-hi")
        #[arg(short, long)]
        pair: String,

        /// Text to translate
        text: String,
    },

    /// List configured language pairs and their models
    Pairs,
}

/// Build the model loader, mock or hub-backed
fn build_loader(config: &TranslatorConfig, mock: bool) -> anyhow::Result<Box<dyn ModelLoader>> {
    if mock {
        info!("Using mock models");
        return Ok(Box::new(MockLoader::new()));
    }
    Ok(Box::new(HubModelLoader::new(&config.hub)?))
}

/// Preload every configured model, showing progress
pub fn load_registry(config: &TranslatorConfig, mock: bool) -> anyhow::Result<ModelRegistry> {
    let loader = build_loader(config, mock)?;

    let pb = ProgressBar::new(config.pairs.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("=>-"));
    pb.set_message("Loading models");

    let registry = ModelRegistry::initialize_with(config, loader.as_ref(), |handle| {
        pb.set_message(format!("Loaded {}", handle.model_name));
        pb.inc(1);
    });

    match registry {
        Ok(registry) => {
            pb.finish_with_message("All models loaded");
            Ok(registry)
        }
        Err(e) => {
            pb.abandon_with_message("Model loading failed");
            Err(e.into())
        }
    }
}

/// Resolve a pair given as a label or as `src-tgt` codes
fn resolve_pair<'a>(registry: &'a ModelRegistry, pair: &str) -> anyhow::Result<&'a ModelHandle> {
    if let Ok(handle) = registry.lookup(pair) {
        return Ok(handle);
    }
    let codes: LanguageCodePair = pair.parse()?;
    Ok(registry.lookup_codes(&codes)?)
}

/// Handle server command
pub async fn handle_serve(
    config: TranslatorConfig,
    host: Option<String>,
    port: Option<u16>,
    mock: bool,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let registry = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || load_registry(&config, mock)).await??
    };

    let service = TranslationService::from_config(&config.generation);
    let state = Arc::new(AppState::new(Arc::new(registry), service));

    println!("🚀 Translator running on http://{}:{}", host, port);

    run_server(&host, port, state).await
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    pair: String,
    text: String,
    mock: bool,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Please enter text.");
    }

    let start_time = Instant::now();
    let service = TranslationService::from_config(&config.generation);

    let output = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let registry = load_registry(&config, mock)?;
        let handle = resolve_pair(&registry, &pair)?;
        Ok(service.translate(&text, handle)?)
    })
    .await??;

    info!("Completed in {:?}", start_time.elapsed());

    println!("Translation:");
    println!("{}", output);

    Ok(())
}

/// Handle pairs listing command
pub fn handle_pairs(config: &TranslatorConfig) -> anyhow::Result<()> {
    for pair in &config.pairs {
        let source = config.model_source(pair);
        println!("{:<20} {:<6} {}", pair.label, pair.codes().to_string(), source.repo_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pair_by_label_or_codes() {
        let registry = load_registry(&TranslatorConfig::default(), true).unwrap();

        assert_eq!(resolve_pair(&registry, "English → French").unwrap().model_name, "opus-mt-en-fr");
        assert_eq!(resolve_pair(&registry, "hi-en").unwrap().label, "Hindi → English");
        assert!(resolve_pair(&registry, "de-en").is_err());
        assert!(resolve_pair(&registry, "German").is_err());
    }

    #[tokio::test]
    async fn test_translate_rejects_blank_text() {
        let result = handle_translate(
            TranslatorConfig::default(),
            "English → Hindi".to_string(),
            "   ".to_string(),
            true,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_translate_with_mock_models() {
        let result = handle_translate(
            TranslatorConfig::default(),
            "en-es".to_string(),
            "Hello".to_string(),
            true,
        )
        .await;
        assert!(result.is_ok());
    }
}
