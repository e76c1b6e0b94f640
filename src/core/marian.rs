//! Marian (opus-mt) models on candle, fetched from the model hub or a local directory

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use rust_tokenizers::tokenizer::{MarianTokenizer as SpmTokenizer, Tokenizer, TruncationStrategy};
use tracing::{debug, info};

use crate::core::backend::{LoadedModel, ModelLoader, Seq2SeqModel, TextTokenizer};
use crate::core::config::HubConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ModelSource, TokenizerSource};

const CONFIG_FILE: &str = "config.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";
const SOURCE_SPM_FILE: &str = "source.spm";
const TARGET_SPM_FILE: &str = "target.spm";
const VOCAB_FILE: &str = "vocab.json";

/// Where model files are resolved from
enum FileSource {
    Hub(hf_hub::api::sync::Api),
    Local(PathBuf),
}

impl FileSource {
    fn fetch(&self, repo: &str, file: &str) -> std::result::Result<PathBuf, String> {
        match self {
            FileSource::Hub(api) => api
                .model(repo.to_string())
                .get(file)
                .map_err(|e| e.to_string()),
            FileSource::Local(root) => {
                let dir = repo.rsplit('/').next().unwrap_or(repo);
                let path = root.join(dir).join(file);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(format!("{} not found", path.display()))
                }
            }
        }
    }
}

/// Loads Marian models through `hf-hub` (or from `models_dir` when offline)
pub struct HubModelLoader {
    files: FileSource,
    device: Device,
}

impl HubModelLoader {
    /// Resolve against `hub.models_dir` when set, otherwise the model hub
    pub fn new(hub: &HubConfig) -> Result<Self> {
        let files = match &hub.models_dir {
            Some(dir) => {
                info!("Loading models from local directory {}", dir.display());
                FileSource::Local(dir.clone())
            }
            None => {
                let api = hf_hub::api::sync::Api::new().map_err(|e| TranslationError::ConfigError {
                    message: format!("model hub client unavailable: {}", e),
                })?;
                FileSource::Hub(api)
            }
        };

        Ok(Self {
            files,
            device: Device::Cpu,
        })
    }

    fn fetch(&self, source: &ModelSource, repo: &str, file: &str) -> Result<PathBuf> {
        debug!("Fetching {}/{}", repo, file);
        self.files
            .fetch(repo, file)
            .map_err(|e| TranslationError::load(&source.name, format!("{}: {}", file, e)))
    }

    fn load_weights(&self, source: &ModelSource) -> Result<VarBuilder<'static>> {
        if let Ok(path) = self.files.fetch(&source.repo_id, SAFETENSORS_FILE) {
            let data = std::fs::read(&path)
                .map_err(|e| TranslationError::load(&source.name, e))?;
            return VarBuilder::from_buffered_safetensors(data, DType::F32, &self.device)
                .map_err(|e| TranslationError::load(&source.name, e));
        }

        let path = self.fetch(source, &source.repo_id, PYTORCH_FILE)?;
        VarBuilder::from_pth(&path, DType::F32, &self.device)
            .map_err(|e| TranslationError::load(&source.name, e))
    }
}

impl ModelLoader for HubModelLoader {
    fn load(&self, source: &ModelSource) -> Result<LoadedModel> {
        let config_path = self.fetch(source, &source.repo_id, CONFIG_FILE)?;
        let config = read_marian_config(&config_path)
            .map_err(|e| TranslationError::load(&source.name, e))?;

        let tokenizer = match &source.tokenizer {
            TokenizerSource::SentencePiece => {
                let encoder = self.fetch(source, &source.repo_id, SOURCE_SPM_FILE)?;
                let decoder = self.fetch(source, &source.repo_id, TARGET_SPM_FILE)?;
                let vocab = self.fetch(source, &source.repo_id, VOCAB_FILE)?;
                MarianTokenizer::sentencepiece(&vocab, &encoder, &decoder, &config)
            }
            TokenizerSource::Json {
                repo,
                source: encoder,
                target: decoder,
            } => {
                let encoder = self.fetch(source, repo, encoder)?;
                let decoder = self.fetch(source, repo, decoder)?;
                MarianTokenizer::json(&encoder, &decoder, &config)
            }
        }
        .map_err(|e| TranslationError::load(&source.name, e))?;

        let vb = self.load_weights(source)?;
        let model = MarianModel::new(&source.name, config, vb, &self.device)
            .map_err(|e| TranslationError::load(&source.name, e))?;

        Ok(LoadedModel {
            tokenizer: Box::new(tokenizer),
            model: Box::new(model),
        })
    }
}

/// Read a hub `config.json`
fn read_marian_config(path: &Path) -> std::result::Result<MarianConfig, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    parse_marian_config(value)
}

/// Fill the keys that older opus-mt configs omit, then deserialize
fn parse_marian_config(mut value: serde_json::Value) -> std::result::Result<MarianConfig, String> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| "config.json is not an object".to_string())?;
    let vocab_size = obj.get("vocab_size").cloned().unwrap_or(serde_json::Value::Null);
    obj.entry("decoder_vocab_size").or_insert(vocab_size);
    obj.entry("share_encoder_decoder_embeddings")
        .or_insert(serde_json::Value::Bool(true));
    obj.entry("use_cache").or_insert(serde_json::Value::Bool(true));
    obj.entry("is_encoder_decoder").or_insert(serde_json::Value::Bool(true));
    if let Some(eos) = obj.get("eos_token_id").cloned() {
        obj.entry("forced_eos_token_id").or_insert(eos);
    }

    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Tokenizer implementations a Marian model can be paired with
enum Backend {
    /// SentencePiece models plus the shared `vocab.json`, as published with opus-mt
    SentencePiece {
        encoder: SpmTokenizer,
        decoder: SpmTokenizer,
        max_len: usize,
    },
    /// Pre-built `tokenizers` JSON files
    Json {
        encoder: tokenizers::Tokenizer,
        decoder: tokenizers::Tokenizer,
    },
}

/// Source-side and target-side tokenizers of one Marian model
pub struct MarianTokenizer {
    backend: Backend,
    eos_token_id: u32,
    pad_token_id: u32,
}

impl MarianTokenizer {
    fn sentencepiece(
        vocab: &Path,
        encoder: &Path,
        decoder: &Path,
        config: &MarianConfig,
    ) -> std::result::Result<Self, String> {
        let encoder = SpmTokenizer::from_files(vocab, encoder, false).map_err(|e| e.to_string())?;
        let decoder = SpmTokenizer::from_files(vocab, decoder, false).map_err(|e| e.to_string())?;
        Ok(Self {
            backend: Backend::SentencePiece {
                encoder,
                decoder,
                max_len: config.max_position_embeddings,
            },
            eos_token_id: config.eos_token_id,
            pad_token_id: config.pad_token_id,
        })
    }

    fn json(encoder: &Path, decoder: &Path, config: &MarianConfig) -> std::result::Result<Self, String> {
        let encoder = tokenizers::Tokenizer::from_file(encoder).map_err(|e| e.to_string())?;
        let decoder = tokenizers::Tokenizer::from_file(decoder).map_err(|e| e.to_string())?;
        Ok(Self {
            backend: Backend::Json { encoder, decoder },
            eos_token_id: config.eos_token_id,
            pad_token_id: config.pad_token_id,
        })
    }
}

impl fmt::Debug for MarianTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            Backend::SentencePiece { .. } => "sentencepiece",
            Backend::Json { .. } => "json",
        };
        f.debug_struct("MarianTokenizer")
            .field("backend", &backend)
            .field("eos_token_id", &self.eos_token_id)
            .field("pad_token_id", &self.pad_token_id)
            .finish()
    }
}

impl TextTokenizer for MarianTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids = match &self.backend {
            Backend::SentencePiece {
                encoder, max_len, ..
            } => encoder
                .encode(text, None, *max_len, &TruncationStrategy::LongestFirst, 0)
                .token_ids
                .into_iter()
                .map(|id| u32::try_from(id).map_err(TranslationError::generation))
                .collect::<Result<Vec<u32>>>()?,
            Backend::Json { encoder, .. } => encoder
                .encode(text, true)
                .map_err(TranslationError::generation)?
                .get_ids()
                .to_vec(),
        };
        if ids.last() != Some(&self.eos_token_id) {
            ids.push(self.eos_token_id);
        }
        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let ids = ids
            .iter()
            .copied()
            .filter(|&id| id != self.eos_token_id && id != self.pad_token_id);

        let text = match &self.backend {
            Backend::SentencePiece { decoder, .. } => {
                let ids: Vec<i64> = ids.map(i64::from).collect();
                decoder.decode(&ids, true, true)
            }
            Backend::Json { decoder, .. } => {
                let ids: Vec<u32> = ids.collect();
                decoder
                    .decode(&ids, true)
                    .map_err(TranslationError::generation)?
            }
        };
        Ok(text.trim().to_string())
    }
}

/// Marian encoder-decoder; generation mutates the KV cache, hence the mutex
pub struct MarianModel {
    name: String,
    config: MarianConfig,
    device: Device,
    inner: Mutex<MTModel>,
}

impl MarianModel {
    fn new(
        name: &str,
        config: MarianConfig,
        vb: VarBuilder<'_>,
        device: &Device,
    ) -> candle_core::Result<Self> {
        let model = MTModel::new(&config, vb)?;
        Ok(Self {
            name: name.to_string(),
            config,
            device: device.clone(),
            inner: Mutex::new(model),
        })
    }
}

impl fmt::Debug for MarianModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarianModel").field("name", &self.name).finish()
    }
}

impl Seq2SeqModel for MarianModel {
    fn generate(&self, input_ids: &[u32], max_length: usize) -> Result<Vec<u32>> {
        let mut model = self
            .inner
            .lock()
            .map_err(|_| TranslationError::generation(format!("{} is poisoned", self.name)))?;
        model.reset_kv_cache();

        let output = greedy_decode(&mut model, &self.config, &self.device, input_ids, max_length)
            .map_err(TranslationError::generation);
        model.reset_kv_cache();
        output
    }
}

/// Greedy decoding, one token per step, never emitting the pad token
fn greedy_decode(
    model: &mut MTModel,
    config: &MarianConfig,
    device: &Device,
    input_ids: &[u32],
    max_length: usize,
) -> candle_core::Result<Vec<u32>> {
    let tokens = Tensor::new(input_ids, device)?.unsqueeze(0)?;
    let encoder_xs = model.encoder().forward(&tokens, 0)?;

    let mut token_ids = vec![config.decoder_start_token_id];
    while token_ids.len() < max_length {
        let start_pos = token_ids.len() - 1;
        let input = Tensor::new(&token_ids[start_pos..], device)?.unsqueeze(0)?;
        let logits = model.decode(&input, &encoder_xs, start_pos)?;
        let logits = logits.squeeze(0)?;
        let logits = logits.get(logits.dim(0)? - 1)?;

        let mut scores = logits.to_dtype(DType::F32)?.to_vec1::<f32>()?;
        if let Some(score) = scores.get_mut(config.pad_token_id as usize) {
            *score = f32::NEG_INFINITY;
        }
        let next = argmax(&scores);

        token_ids.push(next);
        if next == config.eos_token_id || next == config.forced_eos_token_id {
            break;
        }
    }

    Ok(token_ids)
}

fn argmax(scores: &[f32]) -> u32 {
    scores
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &s)| {
            if s > best.1 {
                (i, s)
            } else {
                best
            }
        })
        .0 as u32
}
