//! Deterministic in-process models for tests and `--mock` mode.
//!
//! `MockLoader` never touches the network. Its "translation" is a reversible
//! character transform so every stage (encode, generate, decode) is exercised:
//! - targets written in Devanagari (`hi`) map ASCII letters into that script
//! - every other target reverses the characters of each word

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::backend::{LoadedModel, ModelLoader, Seq2SeqModel, TextTokenizer};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::ModelSource;

/// End-of-sequence id
pub const EOS_ID: u32 = 0;
/// Decoder start (and pad) id
pub const START_ID: u32 = 1;
const CHAR_OFFSET: u32 = 2;
const DEVANAGARI_BASE: u32 = 0x0905;

/// Loader producing [`MockTokenizer`] / [`MockModel`] pairs
#[derive(Debug, Default)]
pub struct MockLoader {
    fail_load: HashSet<String>,
    fail_generate: HashSet<String>,
    loads: Arc<AtomicUsize>,
}

impl MockLoader {
    /// Loader where every model loads and generates
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loading the named model fail
    pub fn fail_on(mut self, model: impl Into<String>) -> Self {
        self.fail_load.insert(model.into());
        self
    }

    /// Load the named model fine, but fail every generation call
    pub fn fail_generation_on(mut self, model: impl Into<String>) -> Self {
        self.fail_generate.insert(model.into());
        self
    }

    /// Number of successful loads so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for MockLoader {
    fn load(&self, source: &ModelSource) -> Result<LoadedModel> {
        if self.fail_load.contains(&source.name) {
            return Err(TranslationError::load(
                &source.name,
                format!("{} not found upstream", source.repo_id),
            ));
        }

        let target = source
            .name
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .to_string();
        self.loads.fetch_add(1, Ordering::SeqCst);

        Ok(LoadedModel {
            tokenizer: Box::new(MockTokenizer),
            model: Box::new(MockModel {
                target,
                failing: self.fail_generate.contains(&source.name),
            }),
        })
    }
}

/// One id per character, shifted past the control ids
#[derive(Debug)]
pub struct MockTokenizer;

impl TextTokenizer for MockTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = text.chars().map(|c| c as u32 + CHAR_OFFSET).collect();
        ids.push(EOS_ID);
        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        Ok(ids
            .iter()
            .filter(|&&id| id >= CHAR_OFFSET)
            .filter_map(|&id| char::from_u32(id - CHAR_OFFSET))
            .collect())
    }
}

/// Character-level stand-in for a translation model
#[derive(Debug)]
pub struct MockModel {
    target: String,
    failing: bool,
}

impl MockModel {
    fn transform(&self, text: &str) -> String {
        match self.target.as_str() {
            "hi" => text.chars().map(to_devanagari).collect(),
            _ => text
                .split(' ')
                .map(|word| word.chars().rev().collect::<String>())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn to_devanagari(c: char) -> char {
    if c.is_ascii_alphabetic() {
        let index = c.to_ascii_lowercase() as u32 - 'a' as u32;
        char::from_u32(DEVANAGARI_BASE + index).unwrap_or(c)
    } else {
        c
    }
}

impl Seq2SeqModel for MockModel {
    fn generate(&self, input_ids: &[u32], max_length: usize) -> Result<Vec<u32>> {
        if self.failing {
            return Err(TranslationError::generation("mock model failure"));
        }

        let text = MockTokenizer.decode(input_ids)?;
        let mut output = vec![START_ID];
        output.extend(MockTokenizer.encode(&self.transform(&text))?);
        output.truncate(max_length);
        Ok(output)
    }
}
