//! Narrow interface to the model runtime
//!
//! The registry and the translation service only ever talk to these traits.
//! The candle-backed implementation lives in [`crate::core::marian`]; a
//! deterministic in-process one lives in [`crate::core::mock`].

use std::fmt::Debug;

use crate::core::errors::Result;
use crate::core::models::ModelSource;

/// Converts text to and from the ids a model consumes
pub trait TextTokenizer: Send + Sync + Debug {
    /// Encode source text, including the end-of-sequence marker
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode generated ids, dropping every special/control token
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// Encoder-decoder model with a bounded generation procedure
pub trait Seq2SeqModel: Send + Sync + Debug {
    /// Generate output ids for encoded input; the result holds at most `max_length` ids
    fn generate(&self, input_ids: &[u32], max_length: usize) -> Result<Vec<u32>>;
}

/// A freshly loaded (tokenizer, model) pair
#[derive(Debug)]
pub struct LoadedModel {
    /// Tokenizer for the model's vocabulary
    pub tokenizer: Box<dyn TextTokenizer>,
    /// Ready-to-run model
    pub model: Box<dyn Seq2SeqModel>,
}

/// Load-by-name access to an external model source
pub trait ModelLoader: Send + Sync {
    /// Fetch and build the tokenizer and model for one source
    fn load(&self, source: &ModelSource) -> Result<LoadedModel>;
}
