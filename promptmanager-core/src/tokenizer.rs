//! Token counting for prompt content.
//!
//! The default [`Gpt3Tokenizer`] counts GPT-3 BPE tokens (`r50k_base`). The
//! [`EstimatingTokenizer`] is a cheap approximation for callers that don't need exact counts.

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Counts the tokens a model would see for a piece of text.
pub trait Tokenizer {
    fn count_tokens(&self, text: &str) -> u32;
}

/// The `r50k_base` encoding, loaded on first use.
static R50K_BASE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| tiktoken_rs::r50k_base().map_err(|err| err.to_string()));

/// Counts GPT-3 BPE tokens.
///
/// Falls back to the [`EstimatingTokenizer`] if the encoding cannot be loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gpt3Tokenizer;

impl Tokenizer for Gpt3Tokenizer {
    fn count_tokens(&self, text: &str) -> u32 {
        match R50K_BASE.as_ref() {
            Ok(bpe) => u32::try_from(bpe.encode_ordinary(text).len()).unwrap_or(u32::MAX),
            Err(err) => {
                warn!(error = %err, "r50k_base encoding unavailable, estimating token count");
                EstimatingTokenizer.count_tokens(text)
            }
        }
    }
}

/// Approximates BPE token counts as one token per four characters, rounded up.
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatingTokenizer;

const CHARS_PER_TOKEN: usize = 4;

impl Tokenizer for EstimatingTokenizer {
    fn count_tokens(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        u32::try_from(chars.div_ceil(CHARS_PER_TOKEN)).unwrap_or(u32::MAX)
    }
}

/// Counts GPT-3 BPE tokens in `text` with the [`Gpt3Tokenizer`].
pub fn tokenize(text: &str) -> u32 {
    Gpt3Tokenizer.count_tokens(text)
}
