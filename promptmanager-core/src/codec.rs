//! # Record Codec
//!
//! Encodes prompts as protocol-buffer messages. The schema is fixed:
//!
//! | field         | type              | tag |
//! |---------------|-------------------|-----|
//! | `id`          | `string`          | 1   |
//! | `title`       | `string`          | 2   |
//! | `content`     | `string`          | 3   |
//! | `variables`   | `repeated string` | 4   |
//! | `token_count` | `uint32`          | 5   |
//!
//! Missing fields decode to their zero value and unknown fields are skipped, so any reader
//! of the same schema can decode a record file.

use crate::parser::extract_variables;
use crate::prompt::{Prompt, is_valid_id};
use prost::Message;
use thiserror::Error;

#[derive(Clone, PartialEq, Message)]
struct PromptRecord {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(string, tag = "2")]
    title: String,
    #[prost(string, tag = "3")]
    content: String,
    #[prost(string, repeated, tag = "4")]
    variables: Vec<String>,
    #[prost(uint32, tag = "5")]
    token_count: u32,
}

/// A prompt that cannot be encoded. Lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid prompt record: {}", .problems.join("; "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed prompt record: {0}")]
    Malformed(#[from] prost::DecodeError),
    #[error("record id {found:?} does not match file name {expected:?}")]
    IdMismatch { expected: String, found: String },
}

/// Checks the fields of `prompt` that must hold before it is written.
pub fn validate(prompt: &Prompt) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    if !is_valid_id(prompt.id()) {
        problems.push(format!(
            "id {:?} must be non-empty and contain no path separators",
            prompt.id()
        ));
    }

    let expected = extract_variables(prompt.content());
    if prompt.variables() != expected.as_slice() {
        problems.push(format!(
            "variables {:?} do not match the placeholders in content {:?}",
            prompt.variables(),
            expected
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}

pub fn encode(prompt: &Prompt) -> Result<Vec<u8>, ValidationError> {
    validate(prompt)?;

    let (id, title, content, variables, token_count) = prompt.clone().into_parts();
    let record = PromptRecord {
        id,
        title,
        content,
        variables,
        token_count,
    };
    Ok(record.encode_to_vec())
}

pub fn decode(bytes: &[u8]) -> Result<Prompt, DecodeError> {
    let record = PromptRecord::decode(bytes)?;
    Ok(Prompt::from_parts(
        record.id,
        record.title,
        record.content,
        record.variables,
        record.token_count,
    ))
}
