use crate::parser::extract_variables;
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};

/// A stored prompt.
///
/// `variables` and `token_count` are derived from `content` when the prompt is built with
/// [`Prompt::new`]; they are a snapshot of the content at save time and are not recomputed
/// when a prompt is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    id: String,
    title: String,
    content: String,
    variables: Vec<String>,
    token_count: u32,
}

impl Prompt {
    pub fn new(id: String, title: String, content: String, tokenizer: &dyn Tokenizer) -> Prompt {
        let variables = extract_variables(&content);
        let token_count = tokenizer.count_tokens(&content);
        Prompt {
            id,
            title,
            content,
            variables,
            token_count,
        }
    }

    /// Builds a prompt from already-derived fields, as read back from storage.
    pub fn from_parts(
        id: String,
        title: String,
        content: String,
        variables: Vec<String>,
        token_count: u32,
    ) -> Prompt {
        Prompt {
            id,
            title,
            content,
            variables,
            token_count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn token_count(&self) -> u32 {
        self.token_count
    }

    pub(crate) fn into_parts(self) -> (String, String, String, Vec<String>, u32) {
        (
            self.id,
            self.title,
            self.content,
            self.variables,
            self.token_count,
        )
    }
}

/// Whether `id` can name a record file directly under the storage root.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
