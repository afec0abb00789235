//! # Host Messages
//!
//! The messages exchanged with the host that embeds the prompt manager, and a
//! [`PromptService`] that turns each request into store operations and replies.
//!
//! Messages are tagged by a `command` field and use camelCase field names:
//!
//! ```json
//! {"command": "save", "promptId": "p-1", "title": "Greeting", "text": "Hi {{name}}"}
//! {"command": "updateTokenCount", "promptId": "p-1", "tokenCount": 3}
//! ```

use crate::parser::extract_variables;
use crate::prompt::Prompt;
use crate::registry::PromptStorage;
use crate::tokenizer::{Gpt3Tokenizer, Tokenizer};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostRequest {
    Save {
        prompt_id: String,
        #[serde(default)]
        title: String,
        text: String,
        /// Names computed by the host; the service derives its own from `text`.
        #[serde(default)]
        variable_names: Vec<String>,
    },
    RemovePrompt {
        prompt_id: String,
        wrapper_id: String,
    },
    ListRequest,
    ExtractVariables {
        prompt_id: String,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostReply {
    UpdateTokenCount { prompt_id: String, token_count: u32 },
    RemovePromptConfirmed { wrapper_id: String },
    PreloadPrompt { prompt_data: Prompt },
    UpdateVariables {
        prompt_id: String,
        variable_names: Vec<String>,
    },
    LoadWarning { path: String, reason: String },
    Error { message: String },
}

/// Decides whether a prompt may be removed, typically by asking the user.
pub trait ConfirmRemoval {
    fn confirm_removal(&self, prompt_id: &str) -> bool;
}

/// Approves every removal. For hosts that have already asked the user.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl ConfirmRemoval for AlwaysConfirm {
    fn confirm_removal(&self, _prompt_id: &str) -> bool {
        true
    }
}

impl<F> ConfirmRemoval for F
where
    F: Fn(&str) -> bool,
{
    fn confirm_removal(&self, prompt_id: &str) -> bool {
        self(prompt_id)
    }
}

/// Turns host requests into store operations. Counts tokens with [`Gpt3Tokenizer`] unless
/// another [`Tokenizer`] is given.
pub struct PromptService<S, T = Gpt3Tokenizer> {
    storage: S,
    tokenizer: T,
}

impl<S: PromptStorage> PromptService<S> {
    /// Creates a service that counts GPT-3 BPE tokens.
    pub fn with_storage(storage: S) -> Self {
        PromptService::new(storage, Gpt3Tokenizer)
    }
}

impl<S: PromptStorage, T: Tokenizer> PromptService<S, T> {
    pub fn new(storage: S, tokenizer: T) -> Self {
        PromptService { storage, tokenizer }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Builds a prompt from raw text and saves it, replacing any previous version.
    pub fn save(&self, id: String, title: String, text: String) -> Result<Prompt, S::Error> {
        let prompt = Prompt::new(id, title, text, &self.tokenizer);
        self.storage.save(&prompt)?;
        Ok(prompt)
    }

    /// Removes a prompt if `confirm` approves. Returns whether the removal went ahead.
    pub fn remove(&self, id: &str, confirm: &dyn ConfirmRemoval) -> Result<bool, S::Error> {
        if !confirm.confirm_removal(id) {
            debug!(id, "removal declined");
            return Ok(false);
        }
        self.storage.remove(id)?;
        Ok(true)
    }

    /// Handles one request from the host and returns the replies to send back, in order.
    pub fn handle(
        &self,
        request: HostRequest,
        confirm: &dyn ConfirmRemoval,
    ) -> Result<Vec<HostReply>, S::Error> {
        match request {
            HostRequest::Save {
                prompt_id,
                title,
                text,
                variable_names,
            } => {
                let prompt = self.save(prompt_id, title, text)?;
                if !variable_names.is_empty() && variable_names != prompt.variables() {
                    debug!(
                        id = prompt.id(),
                        host = ?variable_names,
                        derived = ?prompt.variables(),
                        "host variables differ from content"
                    );
                }
                Ok(vec![HostReply::UpdateTokenCount {
                    prompt_id: prompt.id().to_string(),
                    token_count: prompt.token_count(),
                }])
            }
            HostRequest::RemovePrompt {
                prompt_id,
                wrapper_id,
            } => {
                if self.remove(&prompt_id, confirm)? {
                    Ok(vec![HostReply::RemovePromptConfirmed { wrapper_id }])
                } else {
                    Ok(Vec::new())
                }
            }
            HostRequest::ListRequest => {
                let listing = self.storage.list_all()?;
                let warnings = listing.skipped.into_iter().map(|skipped| HostReply::LoadWarning {
                    path: skipped.path.display().to_string(),
                    reason: skipped.reason,
                });
                Ok(listing
                    .prompts
                    .into_iter()
                    .map(|prompt_data| HostReply::PreloadPrompt { prompt_data })
                    .chain(warnings)
                    .collect())
            }
            HostRequest::ExtractVariables { prompt_id, text } => {
                Ok(vec![HostReply::UpdateVariables {
                    prompt_id,
                    variable_names: extract_variables(&text),
                }])
            }
        }
    }
}
