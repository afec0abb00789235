//! # promptmanager Core
//!
//! This crate provides the core functionality of the prompt manager: short text prompts with
//! `{{variable}}` placeholders, stored one protobuf record per file.
//!
//! # Modules
//!
//! - [`parser`] - Placeholder extraction from prompt content
//! - [`tokenizer`] - Token counting
//! - [`prompt`] - The prompt record
//! - [`codec`] - Binary encoding of prompt records
//! - [`registry`] - Prompt storage trait and listing types
//! - [`file_storage`] - File-based storage implementation for prompts
//! - [`host`] - Messages exchanged with an embedding host and their dispatcher
//!
//! # Examples
//!
//! ```rust
//! use promptmanager_core::file_storage::FileStorage;
//! use promptmanager_core::host::{AlwaysConfirm, HostReply, HostRequest, PromptService};
//! use promptmanager_core::tokenizer::EstimatingTokenizer;
//! use tempfile::TempDir;
//!
//! let temp_dir = TempDir::new().unwrap();
//! let service = PromptService::new(FileStorage::new(temp_dir.path()), EstimatingTokenizer);
//!
//! let request = HostRequest::Save {
//!     prompt_id: "greeting".to_string(),
//!     title: "Greeting".to_string(),
//!     text: "Hello, {{name}}!".to_string(),
//!     variable_names: vec![],
//! };
//! let replies = service.handle(request, &AlwaysConfirm).expect("Failed to save prompt");
//! assert!(matches!(replies[0], HostReply::UpdateTokenCount { token_count: 4, .. }));
//! ```

pub mod codec;
pub mod file_storage;
pub mod host;
pub mod parser;
pub mod prompt;
pub mod registry;
pub mod tokenizer;

pub use parser::extract_variables;
pub use tokenizer::tokenize;
