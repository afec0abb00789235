//! # Prompt Registry
//!
//! This module defines the storage interface for prompts.
//!
//! The main components are:
//! - [`PromptStorage`] trait - Defines the interface for storing and retrieving prompts
//! - [`Listing`] struct - The result of enumerating a store, including records that could not be read

use crate::prompt::Prompt;
use std::path::PathBuf;

pub trait PromptStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates or fully replaces the record with the prompt's id.
    fn save(&self, prompt: &Prompt) -> Result<(), Self::Error>;

    /// Deletes a record. Removing an absent record succeeds.
    fn remove(&self, id: &str) -> Result<(), Self::Error>;

    fn get(&self, id: &str) -> Result<Option<Prompt>, Self::Error>;

    fn list_all(&self) -> Result<Listing, Self::Error>;
}

/// Every readable prompt in a store, plus the records that were skipped.
#[derive(Debug, Default)]
pub struct Listing {
    pub prompts: Vec<Prompt>,
    pub skipped: Vec<SkippedRecord>,
}

/// A record file that was left out of a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}
