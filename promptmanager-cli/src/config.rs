use confy::ConfyError;
use promptmanager_core::file_storage::FileStorage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

pub const PROMPTMANAGER_CLI: &str = "promptmanager";

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptManagerConfig {
    /// Directory holding one `{id}.pb` file per prompt. Its parent must exist.
    pub base_path: String,
}

impl Default for PromptManagerConfig {
    fn default() -> Self {
        let base_path = dirs::home_dir()
            .map(|p| p.join(".promptmanager"))
            .unwrap_or_else(|| PathBuf::from(".promptmanager"));

        Self {
            base_path: base_path.display().to_string(),
        }
    }
}

/// The storage named on the command line, or the configured one.
pub fn get_storage(storage_path: Option<String>) -> FileStorage {
    if let Some(path) = storage_path {
        return FileStorage::new(path);
    }

    let config: Result<PromptManagerConfig, ConfyError> = confy::load(PROMPTMANAGER_CLI, None);
    match config {
        Ok(config) => FileStorage::new(config.base_path),
        Err(err) => {
            error!(error = %err, "problem loading config, exiting");
            std::process::exit(exitcode::CONFIG);
        }
    }
}
