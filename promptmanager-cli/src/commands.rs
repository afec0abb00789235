//! Terminal output for the commands that read or remove stored prompts.

use anyhow::Context;
use promptmanager_core::host::{AlwaysConfirm, PromptService};
use promptmanager_core::registry::PromptStorage;
use promptmanager_core::tokenizer::Tokenizer;
use std::io::Write;

/// Writes one line per prompt to `out` and one line per unreadable record file to `err`.
pub fn list<S, T>(
    service: &PromptService<S, T>,
    mut out: impl Write,
    mut err: impl Write,
) -> anyhow::Result<()>
where
    S: PromptStorage,
    T: Tokenizer,
{
    let listing = service.storage().list_all()?;
    for prompt in &listing.prompts {
        writeln!(
            out,
            "{}\t{}\t{} tokens\t[{}]",
            prompt.id(),
            prompt.title(),
            prompt.token_count(),
            prompt.variables().join(", ")
        )
        .context("failed to write prompt list")?;
    }
    for skipped in &listing.skipped {
        writeln!(err, "skipped {}: {}", skipped.path.display(), skipped.reason)
            .context("failed to write skipped records")?;
    }
    Ok(())
}

/// Asks `confirm` first and removes the prompt only when it agrees.
///
/// A failure to ask is an error and leaves the prompt in place.
pub fn delete<S, T>(
    service: &PromptService<S, T>,
    id: &str,
    confirm: impl FnOnce(&str) -> anyhow::Result<bool>,
    mut out: impl Write,
) -> anyhow::Result<()>
where
    S: PromptStorage,
    T: Tokenizer,
{
    if !confirm(id)? {
        writeln!(out, "Not deleted").context("failed to write output")?;
        return Ok(());
    }

    service.remove(id, &AlwaysConfirm)?;
    writeln!(out, "Deleted {id}").context("failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use promptmanager_core::file_storage::FileStorage;
    use promptmanager_core::tokenizer::EstimatingTokenizer;
    use std::fs;
    use tempfile::TempDir;

    fn service_with_prompt(temp_dir: &TempDir) -> PromptService<FileStorage, EstimatingTokenizer> {
        let service = PromptService::new(FileStorage::new(temp_dir.path()), EstimatingTokenizer);
        service
            .save("keep".to_string(), "Keep".to_string(), "Hi {{name}}".to_string())
            .unwrap();
        service
    }

    #[test]
    fn test_list_reports_skipped_records() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_prompt(&temp_dir);
        fs::write(temp_dir.path().join("bad.pb"), [0xff, 0xff, 0xff, 0xff]).unwrap();

        let mut out = Vec::new();
        let mut err = Vec::new();
        list(&service, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert_eq!("keep\tKeep\t3 tokens\t[name]\n", out);
        assert_eq!(1, err.lines().count());
        assert!(err.starts_with("skipped "));
        assert!(err.contains("bad.pb"));
    }

    #[test]
    fn test_list_without_skipped_records_writes_nothing_to_err() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_prompt(&temp_dir);

        let mut err = Vec::new();
        list(&service, Vec::new(), &mut err).unwrap();
        assert!(err.is_empty());
    }

    #[test]
    fn test_delete_confirmed() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_prompt(&temp_dir);

        let mut out = Vec::new();
        delete(&service, "keep", |_| Ok(true), &mut out).unwrap();

        assert_eq!("Deleted keep\n", String::from_utf8(out).unwrap());
        assert!(!temp_dir.path().join("keep.pb").exists());
    }

    #[test]
    fn test_delete_declined() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_prompt(&temp_dir);

        let mut out = Vec::new();
        delete(&service, "keep", |_| Ok(false), &mut out).unwrap();

        assert_eq!("Not deleted\n", String::from_utf8(out).unwrap());
        assert!(temp_dir.path().join("keep.pb").exists());
    }

    #[test]
    fn test_delete_confirmation_failure_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_prompt(&temp_dir);

        let mut out = Vec::new();
        let result = delete(&service, "keep", |_| bail!("not a terminal"), &mut out);

        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(temp_dir.path().join("keep.pb").exists());
    }
}
