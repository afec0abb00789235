//! JSON-lines bridge between a host process and the prompt service.
//!
//! Each input line is one [`HostRequest`]; each reply is written as one line of JSON. The host
//! is expected to have asked the user before sending `removePrompt`.

use anyhow::Context;
use promptmanager_core::host::{AlwaysConfirm, HostReply, HostRequest, PromptService};
use promptmanager_core::registry::PromptStorage;
use promptmanager_core::tokenizer::Tokenizer;
use std::io::{BufRead, Write};
use tracing::{debug, error, warn};

pub fn run<S, T, R, W>(service: &PromptService<S, T>, input: R, mut output: W) -> anyhow::Result<()>
where
    S: PromptStorage,
    T: Tokenizer,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let replies = match serde_json::from_str::<HostRequest>(&line) {
            Ok(request) => {
                debug!(?request, "received request");
                service
                    .handle(request, &AlwaysConfirm)
                    .unwrap_or_else(|err| {
                        error!(error = %err, "request failed");
                        vec![HostReply::Error {
                            message: err.to_string(),
                        }]
                    })
            }
            Err(err) => {
                warn!(error = %err, "malformed request");
                vec![HostReply::Error {
                    message: format!("malformed request: {err}"),
                }]
            }
        };

        for reply in replies {
            serde_json::to_writer(&mut output, &reply).context("failed to encode reply")?;
            writeln!(output).context("failed to write reply")?;
        }
        output.flush().context("failed to flush replies")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptmanager_core::file_storage::FileStorage;
    use promptmanager_core::tokenizer::EstimatingTokenizer;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_lines(service: &PromptService<FileStorage, EstimatingTokenizer>, input: &str) -> Vec<HostReply> {
        let mut output = Vec::new();
        run(service, Cursor::new(input), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_save_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let service = PromptService::new(FileStorage::new(temp_dir.path()), EstimatingTokenizer);

        let input = concat!(
            r#"{"command":"save","promptId":"p-1","title":"Hi","text":"Hello {{name}}"}"#,
            "\n\n",
            r#"{"command":"listRequest"}"#,
            "\n",
        );
        let replies = run_lines(&service, input);

        assert_eq!(2, replies.len());
        assert_eq!(
            HostReply::UpdateTokenCount {
                prompt_id: "p-1".to_string(),
                token_count: 4,
            },
            replies[0]
        );
        assert!(matches!(
            &replies[1],
            HostReply::PreloadPrompt { prompt_data } if prompt_data.variables() == ["name"]
        ));
    }

    #[test]
    fn test_remove_is_confirmed() {
        let temp_dir = TempDir::new().unwrap();
        let service = PromptService::new(FileStorage::new(temp_dir.path()), EstimatingTokenizer);

        let replies = run_lines(
            &service,
            r#"{"command":"removePrompt","promptId":"gone","wrapperId":"wrapper-gone"}"#,
        );
        assert_eq!(
            vec![HostReply::RemovePromptConfirmed {
                wrapper_id: "wrapper-gone".to_string(),
            }],
            replies
        );
    }

    #[test]
    fn test_errors_become_replies() {
        let temp_dir = TempDir::new().unwrap();
        let service = PromptService::new(FileStorage::new(temp_dir.path()), EstimatingTokenizer);

        let input = concat!(
            "not json\n",
            r#"{"command":"save","promptId":"","text":"x"}"#,
            "\n",
            r#"{"command":"extractVariables","promptId":"p","text":"{{a}}"}"#,
            "\n",
        );
        let replies = run_lines(&service, input);

        assert_eq!(3, replies.len());
        assert!(matches!(&replies[0], HostReply::Error { message } if message.starts_with("malformed request")));
        assert!(matches!(&replies[1], HostReply::Error { message } if message.contains("invalid prompt record")));
        assert!(matches!(&replies[2], HostReply::UpdateVariables { .. }));
    }
}
