mod commands;
mod config;
mod serve;

use crate::config::get_storage;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use promptmanager_core::extract_variables;
use promptmanager_core::host::PromptService;
use promptmanager_core::registry::PromptStorage;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "promptmanager",
    bin_name = "promptmanager",
    about = "Keep reusable prompts with {{variable}} placeholders",
    long_about = "Keep reusable prompts with {{variable}} placeholders. Each prompt is stored as \
                  one binary record file in the storage directory."
)]
struct Args {
    /// Storage directory, overriding the configured one.
    #[arg(short = 'p', long)]
    storage_path: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Save a prompt. A random id is assigned unless one is given.
    Add {
        #[arg(short = 't', long)]
        title: String,
        #[arg(short = 'c', long)]
        content: String,
        #[arg(short = 'i', long)]
        id: Option<String>,
        #[arg(short = 'o', long)]
        overwrite: bool,
    },
    /// Print the content of a prompt.
    Get {
        #[arg(short = 'i', long)]
        id: String,
        #[arg(short = 'c', long)]
        copy: bool,
    },
    List,
    Delete {
        #[arg(short = 'i', long)]
        id: String,
        /// Skip the confirmation question.
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Print the placeholder names found in some content.
    Vars {
        #[arg(short = 'c', long)]
        content: String,
    },
    /// Answer JSON requests from stdin, one per line.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let service = PromptService::with_storage(get_storage(args.storage_path));

    match args.cmd {
        Commands::Add {
            title,
            content,
            id,
            overwrite,
        } => {
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            if !overwrite && service.storage().get(&id)?.is_some() {
                bail!("Prompt '{id}' already exists, use --overwrite to replace it");
            }

            let prompt = service.save(id, title, content)?;
            println!("{} ({} tokens)", prompt.id(), prompt.token_count());
            if !prompt.variables().is_empty() {
                println!("variables: {}", prompt.variables().join(", "));
            }
        }
        Commands::Get { id, copy } => {
            let Some(prompt) = service.storage().get(&id)? else {
                bail!("Prompt not found: {id}");
            };

            println!("{}", prompt.content());
            if copy {
                let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
                clipboard
                    .set_text(prompt.content())
                    .context("failed to copy prompt to the clipboard")?;
            }
        }
        Commands::List => {
            commands::list(&service, std::io::stdout().lock(), std::io::stderr().lock())?;
        }
        Commands::Delete { id, yes } => {
            let confirm = |id: &str| {
                if yes {
                    return Ok(true);
                }
                Confirm::new()
                    .with_prompt(format!("Are you sure you want to delete prompt '{id}'?"))
                    .default(false)
                    .interact()
                    .context("failed to ask for confirmation")
            };
            commands::delete(&service, &id, confirm, std::io::stdout().lock())?;
        }
        Commands::Vars { content } => {
            for variable in extract_variables(&content) {
                println!("{variable}");
            }
        }
        Commands::Serve => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            serve::run(&service, stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}
