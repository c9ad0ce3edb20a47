//! Lorekeeper application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Install tracing on stderr
//! 3. Open the history database
//! 4. Build the dispatcher, HTTP client, and orchestrator
//! 5. Answer one `--query`, or run the interactive chat loop

mod cli;
mod commands;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use lorekeeper_chat::{
    ability_query, ChatError, ChatOrchestrator, HttpReferenceClient, Presenter, QueryDispatcher,
};
use lorekeeper_core::config::LorekeeperConfig;
use lorekeeper_storage::{Database, HistoryStore, KvStore};

use cli::CliArgs;
use commands::ChatCommand;
use terminal::TerminalPresenter;

type Orchestrator = ChatOrchestrator<HttpReferenceClient>;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        style("Lorekeeper").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

/// Send one line to the orchestrator, reporting rejected input.
async fn ask(orch: &Orchestrator, line: &str) -> Result<(), ChatError> {
    match orch.handle_message(line).await {
        Ok(_) | Err(ChatError::EmptyMessage) => Ok(()),
        Err(ChatError::MessageTooLong(max)) => {
            eprintln!(
                "  {} Message too long (max {} characters)",
                style("!").yellow().bold(),
                max
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Print registered sources and their categories.
fn print_sources(orch: &Orchestrator) -> Result<(), ChatError> {
    println!();
    for source in orch.sources()? {
        println!(
            "  {} {} {}",
            style(source.label()).cyan().bold(),
            style(format!("({})", source.name())).dim(),
            style(source.base_url()).dim()
        );
        let categories: Vec<&str> = source.categories().collect();
        println!("    {}", categories.join(", "));
    }
    println!();
    Ok(())
}

/// Clear the screen and re-render the stored history.
fn rerender_history(orch: &Orchestrator, presenter: &TerminalPresenter) -> Result<(), ChatError> {
    presenter.clear();
    orch.replay_history()?;
    Ok(())
}

/// Run the interactive chat loop until /quit or EOF.
async fn run_chat_loop(
    orch: &Orchestrator,
    presenter: &TerminalPresenter,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), ChatError> {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from stdin");
                break;
            }
        };

        match commands::parse(&line) {
            None => ask(orch, &line).await?,
            Some(ChatCommand::Help) => commands::print_help(),
            Some(ChatCommand::Quit) => break,
            Some(ChatCommand::Clear) => {
                println!(
                    "  {} Are you sure you want to clear the chat history? [y/N]",
                    style("?").yellow().bold()
                );
                let answer = lines.next_line().await.ok().flatten().unwrap_or_default();
                if commands::is_confirmation(&answer) {
                    orch.clear_history()?;
                }
            }
            Some(ChatCommand::Toggle) => {
                if presenter.toggle() {
                    println!(
                        "  {}",
                        style("Transcript collapsed. /toggle to expand.").dim()
                    );
                } else {
                    rerender_history(orch, presenter)?;
                }
            }
            Some(ChatCommand::Ability(name)) => {
                if presenter.expand() {
                    rerender_history(orch, presenter)?;
                }
                ask(orch, &ability_query(&name)).await?
            }
            Some(ChatCommand::Sources) => print_sources(orch)?,
            Some(ChatCommand::Reconnect) => {
                orch.connect().await?;
            }
            Some(ChatCommand::Unknown(cmd)) => {
                eprintln!(
                    "  {} Unknown command: {} (try /help)",
                    style("!").yellow().bold(),
                    cmd
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level applies; a load
    // failure is logged once tracing is up.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = if config_file.exists() {
        match LorekeeperConfig::load(&config_file) {
            Ok(config) => (config, None),
            Err(e) => (LorekeeperConfig::default(), Some(e)),
        }
    } else {
        (LorekeeperConfig::default(), None)
    };
    args.apply_overrides(&mut config);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Lorekeeper v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config. Using defaults."
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration resolved"),
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("lorekeeper.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    let history = HistoryStore::new(KvStore::new(db), config.chat.history_key.clone());

    // Chat engine.
    let dispatcher = QueryDispatcher::from_configs(config.sources.clone())?;
    let api = HttpReferenceClient::new(&config.http)?;
    let presenter = Arc::new(TerminalPresenter::new());
    let orch = ChatOrchestrator::new(
        &config.chat,
        dispatcher,
        api,
        history,
        presenter.clone(),
    );

    if let Some(query) = args.query {
        if orch.connect().await? {
            ask(&orch, &query).await?;
        }
        return Ok(());
    }

    print_banner();
    orch.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    run_chat_loop(&orch, &presenter, &mut lines).await?;

    println!("  {}", style("Goodbye!").dim());
    Ok(())
}
