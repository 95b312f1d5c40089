//! CLI entrypoint for imgchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use imgchat_application::{
    AskAboutImageUseCase, ConversationLogger, ManageConversationsUseCase, NoConversationLogger,
};
use imgchat_domain::UserId;
use imgchat_infrastructure::{
    ConfigLoader, FileConfig, HttpImageFetcher, JsonlConversationLogger, SqliteSessionStore,
    build_chat_provider,
};
use imgchat_presentation::{
    AskRequest, Cli, Command, ConsoleFormatter, ConversationController, JsonFormatter,
    OutputFormatter,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow!("failed to load configuration: {}", e))?;
    config.validate().context("invalid configuration")?;

    let _log_guard = init_tracing(cli.verbose, config.logging.directory.as_deref())?;
    info!("Starting imgchat");

    let formatter: Box<dyn OutputFormatter> = if cli.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(ConsoleFormatter)
    };

    let outcome = match cli.command {
        Command::Config => {
            show_config(cli.config.as_deref(), &config)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Models => {
            let provider = build_chat_provider(&config.provider, config.provider_timeout()).await?;
            let models = provider.available_models().await?;
            println!("{}", formatter.format_models(provider.name(), &models));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Ask { url, prompt } => {
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let controller = build_controller(&config, true).await?;
            let request = AskRequest {
                subject_url: url,
                prompt,
            };
            controller.ask(&user, request).await
        }
        Command::Show { url } => {
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let controller = build_controller(&config, false).await?;
            controller.get_conversation(&user, url.as_deref()).await
        }
        Command::Clear { url, .. } => {
            let user = resolve_user(cli.user.as_deref(), &config)?;
            let controller = build_controller(&config, false).await?;
            controller.clear_conversation(&user, url.as_deref()).await
        }
    };

    let rendered = formatter.format(&outcome);
    if outcome.status.is_success() {
        if rendered.is_empty() && !cli.json {
            println!("Cleared.");
        } else {
            print!("{}", rendered);
        }
        Ok(ExitCode::SUCCESS)
    } else {
        eprint!("{}", rendered);
        Ok(ExitCode::FAILURE)
    }
}

/// Console logging filtered by `-v` (or `RUST_LOG`), plus an optional
/// daily-rotated file log.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "imgchat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// `--user` / `IMGCHAT_USER`, then `identity.user`, then the login name.
fn resolve_user(flag: Option<&str>, config: &FileConfig) -> Result<UserId> {
    let candidate = flag
        .map(str::to_string)
        .or_else(|| config.identity.user.clone())
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok());

    match candidate {
        Some(id) => UserId::try_new(id).context("invalid user identity"),
        None => bail!("No user identity: pass --user or set identity.user in the config"),
    }
}

async fn build_controller(config: &FileConfig, with_provider: bool) -> Result<ConversationController> {
    let db_path = config
        .storage
        .database_path()
        .context("no data directory available; set storage.database")?;
    let store = Arc::new(
        SqliteSessionStore::open(&db_path)
            .await
            .with_context(|| format!("cannot open session store {}", db_path.display()))?,
    );
    info!(path = %db_path.display(), "Session store ready");

    let manage = ManageConversationsUseCase::new(store.clone());

    if !with_provider {
        return Ok(ConversationController::read_only(manage));
    }

    let fetcher = Arc::new(HttpImageFetcher::new(
        config.fetch_timeout(),
        config.fetch.max_bytes,
    )?);
    let provider = build_chat_provider(&config.provider, config.provider_timeout()).await?;
    info!(provider = provider.name(), "Chat provider ready");

    let conversation_logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log
    {
        Some(path) => match JsonlConversationLogger::open(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!(path = %path.display(), "Conversation transcript disabled");
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };

    let ask = AskAboutImageUseCase::new(store, fetcher, provider)
        .with_config(config.to_conversation_config())
        .with_conversation_logger(conversation_logger);

    Ok(ConversationController::new(ask, manage))
}

fn show_config(explicit: Option<&Path>, config: &FileConfig) -> Result<()> {
    for line in ConfigLoader::describe_sources(explicit) {
        println!("{}", line);
    }

    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some("***".to_string());
    }
    println!();
    println!("{}", toml::to_string_pretty(&shown).context("cannot render configuration")?);
    Ok(())
}
