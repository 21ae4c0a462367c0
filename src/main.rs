mod analyzer;
mod cli;
mod config;
mod enrich;
mod fetch;
mod logo;
mod model;
mod normalizer;
mod notifier;
mod parser;
mod pipeline;
mod queries;
mod storage;
mod utils;
mod validation;
mod weekday;

use analyzer::AnalyzerImpl;
use clap::Parser;
use cli::{Cli, Command, CommandError, Query};
use config::{load_config, AppConfig, ConfigError};
use fetch::ScraperImpl;
use logo::LogoRegistry;
use notifier::telegram::format;
use notifier::TelegramNotifier;
use pipeline::refresh_all;
use std::process::ExitCode;
use std::sync::Arc;
use storage::SqliteStorage;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries command output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(ConfigError::Io(e)) if !matches!(command, Command::Run) => {
            warn!("Config not readable ({}), using defaults", e);
            AppConfig::default()
        }
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &command {
        Command::Run => return run(Arc::new(config)).await,
        Command::Import { file, supermarket, update } => {
            cli::import(file, supermarket.as_deref(), *update, &config).map(Some)
        }
        Command::Days { input, out, pretty } => cli::days(input, out.as_deref(), *pretty, &config),
        Command::Top { limit } => query_database(Query::Top { limit: *limit }, &config),
        Command::Wallets => query_database(Query::Wallets, &config),
        Command::Filter { by, values } => query_database(Query::Filter { by: *by, values }, &config),
    };

    match result {
        Ok(Some(output)) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Refreshes all merchants on a timer or on demand and serves the bot.
async fn run(config: Arc<AppConfig>) -> ExitCode {
    let scraper = match ScraperImpl::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let analyzer = AnalyzerImpl::from_config(&config);

    // Initialize storage (SQLite) with async access (wrapped in a Mutex)
    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut logos = load_logos(&scraper, &storage).await;
    info!("Known logos: {}", logos.len());

    let refresh_notify = Arc::new(Notify::new());
    let notifier = match config.telegram() {
        Some((token, chat_id)) => {
            match TelegramNotifier::new(token, chat_id, storage.clone(), config.clone(), refresh_notify.clone()) {
                Ok(n) => Some(Arc::new(n)),
                Err(e) => {
                    error!("Failed to create Telegram client: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            warn!("Telegram is not configured, running without bot");
            None
        }
    };

    if let Some(notifier) = &notifier {
        if let Err(e) = notifier.set_my_commands().await {
            warn!("setMyCommands failed: {}", e);
        }
        // Spawn listener for manual refresh (e.g. via /refresh command)
        TelegramNotifier::spawn_listener(notifier.clone());

        info!("Sending startup message...");
        if let Err(e) = notifier.notify_text("🚀 PromoSniper started!").await {
            warn!("Startup notification failed: {}", e);
        }
    }

    if config.merchants.is_empty() {
        warn!("No merchants configured, nothing will be scraped");
    }

    loop {
        info!("Refreshing {} merchants...", config.merchants.len());
        let summary = refresh_all(&config, &scraper, &analyzer, &mut logos, &storage).await;
        info!(
            "Refresh done: {} stored, {} failed",
            summary.refreshed.len(),
            summary.failed.len()
        );

        if let Some(notifier) = &notifier {
            if let Err(e) = notifier.notify_text(&format::refresh_summary(&summary)).await {
                warn!("Refresh summary notification failed: {}", e);
            }
        }

        info!(
            "Waiting for timer ({}s) or manual refresh...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
            }
        }
    }
}

/// Loads the persisted logo map and learns the logos of stored promotions.
fn query_database(request: Query<'_>, config: &AppConfig) -> Result<Option<String>, CommandError> {
    let storage = SqliteStorage::new(&config.database_path)?;
    cli::query(request, &storage, config).map(Some)
}

async fn load_logos(scraper: &ScraperImpl, storage: &Mutex<SqliteStorage>) -> LogoRegistry {
    let (known, sets) = {
        let storage = storage.lock().await;
        let known = storage.get_logo_map().unwrap_or_else(|e| {
            warn!("Cannot load logo map: {}", e);
            Default::default()
        });
        let sets = storage.get_all_promotions().unwrap_or_else(|e| {
            warn!("Cannot load stored promotions: {}", e);
            Vec::new()
        });
        (known, sets)
    };

    let mut logos = LogoRegistry::new(known);
    let learned = logos.learn_from(scraper, &sets).await;
    if logos.is_empty() {
        warn!("No logo hashes known yet, cards without payment text will be rejected");
    }
    let storage = storage.lock().await;
    for (hash, method) in &learned {
        if let Err(e) = storage.save_logo_hash(hash, method) {
            warn!("Cannot save logo hash: {}", e);
        }
    }
    logos
}
