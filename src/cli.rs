// Command line: service loop plus one-shot queries over the stored promotions
use crate::analyzer::days::DayExtractor;
use crate::analyzer::AnalyzerImpl;
use crate::config::{AppConfig, ConfigError};
use crate::enrich::add_days;
use crate::model::{EnrichError, ImportError, StorageError};
use crate::queries::{self, FilterQuery, FilterType, FilterValue};
use crate::storage::SqliteStorage;
use crate::utils::split_terms;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "promo-sniper", version, about = "Supermarket bank promotion aggregator")]
pub struct Cli {
    /// Path to the JSON configuration
    #[arg(long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the configured supermarkets periodically and serve the Telegram bot (default)
    Run,

    /// Store a scraper output document ({ "supermarket": .., "discounts": [..] })
    Import {
        file: PathBuf,

        /// Supermarket name, overrides the one in the document
        #[arg(long)]
        supermarket: Option<String>,

        /// Only overwrite a supermarket that is already stored
        #[arg(long)]
        update: bool,
    },

    /// Add a "days" field to every promotion of a JSON document
    Days {
        /// Input file, "-" for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },

    /// Best promotions across all supermarkets
    Top {
        /// Number of promotions (default: top_limit from the config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Distinct payment methods
    Wallets,

    /// Promotions matching a wallet, supermarket or day
    Filter {
        by: FilterType,

        /// Values; comma separated lists are accepted
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },
}

/// Read-only commands answered from the stored promotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    Top { limit: Option<usize> },
    Wallets,
    Filter { by: FilterType, values: &'a [String] },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CommandError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn read_input(input: &str) -> Result<String, CommandError> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Enriches a JSON document with days. Returns the rendered document and how many
/// promotions got days.
pub fn enrich_document(content: &str, extractor: &DayExtractor, pretty: bool) -> Result<(String, usize), CommandError> {
    let mut document: Value = serde_json::from_str(content)?;
    let enriched = add_days(&mut document, extractor)?;
    Ok((to_json(&document, pretty)?, enriched))
}

/// Executes the `days` command; the document goes to `out` or is returned for stdout.
pub fn days(
    input: &str,
    out: Option<&Path>,
    pretty: bool,
    config: &AppConfig,
) -> Result<Option<String>, CommandError> {
    let content = read_input(input)?;
    let (rendered, enriched) = enrich_document(&content, &config.days, pretty)?;
    tracing::info!("Days detected for {} promotions", enriched);
    match out {
        Some(path) => {
            fs::write(path, rendered)?;
            Ok(None)
        }
        None => Ok(Some(rendered)),
    }
}

pub fn import(
    file: &Path,
    supermarket: Option<&str>,
    update: bool,
    config: &AppConfig,
) -> Result<String, CommandError> {
    let storage = SqliteStorage::new(&config.database_path)?;
    let analyzer = AnalyzerImpl::from_config(config);
    let outcome = crate::pipeline::import_file(file, supermarket, update, &analyzer, &storage)?;
    Ok(format!(
        "Imported {} promotions for {} ({} rejected)",
        outcome.stored,
        outcome.merchant,
        outcome.rejected()
    ))
}

/// Runs a read-only query command and renders its JSON response.
pub fn query(request: Query<'_>, storage: &SqliteStorage, config: &AppConfig) -> Result<String, CommandError> {
    let sets = storage.get_all_promotions()?;
    match request {
        Query::Top { limit } => {
            let analyzer = AnalyzerImpl::from_config(config);
            let response = queries::top_discounts(&analyzer, &sets, limit.unwrap_or(config.top_limit));
            to_json(&response, true)
        }
        Query::Wallets => to_json(&queries::wallets(&sets), true),
        Query::Filter { by, values } => {
            let terms: Vec<String> = values.iter().flat_map(|v| split_terms(v)).collect();
            let response = queries::filter(
                &sets,
                FilterQuery {
                    filter_type: by,
                    filter_value: FilterValue::Many(terms),
                },
            );
            to_json(&response, true)
        }
    }
}
