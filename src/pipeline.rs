// Refresh of a merchant: fetch, parse, logo inference, validation, days, storage
use crate::analyzer::Analyzer;
use crate::config::{AppConfig, MerchantConfig};
use crate::enrich::into_promotions;
use crate::fetch::Scraper;
use crate::logo::LogoRegistry;
use crate::model::{ImportError, PromotionRecord, RefreshError, ScrapeRequest};
use crate::parser::parser_for;
use crate::storage::SqliteStorage;
use crate::validation::{validate_all, validate_values, RawPromotion};
use rand::Rng;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub merchant: String,
    /// Candidates found on the page or in the document.
    pub scraped: usize,
    pub stored: usize,
}

impl RefreshOutcome {
    pub fn rejected(&self) -> usize {
        self.scraped.saturating_sub(self.stored)
    }
}

#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub refreshed: Vec<RefreshOutcome>,
    pub failed: Vec<(String, String)>,
}

fn finish<A: Analyzer>(
    merchant: &str,
    scraped: usize,
    records: Vec<PromotionRecord>,
    analyzer: &A,
) -> Option<(RefreshOutcome, Vec<PromotionRecord>)> {
    let records: Vec<PromotionRecord> = records.into_iter().map(|r| analyzer.with_days(r)).collect();
    if records.is_empty() {
        warn!("No valid promotions for {}, keeping what is stored", merchant);
        return None;
    }
    let outcome = RefreshOutcome {
        merchant: merchant.to_string(),
        scraped,
        stored: records.len(),
    };
    Some((outcome, records))
}

/// Fills in missing payment methods from known logos and learns the logos of the rest.
/// Returns the newly learned (hash, payment method) pairs.
async fn resolve_payment_methods<S: Scraper + ?Sized>(
    scraper: &S,
    logos: &mut LogoRegistry,
    candidates: &mut [RawPromotion],
) -> Vec<(String, String)> {
    let mut learned = Vec::new();
    for candidate in candidates.iter_mut().filter(|c| !c.logo.is_empty()) {
        if candidate.payment_method.trim().is_empty() {
            if let Some(method) = logos.infer(scraper, &candidate.logo).await {
                candidate.payment_method = method;
            }
        } else if let Some(hash) = logos.register(scraper, &candidate.logo, &candidate.payment_method).await {
            learned.push((hash, candidate.payment_method.trim().to_string()));
        }
    }
    learned
}

/// Replaces the stored promotions of one merchant with a fresh scrape.
/// A scrape that yields no valid promotion leaves storage untouched.
pub async fn refresh_merchant<S, A>(
    merchant: &MerchantConfig,
    scraper: &S,
    analyzer: &A,
    logos: &mut LogoRegistry,
    storage: &Mutex<SqliteStorage>,
) -> Result<RefreshOutcome, RefreshError>
where
    S: Scraper + ?Sized,
    A: Analyzer,
{
    info!("Fetching promotions of {}...", merchant.name);
    let request = ScrapeRequest {
        merchant: merchant.name.clone(),
        url: merchant.url.clone(),
    };
    let html = scraper.fetch(&request).await?;

    let mut candidates = match parser_for(merchant.site).parse(&html) {
        Ok(candidates) => candidates,
        Err(e) => {
            log_and_save_html(&html, &merchant.name);
            return Err(e.into());
        }
    };
    info!("Parsed {} promotion cards for {}", candidates.len(), merchant.name);

    let learned = resolve_payment_methods(scraper, logos, &mut candidates).await;
    let scraped = candidates.len();
    let records = validate_all(&merchant.name, candidates);

    let storage = storage.lock().await;
    for (hash, method) in &learned {
        storage.save_logo_hash(hash, method)?;
    }
    let (outcome, records) =
        finish(&merchant.name, scraped, records, analyzer).ok_or_else(|| RefreshError::Empty(merchant.name.clone()))?;
    storage.save_promotions(&merchant.name, &records)?;

    info!("Stored {} promotions for {}", outcome.stored, merchant.name);
    Ok(outcome)
}

/// Refreshes every configured merchant in turn, pausing between fetches.
pub async fn refresh_all<S, A>(
    config: &AppConfig,
    scraper: &S,
    analyzer: &A,
    logos: &mut LogoRegistry,
    storage: &Mutex<SqliteStorage>,
) -> RefreshSummary
where
    S: Scraper + ?Sized,
    A: Analyzer,
{
    let mut summary = RefreshSummary::default();
    for (i, merchant) in config.merchants.iter().enumerate() {
        if i > 0 {
            let jitter = rand::rng().random_range(0..=config.fetch_jitter_ms);
            sleep(Duration::from_millis(config.fetch_delay_ms + jitter)).await;
        }
        match refresh_merchant(merchant, scraper, analyzer, logos, storage).await {
            Ok(outcome) => summary.refreshed.push(outcome),
            Err(e) => {
                warn!("Refresh of {} failed: {}", merchant.name, e);
                summary.failed.push((merchant.name.clone(), e.to_string()));
            }
        }
    }
    summary
}

/// Stores a scraper output document `{ "supermarket": .., "discounts": [..] }`.
/// `merchant` overrides the name in the document. With `update_only` a merchant
/// that is not stored yet is left alone.
pub fn import_document<A: Analyzer>(
    document: Value,
    merchant: Option<&str>,
    update_only: bool,
    analyzer: &A,
    storage: &SqliteStorage,
) -> Result<RefreshOutcome, ImportError> {
    let merchant = merchant
        .map(str::to_string)
        .or_else(|| document.get("supermarket").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .ok_or(ImportError::MissingMerchant)?;

    let candidates = into_promotions(document)?;
    let scraped = candidates.len();
    let records = validate_values(&merchant, candidates);
    let (outcome, records) =
        finish(&merchant, scraped, records, analyzer).ok_or_else(|| ImportError::Empty(merchant.clone()))?;
    if update_only {
        if !storage.update_promotions(&merchant, &records)? {
            return Err(ImportError::NotStored(merchant));
        }
    } else {
        storage.save_promotions(&merchant, &records)?;
    }

    info!("Imported {} of {} promotions for {}", outcome.stored, scraped, merchant);
    Ok(outcome)
}

pub fn import_file<A: Analyzer>(
    path: &Path,
    merchant: Option<&str>,
    update_only: bool,
    analyzer: &A,
    storage: &SqliteStorage,
) -> Result<RefreshOutcome, ImportError> {
    let content = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    import_document(document, merchant, update_only, analyzer, storage)
}

/// Logs and saves the provided HTML for debugging purposes.
fn log_and_save_html(html: &str, merchant: &str) {
    let folder = Path::new("logs/html");
    if let Err(e) = fs::create_dir_all(folder) {
        warn!("Failed to create debug folder: {}", e);
        return;
    }
    let filename = folder.join(format!("debug-{}.html", merchant.trim().replace(' ', "_")));
    if let Err(e) = fs::write(&filename, html) {
        warn!("Failed to write debug HTML: {}", e);
    } else {
        info!("Saved debug HTML: {}", filename.display());
    }
}
