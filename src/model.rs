// Core structs: PromotionRecord, MerchantPromotionSet, ScoredPromotion and the error enums
use crate::weekday::DaySet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a promotion can be used: a single label ("online", "tienda") or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppliesTo {
    One(String),
    Many(Vec<String>),
}

/// One bank/wallet discount offered by one merchant, in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub payment_method: String,
    #[serde(rename = "discount", default)]
    pub discount_text: String,
    #[serde(rename = "cap", default)]
    pub cap_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<AppliesTo>,
    #[serde(rename = "details", default)]
    pub details_text: String,
    #[serde(rename = "legal", default)]
    pub legal_text: String,
    #[serde(rename = "logo", default, skip_serializing_if = "String::is_empty")]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "DaySet::is_empty")]
    pub days: DaySet,
}

/// Everything currently stored for one merchant. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantPromotionSet {
    pub merchant: String,
    pub promotions: Vec<PromotionRecord>,
    pub updated_at: DateTime<Utc>,
}

/// A promotion with its score, computed at query time.
#[derive(Debug, Clone, Copy)]
pub struct ScoredPromotion<'a> {
    pub merchant: &'a str,
    pub promotion: &'a PromotionRecord,
    pub score: f64,
}

/// Response group: promotions of one merchant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantDiscounts {
    pub supermarket: String,
    pub discounts: Vec<PromotionRecord>,
}

impl MerchantDiscounts {
    /// Groups (merchant, promotion) pairs by merchant. Groups appear in the order their
    /// first member was seen and members keep their relative order.
    pub fn group<'a, I>(pairs: I) -> Vec<MerchantDiscounts>
    where
        I: IntoIterator<Item = (&'a str, &'a PromotionRecord)>,
    {
        let mut groups: Vec<MerchantDiscounts> = Vec::new();
        for (merchant, promotion) in pairs {
            match groups.iter_mut().find(|g| g.supermarket == merchant) {
                Some(group) => group.discounts.push(promotion.clone()),
                None => groups.push(MerchantDiscounts {
                    supermarket: merchant.to_string(),
                    discounts: vec![promotion.clone()],
                }),
            }
        }
        groups
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub merchant: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid selector '{0}'")]
    Selector(String),
    #[error("no promotion cards found")]
    NoCards,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed promotion: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payment method is empty")]
    MissingPaymentMethod,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no valid promotions for '{0}'")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no 'discounts' or 'promotions' array in the document")]
    MissingArray,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document names no supermarket")]
    MissingMerchant,
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no valid promotions for '{0}'")]
    Empty(String),
    #[error("'{0}' is not stored yet")]
    NotStored(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    ApiError(#[from] reqwest::Error),
    #[error("telegram responded {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("telegram unreachable")]
    Unreachable,
}
