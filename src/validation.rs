// Coerces scraped or LLM-produced candidates into PromotionRecord
use crate::model::{AppliesTo, PromotionRecord, ValidationError};
use crate::normalizer::collapse_whitespace;
use crate::weekday::DaySet;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

/// A candidate promotion as produced by a site parser or an extraction prompt.
/// Accepts both the canonical keys and the Spanish ones the scrapers emit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPromotion {
    #[serde(default, alias = "medio_pago", deserialize_with = "null_as_empty")]
    pub payment_method: String,
    #[serde(default, rename = "discount", alias = "descuento", deserialize_with = "null_as_empty")]
    pub discount: String,
    #[serde(default, rename = "cap", alias = "tope", deserialize_with = "null_as_empty")]
    pub cap: String,
    #[serde(default, alias = "aplica_en")]
    pub applies_to: Option<AppliesTo>,
    #[serde(default, rename = "details", alias = "detalles", deserialize_with = "null_as_empty")]
    pub details: String,
    #[serde(default, rename = "legal", alias = "legales", deserialize_with = "null_as_empty")]
    pub legal: String,
    #[serde(default, alias = "logo_url", deserialize_with = "null_as_empty")]
    pub logo: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn clean_applies_to(applies_to: Option<AppliesTo>) -> Option<AppliesTo> {
    match applies_to? {
        AppliesTo::One(label) => {
            let label = collapse_whitespace(&label);
            (!label.is_empty()).then_some(AppliesTo::One(label))
        }
        AppliesTo::Many(labels) => {
            let labels: Vec<String> = labels
                .iter()
                .map(|l| collapse_whitespace(l))
                .filter(|l| !l.is_empty())
                .collect();
            (!labels.is_empty()).then_some(AppliesTo::Many(labels))
        }
    }
}

/// Validates one candidate. Days are left empty; they are derived later from the text.
pub fn validate(raw: RawPromotion) -> Result<PromotionRecord, ValidationError> {
    let payment_method = collapse_whitespace(&raw.payment_method);
    if payment_method.is_empty() {
        return Err(ValidationError::MissingPaymentMethod);
    }

    Ok(PromotionRecord {
        payment_method,
        discount_text: raw.discount.trim().to_string(),
        cap_text: raw.cap.trim().to_string(),
        applies_to: clean_applies_to(raw.applies_to),
        details_text: raw.details.trim().to_string(),
        legal_text: raw.legal.trim().to_string(),
        logo_url: raw.logo.trim().to_string(),
        days: DaySet::new(),
    })
}

pub fn validate_value(value: Value) -> Result<PromotionRecord, ValidationError> {
    let raw: RawPromotion = serde_json::from_value(value)?;
    validate(raw)
}

/// Validates a batch, logging and skipping the candidates that are rejected.
pub fn validate_all<I>(merchant: &str, candidates: I) -> Vec<PromotionRecord>
where
    I: IntoIterator<Item = RawPromotion>,
{
    collect_valid(merchant, candidates.into_iter().map(validate))
}

/// Same as [`validate_all`] for untyped JSON candidates.
pub fn validate_values<I>(merchant: &str, candidates: I) -> Vec<PromotionRecord>
where
    I: IntoIterator<Item = Value>,
{
    collect_valid(merchant, candidates.into_iter().map(validate_value))
}

fn collect_valid<I>(merchant: &str, results: I) -> Vec<PromotionRecord>
where
    I: Iterator<Item = Result<PromotionRecord, ValidationError>>,
{
    let mut records = Vec::new();
    for (i, result) in results.enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping promotion #{} of {}: {}", i, merchant, e),
        }
    }
    debug!("{} valid promotions for {}", records.len(), merchant);
    records
}
