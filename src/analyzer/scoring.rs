use crate::model::PromotionRecord;
use crate::normalizer::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*%").expect("valid percent regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

const NO_CAP_PHRASES: [&str; 3] = ["sin tope", "sin limite", "sin minimo"];
const INSTALLMENTS_PHRASE: &str = "cuotas sin interes";

/// Weights of the score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Upper bound of the cap component, granted in full when there is no cap.
    pub cap_max: f64,
    /// Cap amount is divided by this before bounding.
    pub cap_divisor: f64,
    /// Upper bound of the percentage component.
    pub percent_max: f64,
    pub installments_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cap_max: 30.0,
            cap_divisor: 1000.0,
            percent_max: 30.0,
            installments_bonus: 10.0,
        }
    }
}

/// What the scorer read out of a promotion's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreInputs {
    pub percentage: u32,
    pub cap_amount: u64,
    pub no_cap: bool,
    pub installments: bool,
}

impl ScoreInputs {
    pub fn of(record: &PromotionRecord) -> Self {
        let cap = normalize(&record.cap_text);
        let discount = normalize(&record.discount_text);
        let details = normalize(&record.details_text);
        Self {
            percentage: extract_percentage(&record.discount_text),
            cap_amount: extract_cap_amount(&record.cap_text),
            no_cap: NO_CAP_PHRASES.iter().any(|p| cap.contains(p)),
            installments: discount.contains(INSTALLMENTS_PHRASE)
                || details.contains(INSTALLMENTS_PHRASE),
        }
    }

    pub fn total(&self, weights: &ScoreWeights) -> f64 {
        let cap_component = if self.no_cap {
            weights.cap_max
        } else if weights.cap_divisor > 0.0 {
            (self.cap_amount as f64 / weights.cap_divisor).min(weights.cap_max)
        } else {
            0.0
        };
        let percent_component = (self.percentage as f64).min(weights.percent_max);
        let bonus = if self.installments {
            weights.installments_bonus
        } else {
            0.0
        };
        cap_component + percent_component + bonus
    }
}

/// Score of a single promotion; higher is more attractive. Never fails.
pub fn score_promotion(record: &PromotionRecord, weights: &ScoreWeights) -> f64 {
    ScoreInputs::of(record).total(weights).max(0.0)
}

/// First integer directly followed by a percent sign, 0 if none.
pub fn extract_percentage(discount: &str) -> u32 {
    PERCENT_RE
        .captures(discount)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// First number in the cap text once thousands separators are gone ("$8.000" -> 8000).
pub fn extract_cap_amount(cap: &str) -> u64 {
    let cleaned = cap.replace('.', "");
    DIGITS_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
