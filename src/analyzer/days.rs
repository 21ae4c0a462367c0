// Weekday detection over free-form promotional text
use crate::model::PromotionRecord;
use crate::normalizer::normalize;
use crate::weekday::{DaySet, Weekday};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

// All patterns run against normalized (lower-case, accent-free) text.
const DAY_NAME: &str = r"(lunes|martes|miercoles|jueves|viernes|sabados?|domingos?)";
const DAY_ABBR: &str = r"(lun|mar|mie|jue|vie|sab|dom)";
const DATE: &str = r"\d{1,2}/\d{1,2}/\d{4}";

static ALL_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btodos?\s+los\s+dias\b").expect("valid all-days regex"));

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:\b(?:de|del|desde)\s+)?\b(?:{DAY_NAME}|{DAY_ABBR}\.)\s+(?:a|al|hasta)\s+(?:el\s+)?(?:{DAY_NAME}\b|{DAY_ABBR}\.)"
    ))
    .expect("valid range regex")
});

// Full names anywhere on word boundaries; short forms only with their trailing period,
// so "mar" (sea) or "dom" (domicilio) never count.
static LOOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{DAY_NAME}\b|\b{DAY_ABBR}\."))
        .expect("valid loose day regex")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid date regex")
});

static WINDOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:valido\s+)?\b(?:desde|del)\s+(?:el\s+)?{DATE}\s+(?:hasta|al)\s+(?:el\s+)?{DATE}\b"
    ))
    .expect("valid window regex")
});

/// How detection rules combine within one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Ranges, loose mentions and explicit dates are merged.
    #[default]
    Union,
    /// Ranges, then loose mentions, then explicit dates; first non-empty wins.
    Priority,
}

/// How the text fields of a promotion are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// details, discount, cap in that order, first non-empty wins; legal only if all three are empty.
    #[default]
    FirstNonEmpty,
    /// All fields joined and searched once.
    Concatenate,
}

/// Text fields a promotion's days are read from.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionText<'a> {
    pub details: &'a str,
    pub discount: &'a str,
    pub cap: &'a str,
    pub legal: &'a str,
}

impl<'a> From<&'a PromotionRecord> for PromotionText<'a> {
    fn from(record: &'a PromotionRecord) -> Self {
        Self {
            details: &record.details_text,
            discount: &record.discount_text,
            cap: &record.cap_text,
            legal: &record.legal_text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayExtractor {
    pub mode: RuleMode,
    pub fields: FieldPolicy,
}

impl DayExtractor {
    #[cfg(test)]
    pub fn new(mode: RuleMode, fields: FieldPolicy) -> Self {
        Self { mode, fields }
    }

    /// Days a single text says it applies to. Empty when nothing is stated.
    pub fn extract(&self, text: &str) -> DaySet {
        let t = normalize(text);
        let found = self.stated_days(&t);
        // A validity window with no day statement means every day.
        if found.is_empty() && WINDOW_RE.is_match(&t) {
            return DaySet::all();
        }
        found
    }

    /// Days for a whole promotion following the configured field policy.
    pub fn extract_promotion(&self, text: PromotionText<'_>) -> DaySet {
        match self.fields {
            FieldPolicy::FirstNonEmpty => {
                let mut windowed = false;
                for field in [text.details, text.discount, text.cap, text.legal] {
                    let t = normalize(field);
                    let days = self.stated_days(&t);
                    if !days.is_empty() {
                        return days;
                    }
                    windowed |= WINDOW_RE.is_match(&t);
                }
                // every field is silent on days; a validity window anywhere means all of them
                if windowed {
                    DaySet::all()
                } else {
                    DaySet::new()
                }
            }
            FieldPolicy::Concatenate => {
                let joined = [text.details, text.discount, text.cap, text.legal].join(" ");
                self.extract(&joined)
            }
        }
    }

    /// Explicit day statements of normalized text, without the validity-window fallback.
    fn stated_days(&self, t: &str) -> DaySet {
        if t.trim().is_empty() {
            return DaySet::new();
        }

        if ALL_DAYS_RE.is_match(t) {
            return DaySet::all();
        }

        let windows: Vec<Range<usize>> = WINDOW_RE.find_iter(t).map(|m| m.range()).collect();

        match self.mode {
            RuleMode::Union => range_days(t)
                .union(loose_days(t))
                .union(date_days(t, &windows)),
            RuleMode::Priority => {
                let ranges = range_days(t);
                if !ranges.is_empty() {
                    ranges
                } else {
                    let loose = loose_days(t);
                    if !loose.is_empty() {
                        loose
                    } else {
                        date_days(t, &windows)
                    }
                }
            }
        }
    }
}

fn range_days(text: &str) -> DaySet {
    let mut days = DaySet::new();
    for caps in RANGE_RE.captures_iter(text) {
        let start = caps.get(1).or_else(|| caps.get(2)).and_then(|m| Weekday::from_token(m.as_str()));
        let end = caps.get(3).or_else(|| caps.get(4)).and_then(|m| Weekday::from_token(m.as_str()));
        if let (Some(start), Some(end)) = (start, end) {
            days = days.union(DaySet::range(start, end));
        }
    }
    days
}

fn loose_days(text: &str) -> DaySet {
    LOOSE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| Weekday::from_token(m.as_str()))
        .collect()
}

/// Weekdays of explicit dd/mm/yyyy dates, skipping dates that bound a validity window.
fn date_days(text: &str, windows: &[Range<usize>]) -> DaySet {
    DATE_RE
        .captures_iter(text)
        .filter(|caps| {
            caps.get(0)
                .map(|m| !windows.iter().any(|w| w.contains(&m.start())))
                .unwrap_or(false)
        })
        .filter_map(|caps| {
            let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
            let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .map(|date| Weekday::from_chrono(date.weekday()))
        .collect()
}
