// Adds a `days` field to every promotion of a JSON document
use crate::analyzer::days::{DayExtractor, PromotionText};
use crate::model::EnrichError;
use serde_json::{Map, Value};

const ARRAY_KEYS: [&str; 2] = ["discounts", "promotions"];
const DETAILS_KEYS: [&str; 2] = ["details", "detalles"];
const DISCOUNT_KEYS: [&str; 2] = ["discount", "descuento"];
const CAP_KEYS: [&str; 2] = ["cap", "tope"];
const LEGAL_KEYS: [&str; 2] = ["legal", "legales"];

fn text_field<'a>(promo: &'a Map<String, Value>, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|k| promo.get(*k).and_then(Value::as_str))
        .unwrap_or("")
}

fn promotions_mut(document: &mut Value) -> Option<&mut Vec<Value>> {
    if document.is_array() {
        return document.as_array_mut();
    }
    let object = document.as_object_mut()?;
    let key = ARRAY_KEYS.iter().find(|k| object.get(**k).is_some_and(Value::is_array))?;
    object.get_mut(*key).and_then(Value::as_array_mut)
}

/// Takes the promotion array out of a document, in the same shapes [`add_days`] accepts.
pub fn into_promotions(document: Value) -> Result<Vec<Value>, EnrichError> {
    match document {
        Value::Array(promotions) => Ok(promotions),
        Value::Object(mut object) => ARRAY_KEYS
            .iter()
            .find_map(|k| match object.remove(*k) {
                Some(Value::Array(promotions)) => Some(promotions),
                _ => None,
            })
            .ok_or(EnrichError::MissingArray),
        _ => Err(EnrichError::MissingArray),
    }
}

/// Writes `days` on every promotion whose text states its days and leaves the rest untouched.
/// Accepts `{ "discounts": [...] }`, `{ "promotions": [...] }` or a bare array.
/// Returns how many promotions got days.
pub fn add_days(document: &mut Value, extractor: &DayExtractor) -> Result<usize, EnrichError> {
    let promotions = promotions_mut(document).ok_or(EnrichError::MissingArray)?;

    let mut enriched = 0;
    for promo in promotions.iter_mut().filter_map(Value::as_object_mut) {
        let days = extractor.extract_promotion(PromotionText {
            details: text_field(promo, &DETAILS_KEYS),
            discount: text_field(promo, &DISCOUNT_KEYS),
            cap: text_field(promo, &CAP_KEYS),
            legal: text_field(promo, &LEGAL_KEYS),
        });
        if days.is_empty() {
            continue;
        }
        let tokens = days.iter().map(|d| Value::from(d.as_str())).collect();
        promo.insert("days".to_string(), Value::Array(tokens));
        enriched += 1;
    }
    Ok(enriched)
}
