// Request / response shapes served to the front-end
use crate::analyzer::filter::{by_day, by_merchant, by_wallet, list_wallets};
use crate::analyzer::Analyzer;
use crate::model::{MerchantDiscounts, MerchantPromotionSet};
use crate::weekday::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Wallet,
    Supermarket,
    Day,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn into_terms(self) -> Vec<String> {
        match self {
            FilterValue::One(term) => vec![term],
            FilterValue::Many(terms) => terms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterQuery {
    pub filter_type: FilterType,
    pub filter_value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResponse {
    pub result: Vec<MerchantDiscounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDiscountsResponse {
    pub top_discounts: Vec<MerchantDiscounts>,
}

pub fn filter(sets: &[MerchantPromotionSet], query: FilterQuery) -> FilterResponse {
    let terms = query.filter_value.into_terms();
    let result = match query.filter_type {
        FilterType::Wallet => by_wallet(sets, &terms),
        FilterType::Supermarket => by_merchant(sets, &terms),
        FilterType::Day => {
            // unknown day names are dropped
            let days: Vec<Weekday> = terms.iter().filter_map(|t| Weekday::from_token(t)).collect();
            by_day(sets, &days)
        }
    };
    FilterResponse { result }
}

pub fn top_discounts<A: Analyzer>(
    analyzer: &A,
    sets: &[MerchantPromotionSet],
    limit: usize,
) -> TopDiscountsResponse {
    TopDiscountsResponse {
        top_discounts: analyzer.top_discounts(sets, limit),
    }
}

pub fn wallets(sets: &[MerchantPromotionSet]) -> Vec<String> {
    list_wallets(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzerImpl;
    use crate::model::PromotionRecord;
    use crate::weekday::DaySet;
    use chrono::Utc;
    use serde_json::json;

    fn corpus() -> Vec<MerchantPromotionSet> {
        let promo = |method: &str, discount: &str, day: Weekday| PromotionRecord {
            payment_method: method.into(),
            discount_text: discount.into(),
            cap_text: String::new(),
            applies_to: None,
            details_text: String::new(),
            legal_text: String::new(),
            logo_url: String::new(),
            days: [day].into_iter().collect::<DaySet>(),
        };
        vec![
            MerchantPromotionSet {
                merchant: "coto".into(),
                promotions: vec![promo("Mercado Pago", "10%", Weekday::Monday)],
                updated_at: Utc::now(),
            },
            MerchantPromotionSet {
                merchant: "dia".into(),
                promotions: vec![promo("Galicia", "25%", Weekday::Wednesday)],
                updated_at: Utc::now(),
            },
        ]
    }

    #[test]
    fn test_filter_query_accepts_string_or_list() {
        let query: FilterQuery =
            serde_json::from_value(json!({ "filter_type": "wallet", "filter_value": "mercado pago" })).unwrap();
        assert_eq!(query.filter_value, FilterValue::One("mercado pago".into()));

        let query: FilterQuery = serde_json::from_value(
            json!({ "filter_type": "supermarket", "filter_value": ["coto", "dia"] }),
        )
        .unwrap();
        assert_eq!(query.filter_type, FilterType::Supermarket);

        let response = filter(&corpus(), query);
        assert_eq!(response.result.len(), 2);
    }

    #[test]
    fn test_filter_response_shape() {
        let sets = corpus();
        let query = FilterQuery {
            filter_type: FilterType::Wallet,
            filter_value: FilterValue::One("MERCADO".into()),
        };
        let body = serde_json::to_value(filter(&sets, query)).unwrap();
        assert_eq!(body["result"][0]["supermarket"], "coto");
        assert_eq!(body["result"][0]["discounts"][0]["payment_method"], "Mercado Pago");
        assert_eq!(body["result"][0]["discounts"][0]["days"], json!(["monday"]));
    }

    #[test]
    fn test_day_filter_ignores_unknown_names() {
        let sets = corpus();
        let query = FilterQuery {
            filter_type: FilterType::Day,
            filter_value: FilterValue::Many(vec!["miércoles".into(), "feriado".into()]),
        };
        let response = filter(&sets, query);
        assert_eq!(response.result.len(), 1);
        assert_eq!(response.result[0].supermarket, "dia");
    }

    #[test]
    fn test_top_discounts_response_shape() {
        let sets = corpus();
        let body = serde_json::to_value(top_discounts(&AnalyzerImpl::default(), &sets, 1)).unwrap();
        assert_eq!(body["top_discounts"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["top_discounts"][0]["supermarket"], "dia");
        assert_eq!(wallets(&sets), vec!["Galicia", "Mercado Pago"]);
    }
}
