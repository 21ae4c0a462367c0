// Wallet / merchant / day filters over the stored corpus
use crate::model::{MerchantDiscounts, MerchantPromotionSet};
use crate::utils::merchant_key;
use crate::weekday::Weekday;
use std::collections::BTreeSet;

fn search_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Promotions whose payment method contains any of the terms (case-insensitive).
/// Blank terms are ignored.
pub fn by_wallet(sets: &[MerchantPromotionSet], terms: &[String]) -> Vec<MerchantDiscounts> {
    let terms = search_terms(terms);
    if terms.is_empty() {
        return Vec::new();
    }
    let terms = &terms;
    MerchantDiscounts::group(sets.iter().flat_map(move |set| {
        set.promotions
            .iter()
            .filter(move |p| {
                let method = p.payment_method.to_lowercase();
                terms.iter().any(|t| method.contains(t.as_str()))
            })
            .map(move |p| (set.merchant.as_str(), p))
    }))
}

/// Full promotion sets of the merchants whose key equals one of the names.
pub fn by_merchant(sets: &[MerchantPromotionSet], names: &[String]) -> Vec<MerchantDiscounts> {
    let keys: Vec<String> = names.iter().map(|n| merchant_key(n)).filter(|k| !k.is_empty()).collect();
    sets.iter()
        .filter(|set| keys.contains(&merchant_key(&set.merchant)))
        .map(|set| MerchantDiscounts {
            supermarket: set.merchant.clone(),
            discounts: set.promotions.clone(),
        })
        .filter(|group| !group.discounts.is_empty())
        .collect()
}

/// Promotions that state they apply on any of the given days.
pub fn by_day(sets: &[MerchantPromotionSet], days: &[Weekday]) -> Vec<MerchantDiscounts> {
    MerchantDiscounts::group(sets.iter().flat_map(move |set| {
        set.promotions
            .iter()
            .filter(move |p| days.iter().any(|d| p.days.contains(*d)))
            .map(move |p| (set.merchant.as_str(), p))
    }))
}

/// Distinct payment methods across all merchants, sorted.
pub fn list_wallets(sets: &[MerchantPromotionSet]) -> Vec<String> {
    sets.iter()
        .flat_map(|set| set.promotions.iter())
        .map(|p| p.payment_method.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromotionRecord;
    use crate::weekday::DaySet;
    use chrono::Utc;

    fn promo(method: &str, days: &[Weekday]) -> PromotionRecord {
        PromotionRecord {
            payment_method: method.into(),
            discount_text: "20%".into(),
            cap_text: String::new(),
            applies_to: None,
            details_text: String::new(),
            legal_text: String::new(),
            logo_url: String::new(),
            days: days.iter().copied().collect::<DaySet>(),
        }
    }

    fn corpus() -> Vec<MerchantPromotionSet> {
        let set = |merchant: &str, promotions| MerchantPromotionSet {
            merchant: String::from(merchant),
            promotions,
            updated_at: Utc::now(),
        };
        vec![
            set("carrefour", vec![
                promo("Mercado Pago", &[Weekday::Monday]),
                promo("Banco Galicia", &[Weekday::Tuesday]),
            ]),
            set("coto", vec![promo("Galicia MODO", &[]), promo("MERCADO PAGO QR", &[Weekday::Tuesday])]),
            set("dia", vec![promo("Prex", &[Weekday::Sunday])]),
        ]
    }

    fn summary(groups: &[MerchantDiscounts]) -> Vec<(String, usize)> {
        groups.iter().map(|g| (g.supermarket.clone(), g.discounts.len())).collect()
    }

    #[test]
    fn test_by_wallet_matches_substring_case_insensitive() {
        let sets = corpus();
        let groups = by_wallet(&sets, &["mercado pago".to_string()]);
        assert_eq!(summary(&groups), vec![("carrefour".to_string(), 1), ("coto".to_string(), 1)]);
        assert_eq!(groups[1].discounts[0].payment_method, "MERCADO PAGO QR");
    }

    #[test]
    fn test_by_wallet_any_term() {
        let sets = corpus();
        let groups = by_wallet(&sets, &["galicia".to_string(), "PREX".to_string()]);
        assert_eq!(
            summary(&groups),
            vec![("carrefour".to_string(), 1), ("coto".to_string(), 1), ("dia".to_string(), 1)]
        );
    }

    #[test]
    fn test_by_wallet_no_match_is_empty() {
        let sets = corpus();
        assert!(by_wallet(&sets, &["naranja x".to_string()]).is_empty());
        assert!(by_wallet(&sets, &["  ".to_string()]).is_empty());
        assert!(by_wallet(&[], &["prex".to_string()]).is_empty());
    }

    #[test]
    fn test_by_merchant_returns_full_sets() {
        let sets = corpus();
        let groups = by_merchant(&sets, &["Carrefour".to_string(), " DIA ".to_string()]);
        assert_eq!(summary(&groups), vec![("carrefour".to_string(), 2), ("dia".to_string(), 1)]);
        assert!(by_merchant(&sets, &["jumbo".to_string()]).is_empty());
    }

    #[test]
    fn test_by_day() {
        let sets = corpus();
        let groups = by_day(&sets, &[Weekday::Tuesday]);
        assert_eq!(summary(&groups), vec![("carrefour".to_string(), 1), ("coto".to_string(), 1)]);
        assert!(by_day(&sets, &[Weekday::Friday]).is_empty());
    }

    #[test]
    fn test_list_wallets_sorted_distinct() {
        let mut sets = corpus();
        sets[2].promotions.push(promo(" Prex ", &[]));
        assert_eq!(
            list_wallets(&sets),
            vec!["Banco Galicia", "Galicia MODO", "MERCADO PAGO QR", "Mercado Pago", "Prex"]
        );
    }
}
