use crate::analyzer::scoring::{score_promotion, ScoreWeights};
use crate::model::{MerchantDiscounts, MerchantPromotionSet, ScoredPromotion};

pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Scores every promotion of every merchant, in encounter order.
pub fn score_all<'a>(sets: &'a [MerchantPromotionSet], weights: &ScoreWeights) -> Vec<ScoredPromotion<'a>> {
    sets.iter()
        .flat_map(|set| {
            set.promotions.iter().map(move |promotion| ScoredPromotion {
                merchant: set.merchant.as_str(),
                promotion,
                score: score_promotion(promotion, weights),
            })
        })
        .collect()
}

/// The `limit` best promotions across all merchants, grouped back by merchant.
/// Equal scores keep their encounter order.
pub fn top_discounts(
    sets: &[MerchantPromotionSet],
    weights: &ScoreWeights,
    limit: usize,
) -> Vec<MerchantDiscounts> {
    let mut scored = score_all(sets, weights);
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    MerchantDiscounts::group(scored.into_iter().map(|s| (s.merchant, s.promotion)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromotionRecord;
    use crate::weekday::DaySet;
    use chrono::Utc;

    // Scores: "Sin tope" = 30, plus the percentage.
    fn promo(name: &str, discount: &str, cap: &str) -> PromotionRecord {
        PromotionRecord {
            payment_method: name.into(),
            discount_text: discount.into(),
            cap_text: cap.into(),
            applies_to: None,
            details_text: String::new(),
            legal_text: String::new(),
            logo_url: String::new(),
            days: DaySet::new(),
        }
    }

    fn set(merchant: &str, promotions: Vec<PromotionRecord>) -> MerchantPromotionSet {
        MerchantPromotionSet {
            merchant: merchant.into(),
            promotions,
            updated_at: Utc::now(),
        }
    }

    fn corpus() -> Vec<MerchantPromotionSet> {
        vec![
            set("coto", vec![promo("s30", "", "Sin tope"), promo("s10", "10%", "")]),
            set("dia", vec![promo("s40", "10%", "Sin tope"), promo("s50", "20%", "Sin tope")]),
            set("jumbo", vec![promo("s20", "20%", "")]),
        ]
    }

    fn methods(groups: &[MerchantDiscounts]) -> Vec<(String, Vec<String>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.supermarket.clone(),
                    g.discounts.iter().map(|d| d.payment_method.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_scores_in_encounter_order() {
        let sets = corpus();
        let scores: Vec<f64> = score_all(&sets, &ScoreWeights::default())
            .iter()
            .map(|s| s.score)
            .collect();
        assert_eq!(scores, vec![30.0, 10.0, 40.0, 50.0, 20.0]);
    }

    #[test]
    fn test_top_two_from_same_merchant() {
        let sets = corpus();
        let top = top_discounts(&sets, &ScoreWeights::default(), 2);
        assert_eq!(
            methods(&top),
            vec![("dia".to_string(), vec!["s50".to_string(), "s40".to_string()])]
        );
    }

    #[test]
    fn test_top_groups_by_merchant() {
        let sets = corpus();
        let top = top_discounts(&sets, &ScoreWeights::default(), 4);
        assert_eq!(
            methods(&top),
            vec![
                ("dia".to_string(), vec!["s50".to_string(), "s40".to_string()]),
                ("coto".to_string(), vec!["s30".to_string()]),
                ("jumbo".to_string(), vec!["s20".to_string()]),
            ]
        );
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let sets = vec![
            set("coto", vec![promo("first", "15%", "")]),
            set("dia", vec![promo("second", "15%", ""), promo("third", "15%", "")]),
        ];
        let top = top_discounts(&sets, &ScoreWeights::default(), 2);
        assert_eq!(
            methods(&top),
            vec![
                ("coto".to_string(), vec!["first".to_string()]),
                ("dia".to_string(), vec!["second".to_string()]),
            ]
        );
    }

    #[test]
    fn test_limit_larger_than_corpus_and_empty_input() {
        let sets = corpus();
        let total: usize = top_discounts(&sets, &ScoreWeights::default(), 50)
            .iter()
            .map(|g| g.discounts.len())
            .sum();
        assert_eq!(total, 5);
        assert!(top_discounts(&[], &ScoreWeights::default(), DEFAULT_TOP_LIMIT).is_empty());
        assert!(top_discounts(&sets, &ScoreWeights::default(), 0).is_empty());
    }
}
