use crate::analyzer::days::{DayExtractor, PromotionText};
use crate::analyzer::ranking::top_discounts;
use crate::analyzer::scoring::ScoreWeights;
use crate::config::AppConfig;
use crate::model::{MerchantDiscounts, MerchantPromotionSet, PromotionRecord};
use crate::weekday::DaySet;

/// Trait defining the interface for a promotion analyzer.
pub trait Analyzer {
    fn detect_days(&self, promotion: &PromotionRecord) -> DaySet;
    fn top_discounts(&self, sets: &[MerchantPromotionSet], limit: usize) -> Vec<MerchantDiscounts>;

    /// Replaces the promotion's days with the ones its text states.
    fn with_days(&self, mut promotion: PromotionRecord) -> PromotionRecord {
        promotion.days = self.detect_days(&promotion);
        promotion
    }
}

/// Implementation of the promotion analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerImpl {
    pub weights: ScoreWeights,
    pub days: DayExtractor,
}

impl AnalyzerImpl {
    pub fn new(weights: ScoreWeights, days: DayExtractor) -> Self {
        Self { weights, days }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.score, config.days)
    }
}

impl Analyzer for AnalyzerImpl {
    fn detect_days(&self, promotion: &PromotionRecord) -> DaySet {
        self.days.extract_promotion(PromotionText::from(promotion))
    }

    fn top_discounts(&self, sets: &[MerchantPromotionSet], limit: usize) -> Vec<MerchantDiscounts> {
        top_discounts(sets, &self.weights, limit)
    }
}
