// Analyzer module: aggregates submodules for day detection, scoring, ranking and filtering.

pub mod days;
pub mod filter;
pub mod promo_analysis;
pub mod ranking;
pub mod scoring;

// Re-export the main Analyzer implementation for ease of use.
pub use promo_analysis::{Analyzer, AnalyzerImpl};
