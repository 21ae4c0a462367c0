// Plain-text rendering of bot replies
use crate::model::{MerchantDiscounts, PromotionRecord};
use crate::pipeline::RefreshSummary;
use std::time::Duration;

/// Telegram rejects messages above 4096 characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;
const TRUNCATED: &str = "\n…";

pub fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let keep = MAX_MESSAGE_CHARS - TRUNCATED.chars().count();
    let cut = text.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(text.len());
    format!("{}{}", &text[..cut], TRUNCATED)
}

pub fn promotion(promo: &PromotionRecord) -> String {
    let mut lines = vec![format!("💳 {}", promo.payment_method)];
    if !promo.discount_text.is_empty() {
        lines.push(format!("💸 {}", promo.discount_text));
    }
    if !promo.cap_text.is_empty() {
        lines.push(format!("🔝 {}", promo.cap_text));
    }
    if !promo.days.is_empty() {
        lines.push(format!("📅 {}", promo.days));
    }
    lines.join("\n")
}

pub fn groups(title: &str, groups: &[MerchantDiscounts]) -> String {
    if groups.is_empty() {
        return "📭 No promotions found.".to_string();
    }
    let mut msg = format!("{}\n", title);
    for group in groups {
        msg.push_str(&format!("\n🏪 {}\n", group.supermarket.to_uppercase()));
        for promo in &group.discounts {
            msg.push_str(&promotion(promo));
            msg.push_str("\n\n");
        }
    }
    truncate(msg.trim_end())
}

pub fn wallets(wallets: &[String]) -> String {
    if wallets.is_empty() {
        return "📭 No payment methods stored yet.".to_string();
    }
    let mut msg = String::from("👛 Payment methods:\n");
    for wallet in wallets {
        msg.push_str(&format!("🔹 {}\n", wallet));
    }
    truncate(msg.trim_end())
}

pub fn refresh_summary(summary: &RefreshSummary) -> String {
    let mut msg = String::from("🔄 Refresh finished");
    for outcome in &summary.refreshed {
        msg.push_str(&format!(
            "\n✅ {}: {} stored, {} rejected",
            outcome.merchant,
            outcome.stored,
            outcome.rejected()
        ));
    }
    for (merchant, error) in &summary.failed {
        msg.push_str(&format!("\n❌ {}: {}", merchant, error));
    }
    truncate(&msg)
}

pub fn uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("⏱ Uptime: {:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
