use crate::model::ParserError;
use crate::parser::html::{first_attr, first_text, selector};
use crate::parser::PromotionParser;
use crate::validation::RawPromotion;
use scraper::Html;
use std::collections::HashSet;

pub struct JumboParser;

impl PromotionParser for JumboParser {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError> {
        let document = Html::parse_document(html);

        let card_sel = selector("li[class^='jumboargentinaio-store-theme-']")?;
        let logo_sel = selector("img")?;
        let discount_sel = selector("h4")?;
        let detail_sel = selector("h6")?;
        let info_sel = selector("p[class^='jumboargentinaio-store-theme']")?;

        let mut cards = 0;
        let mut seen = HashSet::new();
        let mut promotions = Vec::new();
        for card in document.select(&card_sel) {
            cards += 1;
            let logo = first_attr(card, &logo_sel, "src");
            let discount = first_text(card, &discount_sel);
            let detail = first_text(card, &detail_sel);
            // cap and days are printed together in this line
            let info = first_text(card, &info_sel);

            if !seen.insert((logo.clone(), discount.clone(), detail.clone(), info.clone())) {
                continue;
            }

            promotions.push(RawPromotion {
                payment_method: String::new(),
                discount,
                cap: if info.to_lowercase().contains("tope") { info.clone() } else { String::new() },
                applies_to: None,
                details: format!("{} {}", detail, info).trim().to_string(),
                legal: String::new(),
                logo,
            });
        }

        if cards == 0 {
            return Err(ParserError::NoCards);
        }
        Ok(promotions)
    }
}
