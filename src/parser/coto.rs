use crate::model::ParserError;
use crate::normalizer::collapse_whitespace;
use crate::parser::html::{absolute_url, element_text, first_attr, first_text, selector};
use crate::parser::PromotionParser;
use crate::validation::RawPromotion;
use scraper::Html;

const BASE_URL: &str = "https://www.coto.com.ar";
const LEGAL_URL: &str = "https://www.coto.com.ar/legales/";

pub struct CotoParser;

impl PromotionParser for CotoParser {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError> {
        let document = Html::parse_document(html);

        let card_sel = selector("#discounts li")?;
        let day_sel = selector("p.alt-font.text-medium-gray.text-small")?;
        let discount_sel = selector("p.line-height-normal.font-weight-700")?;
        let description_sel = selector("p.line-height-normal.font-weight-600")?;
        let logo_sel = selector("img")?;
        let note_sel = selector("div.alt-font.text-medium-gray.text-extra-small")?;

        let mut promotions = Vec::new();
        for card in document.select(&card_sel) {
            let day = first_text(card, &day_sel);
            let description: Vec<String> = card.select(&description_sel).map(element_text).collect();
            let mut details = collapse_whitespace(&format!("{} {}", day, description.join(" ")));

            // the small print is either the cap or extra conditions
            let note = first_text(card, &note_sel);
            let mut cap = String::new();
            if note.contains("Tope") || note.contains("tope") || note.contains("Reintegro") {
                cap = note;
            } else if !note.is_empty() {
                details = format!("{} {}", details, note).trim().to_string();
            }

            promotions.push(RawPromotion {
                payment_method: String::new(),
                discount: first_text(card, &discount_sel),
                cap,
                applies_to: None,
                details,
                legal: LEGAL_URL.to_string(),
                logo: absolute_url(BASE_URL, &first_attr(card, &logo_sel, "src")),
            });
        }

        if promotions.is_empty() {
            return Err(ParserError::NoCards);
        }
        Ok(promotions)
    }
}
