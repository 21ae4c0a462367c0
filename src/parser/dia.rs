use crate::model::{AppliesTo, ParserError};
use crate::parser::html::{first_attr, first_text, selector, text_lines_excluding};
use crate::parser::PromotionParser;
use crate::validation::RawPromotion;
use scraper::Html;

pub struct DiaParser;

fn applies_to(lines: &[String]) -> &'static str {
    let online = lines.iter().any(|l| l == "APLICA ONLINE");
    let store = lines.iter().any(|l| l == "APLICA TIENDA");
    match (online, store) {
        (true, false) => "online",
        (false, true) => "tienda",
        _ => "online y tienda",
    }
}

impl PromotionParser for DiaParser {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError> {
        let document = Html::parse_document(html);

        let card_sel = selector(".diaio-custom-bank-promotions-0-x-list-by-days__item")?;
        let logo_sel = selector("img.diaio-custom-bank-promotions-0-x-list-by-days__img-logo")?;
        let legal_sel = selector(".diaio-custom-bank-promotions-0-x-bank-modal__text")?;

        let mut promotions = Vec::new();
        for card in document.select(&card_sel) {
            let legal = first_text(card, &legal_sel);
            // the legal modal is rendered inside the card
            let lines = text_lines_excluding(card, &legal_sel);

            let discount = lines
                .iter()
                .find(|l| l.contains('%') || l.to_lowercase().contains("cuotas"))
                .cloned()
                .unwrap_or_default();
            let cap = lines
                .iter()
                .find(|l| l.contains("Tope") || l.contains("Sin mínimo"))
                .cloned()
                .unwrap_or_default();

            promotions.push(RawPromotion {
                payment_method: String::new(),
                discount,
                cap,
                applies_to: Some(AppliesTo::One(applies_to(&lines).to_string())),
                details: lines.join(" "),
                legal,
                logo: first_attr(card, &logo_sel, "src"),
            });
        }

        if promotions.is_empty() {
            return Err(ParserError::NoCards);
        }
        Ok(promotions)
    }
}
