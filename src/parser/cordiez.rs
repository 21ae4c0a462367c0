use crate::model::ParserError;
use crate::parser::html::{element_text, first_text, selector};
use crate::parser::PromotionParser;
use crate::validation::RawPromotion;
use scraper::Html;
use std::collections::HashSet;

const LEGAL_URL: &str = "https://www.cordiez.com.ar/terminos-y-condiciones";

pub struct CordiezParser;

impl PromotionParser for CordiezParser {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError> {
        let document = Html::parse_document(html);

        let card_sel = selector("#prom-banc_dias_body .prom-banc_dias_body_item .promo-banca-box__content")?;
        let method_sel = selector(".promo-banca-box__imgtitle")?;
        let number_sel = selector(".promo-banca-box__title-num")?;
        let text_sel = selector(".promo-banca-box__title-text_inner")?;
        let summary_sel = selector(".promo-banca-box__bajada")?;

        let mut cards = 0;
        let mut seen = HashSet::new();
        let mut promotions = Vec::new();
        for card in document.select(&card_sel) {
            cards += 1;
            let payment_method = first_text(card, &method_sel);
            let discount = format!("{} {}", first_text(card, &number_sel), first_text(card, &text_sel))
                .trim()
                .to_string();
            let details = card
                .select(&summary_sel)
                .map(element_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let cap = if details.to_lowercase().contains("tope") { details.clone() } else { String::new() };

            // the same promotion is listed under every day it applies
            if !seen.insert((payment_method.clone(), discount.clone(), cap.clone())) {
                continue;
            }

            promotions.push(RawPromotion {
                payment_method,
                discount,
                cap,
                applies_to: None,
                details,
                legal: LEGAL_URL.to_string(),
                logo: String::new(),
            });
        }

        if cards == 0 {
            return Err(ParserError::NoCards);
        }
        Ok(promotions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(method: &str, num: &str, summary: &str) -> String {
        format!(
            r#"<div class="promo-banca-box__content">
                 <span class="promo-banca-box__imgtitle">{}</span>
                 <span class="promo-banca-box__title-num">{}</span>
                 <span class="promo-banca-box__title-text"><span class="promo-banca-box__title-text_inner">de descuento</span></span>
                 <p class="promo-banca-box__bajada">{}</p>
                 <p class="promo-banca-box__bajada"> </p>
               </div>"#,
            method, num, summary
        )
    }

    #[test]
    fn test_parses_and_dedupes_across_days() {
        let naranja = card("Naranja X", "20%", "Los martes. Tope $6.000");
        let page = format!(
            r#"<div id="prom-banc_dias_body">
                 <div class="prom-banc_dias_body_item">{}{}</div>
                 <div class="prom-banc_dias_body_item">{}</div>
               </div>"#,
            naranja,
            card("Cuenta DNI", "10%", "Todos los días"),
            naranja
        );
        let promos = CordiezParser.parse(&page).unwrap();
        assert_eq!(promos.len(), 2);

        assert_eq!(promos[0].payment_method, "Naranja X");
        assert_eq!(promos[0].discount, "20% de descuento");
        assert_eq!(promos[0].details, "Los martes. Tope $6.000");
        assert_eq!(promos[0].cap, "Los martes. Tope $6.000");
        assert_eq!(promos[0].legal, LEGAL_URL);

        assert_eq!(promos[1].payment_method, "Cuenta DNI");
        assert_eq!(promos[1].cap, "");
    }
}
