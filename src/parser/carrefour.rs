use crate::model::{AppliesTo, ParserError};
use crate::parser::html::{absolute_url, first_attr, first_text, selector};
use crate::parser::PromotionParser;
use crate::validation::RawPromotion;
use scraper::Html;

const BASE_URL: &str = "https://www.carrefour.com.ar";

pub struct CarrefourParser;

/// Pulls the address out of an inline `background-image: url(...)` style.
fn style_url(style: &str) -> Option<String> {
    let start = style.find("url(")? + 4;
    let end = start + style[start..].find(')')?;
    let url = style[start..end].trim().trim_matches(|c| c == '"' || c == '\'');
    (!url.is_empty()).then(|| url.to_string())
}

impl PromotionParser for CarrefourParser {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError> {
        let document = Html::parse_document(html);

        let card_sel = selector(".valtech-carrefourar-bank-promotions-0-x-cardBox")?;
        let icon_sel = selector(
            "div.valtech-carrefourar-bank-promotions-0-x-iconItem div.valtech-carrefourar-bank-promotions-0-x-logoIcon",
        )?;
        let date_sel = selector(".valtech-carrefourar-bank-promotions-0-x-dateText")?;
        let logo_sel = selector("div.valtech-carrefourar-bank-promotions-0-x-ColRightCard img")?;
        let discount_sel = selector(".valtech-carrefourar-bank-promotions-0-x-ColRightTittle")?;
        let cap_sel = selector(".valtech-carrefourar-bank-promotions-0-x-ColRightText")?;
        let legal_sel = selector("div.valtech-carrefourar-bank-promotions-0-x-legalContent")?;

        let mut promotions = Vec::new();
        for card in document.select(&card_sel) {
            // icons show where the promotion applies
            let icons: Vec<String> = card
                .select(&icon_sel)
                .filter_map(|icon| icon.value().attr("style").and_then(style_url))
                .collect();

            promotions.push(RawPromotion {
                payment_method: String::new(),
                discount: first_text(card, &discount_sel),
                cap: first_text(card, &cap_sel),
                applies_to: (!icons.is_empty()).then_some(AppliesTo::Many(icons)),
                details: first_text(card, &date_sel),
                legal: first_text(card, &legal_sel),
                logo: absolute_url(BASE_URL, &first_attr(card, &logo_sel, "src")),
            });
        }

        if promotions.is_empty() {
            return Err(ParserError::NoCards);
        }
        Ok(promotions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <div class="valtech-carrefourar-bank-promotions-0-x-cardBox">
      <div class="valtech-carrefourar-bank-promotions-0-x-iconItem">
        <div class="valtech-carrefourar-bank-promotions-0-x-logoIcon" style="background-image: url('https://cdn.example/online.svg')"></div>
        <div class="valtech-carrefourar-bank-promotions-0-x-logoIcon" style="background-image: url(&quot;https://cdn.example/tienda.svg&quot;)"></div>
      </div>
      <p class="valtech-carrefourar-bank-promotions-0-x-dateText">Válido los miércoles</p>
      <div class="valtech-carrefourar-bank-promotions-0-x-ColRightCard">
        <img src="/arquivos/galicia.png">
        <span class="valtech-carrefourar-bank-promotions-0-x-ColRightTittle">25% Dto</span>
        <span class="valtech-carrefourar-bank-promotions-0-x-ColRightText">Tope $10.000</span>
      </div>
      <div class="valtech-carrefourar-bank-promotions-0-x-legalContent pa3">Promoción válida del 01/03 al 31/03.</div>
    </div>
    <div class="valtech-carrefourar-bank-promotions-0-x-cardBox">
      <span class="valtech-carrefourar-bank-promotions-0-x-ColRightTittle">6 cuotas sin interés</span>
    </div>"#;

    #[test]
    fn test_parses_cards() {
        let promos = CarrefourParser.parse(PAGE).unwrap();
        assert_eq!(promos.len(), 2);

        let first = &promos[0];
        assert_eq!(first.discount, "25% Dto");
        assert_eq!(first.cap, "Tope $10.000");
        assert_eq!(first.details, "Válido los miércoles");
        assert_eq!(first.logo, "https://www.carrefour.com.ar/arquivos/galicia.png");
        assert_eq!(first.legal, "Promoción válida del 01/03 al 31/03.");
        assert_eq!(
            first.applies_to,
            Some(AppliesTo::Many(vec![
                "https://cdn.example/online.svg".into(),
                "https://cdn.example/tienda.svg".into()
            ]))
        );

        assert_eq!(promos[1].logo, "");
        assert_eq!(promos[1].applies_to, None);
    }

    #[test]
    fn test_style_url() {
        assert_eq!(style_url("background: url( \"a.svg\" )"), Some("a.svg".into()));
        assert_eq!(style_url("color: red"), None);
        assert_eq!(style_url("url()"), None);
    }
}
