// One HTML parsing strategy per merchant site
pub mod carrefour;
pub mod cordiez;
pub mod coto;
pub mod dia;
pub mod html;
pub mod jumbo;

use crate::model::ParserError;
use crate::validation::RawPromotion;
use serde::Deserialize;

pub use carrefour::CarrefourParser;
pub use cordiez::CordiezParser;
pub use coto::CotoParser;
pub use dia::DiaParser;
pub use jumbo::JumboParser;

pub trait PromotionParser: Send + Sync {
    fn parse(&self, html: &str) -> Result<Vec<RawPromotion>, ParserError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Carrefour,
    Dia,
    Jumbo,
    Coto,
    Cordiez,
}

pub fn parser_for(site: Site) -> Box<dyn PromotionParser> {
    match site {
        Site::Carrefour => Box::new(CarrefourParser),
        Site::Dia => Box::new(DiaParser),
        Site::Jumbo => Box::new(JumboParser),
        Site::Coto => Box::new(CotoParser),
        Site::Cordiez => Box::new(CordiezParser),
    }
}
