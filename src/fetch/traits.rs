use crate::model::{ScrapeRequest, ScraperError};

#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// Downloads the promotions page of one merchant.
    async fn fetch(&self, req: &ScrapeRequest) -> Result<String, ScraperError>;

    /// Downloads raw bytes, used for logo images.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError>;
}
