use crate::fetch::traits::Scraper;
use crate::model::{ScrapeRequest, ScraperError};

use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) PromoSniperBot/0.1";

#[derive(Clone)]
pub struct ScraperImpl {
    client: Client,
}

impl ScraperImpl {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<Response, ScraperError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest)?;

        if !response.status().is_success() {
            return Err(ScraperError::InvalidResponse(response.status().as_u16()));
        }
        Ok(response)
    }
}

fn map_reqwest(e: reqwest::Error) -> ScraperError {
    if e.is_timeout() {
        ScraperError::Timeout
    } else {
        ScraperError::HttpError(e.to_string())
    }
}

#[async_trait::async_trait]
impl Scraper for ScraperImpl {
    async fn fetch(&self, req: &ScrapeRequest) -> Result<String, ScraperError> {
        debug!("Fetching page of {}", req.merchant);
        let response = self.get(&req.url).await?;
        response.text().await.map_err(map_reqwest)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(map_reqwest)?;
        Ok(bytes.to_vec())
    }
}
