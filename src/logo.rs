// Recognises a payment method from its logo image
use crate::fetch::Scraper;
use crate::model::MerchantPromotionSet;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Maps the SHA-256 of a logo image to the payment method it stands for.
/// Image hashes are cached per URL for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct LogoRegistry {
    known: HashMap<String, String>,
    hashes: HashMap<String, String>,
}

impl LogoRegistry {
    pub fn new(known: HashMap<String, String>) -> Self {
        Self {
            known,
            hashes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    async fn hash_of<S: Scraper + ?Sized>(&mut self, scraper: &S, url: &str) -> Option<String> {
        if url.is_empty() {
            return None;
        }
        if let Some(hash) = self.hashes.get(url) {
            return Some(hash.clone());
        }
        match scraper.fetch_bytes(url).await {
            Ok(bytes) => {
                let hash = hash_bytes(&bytes);
                self.hashes.insert(url.to_string(), hash.clone());
                Some(hash)
            }
            Err(e) => {
                warn!("Cannot fetch logo {}: {}", url, e);
                None
            }
        }
    }

    /// Payment method of a known logo.
    pub async fn infer<S: Scraper + ?Sized>(&mut self, scraper: &S, url: &str) -> Option<String> {
        let hash = self.hash_of(scraper, url).await?;
        self.known.get(&hash).cloned()
    }

    /// Remembers the logo of a payment method. The first mapping of a hash wins.
    /// Returns the hash when it was not known before.
    pub async fn register<S: Scraper + ?Sized>(
        &mut self,
        scraper: &S,
        url: &str,
        payment_method: &str,
    ) -> Option<String> {
        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return None;
        }
        let hash = self.hash_of(scraper, url).await?;
        if self.known.contains_key(&hash) {
            return None;
        }
        debug!("New logo {} for {}", hash, payment_method);
        self.known.insert(hash.clone(), payment_method.to_string());
        Some(hash)
    }

    /// Registers every stored promotion that carries both a logo and a payment method.
    /// Returns the new (hash, payment method) pairs.
    pub async fn learn_from<S: Scraper + ?Sized>(
        &mut self,
        scraper: &S,
        sets: &[MerchantPromotionSet],
    ) -> Vec<(String, String)> {
        let mut learned = Vec::new();
        for promo in sets.iter().flat_map(|set| set.promotions.iter()) {
            if promo.logo_url.is_empty() {
                continue;
            }
            if let Some(hash) = self.register(scraper, &promo.logo_url, &promo.payment_method).await {
                learned.push((hash, promo.payment_method.trim().to_string()));
            }
        }
        learned
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{PromotionRecord, ScrapeRequest, ScraperError};
    use crate::weekday::DaySet;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed pages and images from memory.
    #[derive(Default)]
    pub struct FakeScraper {
        pub pages: HashMap<String, String>,
        pub images: HashMap<String, Vec<u8>>,
        pub image_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Scraper for FakeScraper {
        async fn fetch(&self, req: &ScrapeRequest) -> Result<String, ScraperError> {
            self.pages.get(&req.url).cloned().ok_or(ScraperError::InvalidResponse(404))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            self.images.get(url).cloned().ok_or(ScraperError::InvalidResponse(404))
        }
    }

    fn scraper() -> FakeScraper {
        let mut fake = FakeScraper::default();
        fake.images.insert("https://a/galicia.png".into(), b"galicia".to_vec());
        fake.images.insert("https://b/galicia-copy.png".into(), b"galicia".to_vec());
        fake.images.insert("https://a/prex.png".into(), b"prex".to_vec());
        fake
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_register_then_infer_by_content() {
        let fake = scraper();
        let mut registry = LogoRegistry::default();
        assert_eq!(registry.infer(&fake, "https://a/galicia.png").await, None);

        let hash = registry.register(&fake, "https://a/galicia.png", "Banco Galicia").await;
        assert_eq!(hash, Some(hash_bytes(b"galicia")));
        // same bytes behind another address
        assert_eq!(
            registry.infer(&fake, "https://b/galicia-copy.png").await.as_deref(),
            Some("Banco Galicia")
        );
        assert_eq!(registry.register(&fake, "https://b/galicia-copy.png", "Otro").await, None);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_image_and_blank_inputs() {
        let fake = scraper();
        let mut registry = LogoRegistry::default();
        assert_eq!(registry.infer(&fake, "https://a/missing.png").await, None);
        assert_eq!(registry.infer(&fake, "").await, None);
        assert_eq!(registry.register(&fake, "https://a/prex.png", "  ").await, None);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_images_are_fetched_once_per_url() {
        let fake = scraper();
        let mut registry = LogoRegistry::default();
        registry.register(&fake, "https://a/prex.png", "Prex").await;
        registry.infer(&fake, "https://a/prex.png").await;
        registry.infer(&fake, "https://a/prex.png").await;
        assert_eq!(fake.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_learn_from_stored_promotions() {
        let fake = scraper();
        let promo = |method: &str, logo: &str| PromotionRecord {
            payment_method: method.into(),
            discount_text: String::new(),
            cap_text: String::new(),
            applies_to: None,
            details_text: String::new(),
            legal_text: String::new(),
            logo_url: logo.into(),
            days: DaySet::new(),
        };
        let sets = vec![MerchantPromotionSet {
            merchant: "coto".into(),
            promotions: vec![
                promo("Galicia", "https://a/galicia.png"),
                promo("Sin logo", ""),
                promo("Prex", "https://a/prex.png"),
                promo("Galicia 2", "https://b/galicia-copy.png"),
            ],
            updated_at: Utc::now(),
        }];

        let mut registry = LogoRegistry::default();
        let learned = registry.learn_from(&fake, &sets).await;
        let methods: Vec<&str> = learned.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(methods, vec!["Galicia", "Prex"]);
    }
}
