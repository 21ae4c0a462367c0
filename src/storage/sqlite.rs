use crate::model::{MerchantPromotionSet, PromotionRecord, StorageError};
use crate::utils::merchant_key;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use tracing::warn;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and creates the tables if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS promotions (
                merchant TEXT PRIMARY KEY,
                promotions TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS logo_map (
                hash TEXT PRIMARY KEY,
                payment_method TEXT NOT NULL
            );
            "
        )?;
        Ok(Self { conn })
    }

    /// Replaces everything stored for the merchant.
    pub fn save_promotions(&self, merchant: &str, promotions: &[PromotionRecord]) -> Result<(), StorageError> {
        self.save_promotions_at(merchant, promotions, Utc::now())
    }

    pub fn save_promotions_at(
        &self,
        merchant: &str,
        promotions: &[PromotionRecord],
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(promotions)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO promotions (merchant, promotions, updated_at) VALUES (?1, ?2, ?3)",
            params![merchant_key(merchant), json, updated_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Overwrites only an already stored merchant. Returns false when it is unknown.
    pub fn update_promotions(&self, merchant: &str, promotions: &[PromotionRecord]) -> Result<bool, StorageError> {
        if !self.exists(merchant)? {
            warn!("Cannot update '{}': not stored yet", merchant);
            return Ok(false);
        }
        self.save_promotions(merchant, promotions)?;
        Ok(true)
    }

    pub fn exists(&self, merchant: &str) -> Result<bool, StorageError> {
        let mut stmt = self.conn.prepare("SELECT 1 FROM promotions WHERE merchant = ?1")?;
        let mut rows = stmt.query(params![merchant_key(merchant)])?;
        Ok(rows.next()?.is_some())
    }

    pub fn get_promotions(&self, merchant: &str) -> Result<Option<MerchantPromotionSet>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT merchant, promotions, updated_at FROM promotions WHERE merchant = ?1",
        )?;
        let mut rows = stmt.query(params![merchant_key(merchant)])?;
        if let Some(row) = rows.next()? {
            let (merchant, json, updated_at): (String, String, String) = (row.get(0)?, row.get(1)?, row.get(2)?);
            Ok(Some(Self::map_set(merchant, &json, &updated_at)?))
        } else {
            Ok(None)
        }
    }

    /// Every stored merchant, ordered by key. Rows that fail to parse are skipped.
    pub fn get_all_promotions(&self) -> Result<Vec<MerchantPromotionSet>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT merchant, promotions, updated_at FROM promotions ORDER BY merchant ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut sets = Vec::new();
        for row in rows {
            let (merchant, json, updated_at) = row?;
            match Self::map_set(merchant.clone(), &json, &updated_at) {
                Ok(set) => sets.push(set),
                Err(e) => warn!("Skipping stored promotions of '{}': {}", merchant, e),
            }
        }
        Ok(sets)
    }

    /// Stores a logo hash unless it is already known. Returns true when it was new.
    pub fn save_logo_hash(&self, hash: &str, payment_method: &str) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO logo_map (hash, payment_method) VALUES (?1, ?2)",
            params![hash, payment_method],
        )?;
        Ok(changed > 0)
    }

    pub fn get_logo_map(&self) -> Result<HashMap<String, String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT hash, payment_method FROM logo_map")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut map = HashMap::new();
        for row in rows {
            let (hash, payment_method) = row?;
            map.insert(hash, payment_method);
        }
        Ok(map)
    }

    fn map_set(merchant: String, json: &str, updated_at: &str) -> Result<MerchantPromotionSet, StorageError> {
        let promotions: Vec<PromotionRecord> = serde_json::from_str(json)?;
        let updated_at: DateTime<Utc> = updated_at.parse()?;
        Ok(MerchantPromotionSet {
            merchant,
            promotions,
            updated_at,
        })
    }

    #[cfg(test)]
    fn raw_insert(&self, merchant: &str, json: &str, updated_at: &str) {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO promotions (merchant, promotions, updated_at) VALUES (?1, ?2, ?3)",
                params![merchant, json, updated_at],
            )
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::{DaySet, Weekday};
    use chrono::TimeZone;

    fn promo(method: &str) -> PromotionRecord {
        PromotionRecord {
            payment_method: method.into(),
            discount_text: "20% Dto".into(),
            cap_text: "Tope $5.000".into(),
            applies_to: None,
            details_text: "Los jueves".into(),
            legal_text: String::new(),
            logo_url: String::new(),
            days: [Weekday::Thursday].into_iter().collect::<DaySet>(),
        }
    }

    #[test]
    fn test_save_and_get_roundtrip_with_timestamp() {
        let storage = SqliteStorage::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
        storage.save_promotions_at("Carrefour", &[promo("Galicia")], at).unwrap();

        let set = storage.get_promotions("CARREFOUR").unwrap().unwrap();
        assert_eq!(set.merchant, "carrefour");
        assert_eq!(set.updated_at, at);
        assert_eq!(set.promotions, vec![promo("Galicia")]);
        assert!(storage.get_promotions("dia").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_whole_set() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.save_promotions("dia", &[promo("Prex"), promo("MODO")]).unwrap();
        storage.save_promotions("dia", &[promo("Cuenta DNI")]).unwrap();
        let set = storage.get_promotions("dia").unwrap().unwrap();
        assert_eq!(set.promotions.len(), 1);
        assert_eq!(set.promotions[0].payment_method, "Cuenta DNI");
    }

    #[test]
    fn test_update_only_existing() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(!storage.update_promotions("coto", &[promo("Prex")]).unwrap());
        assert!(!storage.exists("coto").unwrap());

        storage.save_promotions("coto", &[]).unwrap();
        assert!(storage.update_promotions("Coto", &[promo("Prex")]).unwrap());
        assert_eq!(storage.get_promotions("coto").unwrap().unwrap().promotions.len(), 1);
    }

    #[test]
    fn test_get_all_sorted_and_skips_broken_rows() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.save_promotions("jumbo", &[promo("Galicia")]).unwrap();
        storage.save_promotions("coto", &[promo("Prex")]).unwrap();
        storage.raw_insert("dia", "{not json", "2025-03-03T12:00:00+00:00");
        storage.raw_insert("cordiez", "[]", "yesterday");

        let merchants: Vec<String> = storage
            .get_all_promotions()
            .unwrap()
            .into_iter()
            .map(|s| s.merchant)
            .collect();
        assert_eq!(merchants, vec!["coto", "jumbo"]);
    }

    #[test]
    fn test_logo_map_keeps_first_mapping() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.save_logo_hash("abc", "Galicia").unwrap());
        assert!(!storage.save_logo_hash("abc", "Prex").unwrap());
        assert!(storage.save_logo_hash("def", "MODO").unwrap());

        let map = storage.get_logo_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("abc").map(String::as_str), Some("Galicia"));
    }
}
