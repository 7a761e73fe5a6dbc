use async_trait::async_trait;
use database::redis::ConnectionManager;

use super::reply::{decode_document, text};
use crate::error::{HotelError, HotelResult};
use crate::models::{CreateHotel, Hotel, HotelId, UpdateHotel};
use crate::repository::HotelRepository;

const SCAN_BATCH: usize = 200;

/// Hotels stored as RedisJSON documents under `{key_prefix}{id}`.
#[derive(Clone)]
pub struct RedisHotelRepository {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisHotelRepository {
    pub fn new(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, id: &HotelId) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// Write the whole document, including its embedding.
    pub async fn save(&self, hotel: &Hotel) -> HotelResult<()> {
        let document = serde_json::to_string(hotel)
            .map_err(|e| HotelError::Internal(format!("failed to encode hotel: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = redis::cmd("JSON.SET")
            .arg(self.key(&hotel.id))
            .arg("$")
            .arg(document)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn keys(&self) -> HotelResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(store_error)?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

fn store_error(err: redis::RedisError) -> HotelError {
    HotelError::Store(err.to_string())
}

#[async_trait]
impl HotelRepository for RedisHotelRepository {
    async fn create(&self, input: CreateHotel, embedding: Vec<f32>) -> HotelResult<Hotel> {
        let hotel = Hotel::new(HotelId::generate(), input, embedding);
        self.save(&hotel).await?;

        tracing::info!(hotel_id = %hotel.id, "Created hotel");
        Ok(hotel)
    }

    async fn get_by_id(&self, id: &HotelId) -> HotelResult<Option<Hotel>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(self.key(id))
            .arg("$")
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;

        raw.as_deref().map(decode_document).transpose()
    }

    async fn update(
        &self,
        id: &HotelId,
        input: UpdateHotel,
        embedding: Option<Vec<f32>>,
    ) -> HotelResult<Hotel> {
        let mut hotel = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| HotelError::NotFound(id.clone()))?;

        hotel.apply_update(input, embedding);
        self.save(&hotel).await?;

        tracing::info!(hotel_id = %id, "Updated hotel");
        Ok(hotel)
    }

    async fn delete(&self, id: &HotelId) -> HotelResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;

        if removed > 0 {
            tracing::info!(hotel_id = %id, "Deleted hotel");
        }
        Ok(removed > 0)
    }

    async fn list_all(&self) -> HotelResult<Vec<Hotel>> {
        let keys = self.keys().await?;
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn.clone();
        let mut hotels = Vec::with_capacity(keys.len());

        for chunk in keys.chunks(SCAN_BATCH) {
            let reply: redis::Value = redis::cmd("JSON.MGET")
                .arg(chunk)
                .arg("$")
                .query_async(&mut conn)
                .await
                .map_err(store_error)?;

            let redis::Value::Array(documents) = reply else {
                return Err(HotelError::Store("unexpected JSON.MGET reply".to_string()));
            };

            for (key, document) in chunk.iter().zip(documents.iter()) {
                // Deleted between SCAN and MGET
                let Some(raw) = text(document) else {
                    continue;
                };
                match decode_document(&raw) {
                    Ok(hotel) => hotels.push(hotel),
                    Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable hotel"),
                }
            }
        }

        hotels.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(hotels)
    }

    async fn count(&self) -> HotelResult<usize> {
        Ok(self.keys().await?.len())
    }
}
