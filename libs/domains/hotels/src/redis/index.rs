use async_trait::async_trait;
use database::redis::ConnectionManager;

use super::reply::{parse_search_reply, vector_blob};
use crate::config::VectorIndexConfig;
use crate::error::{HotelError, HotelResult};
use crate::models::Neighbor;
use crate::search::SimilaritySearch;

/// RediSearch HNSW index over the `$.embedding` field of hotel documents.
#[derive(Clone)]
pub struct RedisVectorIndex {
    conn: ConnectionManager,
    config: VectorIndexConfig,
}

impl RedisVectorIndex {
    pub fn new(conn: ConnectionManager, config: VectorIndexConfig) -> Self {
        Self { conn, config }
    }

    /// Whether the index is present on the server.
    pub async fn exists(&self) -> HotelResult<bool> {
        let mut conn = self.conn.clone();
        let result: Result<redis::Value, redis::RedisError> = redis::cmd("FT.INFO")
            .arg(&self.config.index_name)
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unknown_index(&e) => Ok(false),
            Err(e) => Err(HotelError::Query(e.to_string())),
        }
    }

    /// Drop the index, leaving the documents in place.
    pub async fn drop_index(&self) -> HotelResult<()> {
        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = redis::cmd("FT.DROPINDEX")
            .arg(&self.config.index_name)
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if is_unknown_index(&e) => Ok(()),
            Err(e) => Err(HotelError::Query(e.to_string())),
        }
    }
}

/// Arguments of `FT.CREATE` after the command name.
fn create_args(config: &VectorIndexConfig) -> Vec<String> {
    [
        config.index_name.as_str(),
        "ON",
        "JSON",
        "PREFIX",
        "1",
        config.key_prefix.as_str(),
        "SCHEMA",
        "$.name",
        "AS",
        "name",
        "TEXT",
        "$.address",
        "AS",
        "address",
        "TEXT",
        "$.rating",
        "AS",
        "rating",
        "TAG",
        "$.embedding",
        "AS",
        "embedding",
        "VECTOR",
        "HNSW",
        "6",
        "TYPE",
        "FLOAT32",
        "DIM",
    ]
    .into_iter()
    .map(str::to_string)
    .chain([
        config.dimension.to_string(),
        "DISTANCE_METRIC".to_string(),
        config.metric.to_string(),
    ])
    .collect()
}

fn is_unknown_index(err: &redis::RedisError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unknown index") || message.contains("no such index")
}

#[async_trait]
impl SimilaritySearch for RedisVectorIndex {
    async fn ensure_index(&self) -> HotelResult<()> {
        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = redis::cmd("FT.CREATE")
            .arg(create_args(&self.config))
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    index = %self.config.index_name,
                    dimension = self.config.dimension,
                    "Created vector index"
                );
                Ok(())
            }
            Err(e) if e.to_string().to_lowercase().contains("index already exists") => {
                tracing::debug!(index = %self.config.index_name, "Vector index already exists");
                Ok(())
            }
            Err(e) => Err(HotelError::Query(format!(
                "failed to create index {}: {}",
                self.config.index_name, e
            ))),
        }
    }

    async fn knn(&self, vector: &[f32], k: usize) -> HotelResult<Vec<Neighbor>> {
        if vector.len() != self.config.dimension {
            return Err(HotelError::Validation(format!(
                "query vector has dimension {}, index expects {}",
                vector.len(),
                self.config.dimension
            )));
        }
        if k == 0 {
            return Ok(vec![]);
        }

        let mut conn = self.conn.clone();
        let reply: redis::Value = redis::cmd("FT.SEARCH")
            .arg(&self.config.index_name)
            .arg("*=>[KNN $k @embedding $vec AS score]")
            .arg("PARAMS")
            .arg(4)
            .arg("k")
            .arg(k)
            .arg("vec")
            .arg(vector_blob(vector))
            .arg("SORTBY")
            .arg("score")
            .arg("ASC")
            .arg("RETURN")
            .arg(1)
            .arg("score")
            .arg("LIMIT")
            .arg(0)
            .arg(k)
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await
            .map_err(|e| HotelError::Query(e.to_string()))?;

        parse_search_reply(&reply, &self.config.key_prefix)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
