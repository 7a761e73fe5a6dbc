use std::time::Instant;

use redis::aio::ConnectionManager;
use tracing::debug;

use crate::common::DatabaseError;

/// `PING` the server; anything other than `PONG` is a failure.
pub async fn check_health(conn: &mut ConnectionManager) -> Result<(), DatabaseError> {
    debug!("Running Redis health check");

    let response: String = redis::cmd("PING")
        .query_async(conn)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("Redis PING failed: {e}")))?;

    if response != "PONG" {
        return Err(DatabaseError::HealthCheckFailed(format!(
            "Redis PING returned unexpected response: {response}"
        )));
    }

    Ok(())
}

/// Verify that the server has the modules a hotel store relies on
/// (RediSearch for the vector index, RedisJSON for documents).
pub async fn check_modules(
    conn: &mut ConnectionManager,
    required: &[&str],
) -> Result<(), DatabaseError> {
    let reply: redis::Value = redis::cmd("MODULE")
        .arg("LIST")
        .query_async(conn)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("MODULE LIST failed: {e}")))?;

    let loaded = module_names(&reply);
    debug!(modules = ?loaded, "Redis modules loaded");

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|want| !loaded.iter().any(|have| have.eq_ignore_ascii_case(want)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::HealthCheckFailed(format!(
            "Redis is missing required modules: {}",
            missing.join(", ")
        )))
    }
}

/// Pull module names out of a `MODULE LIST` reply (RESP2 arrays or RESP3 maps).
fn module_names(reply: &redis::Value) -> Vec<String> {
    use redis::Value;

    fn text(value: &Value) -> Option<String> {
        match value {
            Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Value::SimpleString(s) => Some(s.clone()),
            _ => None,
        }
    }

    let Value::Array(entries) = reply else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Array(fields) => fields
                .chunks(2)
                .find(|pair| text(&pair[0]).as_deref() == Some("name"))
                .and_then(|pair| pair.get(1).and_then(text)),
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| text(k).as_deref() == Some("name"))
                .and_then(|(_, v)| text(v)),
            _ => None,
        })
        .collect()
}

/// Outcome of a timed health check
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

/// [`check_health`] that never fails, reporting latency instead.
pub async fn check_health_detailed(conn: &mut ConnectionManager) -> HealthStatus {
    let start = Instant::now();
    let result = check_health(conn).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthStatus::healthy(elapsed),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::Value;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_health_status_constructors() {
        let ok = HealthStatus::healthy(3);
        assert!(ok.healthy);
        assert!(ok.message.is_none());

        let bad = HealthStatus::unhealthy("timeout".into(), 5000);
        assert!(!bad.healthy);
        assert_eq!(bad.message.as_deref(), Some("timeout"));
        assert_eq!(bad.response_time_ms, 5000);
    }

    #[test]
    fn test_module_names_resp2() {
        let reply = Value::Array(vec![
            Value::Array(vec![bulk("name"), bulk("search"), bulk("ver"), Value::Int(21005)]),
            Value::Array(vec![bulk("name"), bulk("ReJSON"), bulk("ver"), Value::Int(20609)]),
        ]);
        assert_eq!(module_names(&reply), vec!["search", "ReJSON"]);
    }

    #[test]
    fn test_module_names_resp3() {
        let reply = Value::Array(vec![Value::Map(vec![
            (Value::SimpleString("name".into()), bulk("search")),
            (Value::SimpleString("ver".into()), Value::Int(21005)),
        ])]);
        assert_eq!(module_names(&reply), vec!["search"]);
    }

    #[test]
    fn test_module_names_unexpected_reply() {
        assert!(module_names(&Value::Nil).is_empty());
    }
}
