//! Decoding of RedisJSON and RediSearch replies.
//!
//! Handles both RESP2 (flat arrays) and RESP3 (maps) so the store works with
//! either protocol on the connection.

use redis::Value;

use crate::error::{HotelError, HotelResult};
use crate::models::{Hotel, HotelId, Neighbor};

pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Some(s.clone()),
        Value::VerbatimString { text, .. } => Some(text.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(d) => Some(d.to_string()),
        _ => None,
    }
}

/// Decode the payload of `JSON.GET key $`, which wraps the document in a
/// one-element array.
pub(crate) fn decode_document(raw: &str) -> HotelResult<Hotel> {
    let mut documents: Vec<Hotel> = serde_json::from_str(raw)
        .map_err(|e| HotelError::Store(format!("malformed hotel document: {}", e)))?;

    if documents.len() != 1 {
        return Err(HotelError::Store(format!(
            "expected one hotel document, got {}",
            documents.len()
        )));
    }
    Ok(documents.remove(0))
}

/// Parse `FT.SEARCH ... RETURN 1 score` into neighbors, stripping `key_prefix`
/// from the document keys.
pub(crate) fn parse_search_reply(reply: &Value, key_prefix: &str) -> HotelResult<Vec<Neighbor>> {
    match reply {
        Value::Array(items) => parse_resp2(items, key_prefix),
        Value::Map(pairs) => parse_resp3(pairs, key_prefix),
        other => Err(HotelError::Query(format!(
            "unexpected FT.SEARCH reply: {:?}",
            other
        ))),
    }
}

// [total, key, [field, value, ...], key, [...], ...]
fn parse_resp2(items: &[Value], key_prefix: &str) -> HotelResult<Vec<Neighbor>> {
    let Some((_total, rest)) = items.split_first() else {
        return Err(HotelError::Query("empty FT.SEARCH reply".to_string()));
    };

    rest.chunks(2)
        .map(|pair| {
            let key = text(&pair[0])
                .ok_or_else(|| HotelError::Query("FT.SEARCH result without a key".to_string()))?;
            let fields = match pair.get(1) {
                Some(Value::Array(fields)) => fields.as_slice(),
                _ => &[],
            };
            let score = fields
                .chunks(2)
                .find(|kv| text(&kv[0]).as_deref() == Some("score"))
                .and_then(|kv| kv.get(1))
                .and_then(text);
            neighbor(&key, score, key_prefix)
        })
        .collect()
}

// {total_results, results: [{id, extra_attributes: {score}}], ...}
fn parse_resp3(pairs: &[(Value, Value)], key_prefix: &str) -> HotelResult<Vec<Neighbor>> {
    let results = lookup(pairs, "results")
        .ok_or_else(|| HotelError::Query("FT.SEARCH reply without results".to_string()))?;

    let Value::Array(results) = results else {
        return Err(HotelError::Query("FT.SEARCH results is not an array".to_string()));
    };

    results
        .iter()
        .map(|result| {
            let Value::Map(fields) = result else {
                return Err(HotelError::Query("FT.SEARCH result is not a map".to_string()));
            };
            let key = lookup(fields, "id")
                .and_then(text)
                .ok_or_else(|| HotelError::Query("FT.SEARCH result without an id".to_string()))?;
            let score = match lookup(fields, "extra_attributes") {
                Some(Value::Map(attrs)) => lookup(attrs, "score").and_then(text),
                _ => None,
            };
            neighbor(&key, score, key_prefix)
        })
        .collect()
}

fn lookup<'a>(pairs: &'a [(Value, Value)], name: &str) -> Option<&'a Value> {
    pairs
        .iter()
        .find(|(k, _)| text(k).as_deref() == Some(name))
        .map(|(_, v)| v)
}

fn neighbor(key: &str, score: Option<String>, key_prefix: &str) -> HotelResult<Neighbor> {
    let score = score
        .ok_or_else(|| HotelError::Query(format!("no score for {}", key)))?
        .parse::<f32>()
        .map_err(|e| HotelError::Query(format!("bad score for {}: {}", key, e)))?;

    let id = key.strip_prefix(key_prefix).unwrap_or(key);
    Ok(Neighbor {
        id: HotelId::new(id),
        score,
    })
}

/// Encode a vector as the little-endian FLOAT32 blob RediSearch expects.
pub(crate) fn vector_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}
