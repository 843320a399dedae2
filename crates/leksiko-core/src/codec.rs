//! Snapshot wire format: gzip-compressed UTF-8 JSON.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::Snapshot;

/// Decompress, parse and validate one snapshot.
///
/// Either a complete [`Snapshot`] comes back or nothing does.
pub fn decode(compressed: &[u8]) -> Result<Snapshot> {
    let mut text = String::new();
    GzDecoder::new(compressed)
        .read_to_string(&mut text)
        .map_err(Error::Decompress)?;

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| Error::malformed("document", format!("is not valid JSON: {e}")))?;
    validate(&value)?;

    serde_path_to_error::deserialize(value)
        .map_err(|e| Error::malformed(e.path().to_string(), e.inner().to_string()))
}

/// Compress a snapshot into the same format [`decode`] reads
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(snapshot)
        .map_err(|e| Error::malformed("document", format!("cannot be serialized: {e}")))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).map_err(Error::Decompress)?;
    encoder.finish().map_err(Error::Decompress)
}

fn require_array(dict: &Map<String, Value>, field: &str) -> Result<()> {
    match dict.get(field) {
        Some(Value::Array(_)) => Ok(()),
        _ => Err(Error::malformed(field, "is not an array")),
    }
}

fn validate(value: &Value) -> Result<()> {
    let dict = value
        .as_object()
        .ok_or_else(|| Error::malformed("document", "is not an object"))?;

    require_array(dict, "lemmas")?;
    require_array(dict, "words")?;

    if !matches!(dict.get("pos_lemma_index"), Some(Value::Object(_))) {
        return Err(Error::malformed("pos_lemma_index", "is not an object"));
    }

    // optional so snapshots from before word cards still load
    if dict.contains_key("word_cards") {
        require_array(dict, "word_cards")?;
    }

    Ok(())
}
