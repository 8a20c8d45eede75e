//! scc JSON report decoding

use crate::domain::entities::LanguageRecordIn;

/// Decode an scc `-f json` report into per-language rows.
///
/// scc prints `null` instead of `[]` for a tree with no recognised files;
/// both decode to an empty list.
pub fn decode_report(raw: &[u8]) -> Result<Vec<LanguageRecordIn>, serde_json::Error> {
    let rows: Option<Vec<LanguageRecordIn>> = serde_json::from_slice(raw)?;
    Ok(rows.unwrap_or_default())
}
