//! Core data models for the proxy.
//!
//! These types mirror the two wire shapes the proxy deals in: the records
//! the upstream search API returns, and the enriched rows and hash groups
//! the proxy hands back to its own callers.

use serde::{Deserialize, Serialize};

/// One raw search hit as returned by the upstream JSON API.
///
/// `href` is a relative link into the upstream archive and `ts` is epoch
/// milliseconds. `description` is part of the wire shape but the upstream
/// service never populates it; the proxy attaches descriptions from the
/// local catalog during normalization instead.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawRecord {
    pub ext: String,
    pub family: String,
    pub filename: String,
    pub formatid: String,
    pub hash: String,
    pub href: String,
    pub itemid: i64,
    pub size: i64,
    pub ts: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A [`RawRecord`] after normalization: absolute `href`, derived `parent`
/// folder label, and the catalog description for its hash (if any).
///
/// `description` is omitted from the serialized output when absent rather
/// than emitted as `null`, matching what result consumers expect.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedRecord {
    pub ext: String,
    pub family: String,
    pub filename: String,
    pub formatid: String,
    pub hash: String,
    pub href: String,
    pub itemid: i64,
    pub size: i64,
    pub ts: i64,
    pub parent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Aggregate summary of all records sharing one content hash.
///
/// `size`, `ext`, `family` and `formatid` are seeded from the first record
/// seen for the hash and never revisited; `first_date`/`last_date` track
/// the minimum and maximum timestamp across all entries. `entries` holds
/// every constituent record in arrival order and is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub filenames: Vec<String>,
    pub family: String,
    pub formatid: String,
    pub hash: String,
    pub ext: String,
    pub size: i64,
    #[serde(rename = "firstDate")]
    pub first_date: i64,
    #[serde(rename = "lastDate")]
    pub last_date: i64,
    pub entries: Vec<NormalizedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which shape the envelope's `data` array carries.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultKind {
    Single,
    Grouped,
}

/// The outward response envelope.
///
/// `count` is the exact number of hash groups for grouped queries and the
/// extracted upstream total for single queries, `null` when the total
/// could not be recovered. Callers must treat `null` as distinct from zero.
#[derive(Debug, Serialize)]
pub struct SearchEnvelope<T: Serialize> {
    pub data: Vec<T>,
    pub count: Option<u64>,
    #[serde(rename = "type")]
    pub kind: ResultKind,
}
