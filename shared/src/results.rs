use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved snapshot key used by the feed as an out-of-band status
/// channel rather than a real constituency. Never shown in the ticker.
pub const VERIFICATION_KEY: &str = "Verification";

/// A declared result for one constituency, as delivered by the feed.
///
/// Every field is defaulted: a record missing fields renders partially
/// (empty candidate, fallback color) instead of being dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The full live-results state: name key (raw or canonical, the feed's
/// choice) → declared result. Replaced wholesale on every update;
/// never patched incrementally.
pub type ResultSnapshot = HashMap<String, ResultRecord>;

/// Parse a snapshot payload (push message body or poll response body).
pub fn snapshot_from_json(json: &str) -> Result<ResultSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

/// One row of the declared-winners ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerEntry {
    pub constituency: String,
    pub candidate: String,
    pub party: String,
    pub color: String,
    pub timestamp: i64,
}

/// Project a snapshot into the ticker list: the sentinel entry is
/// excluded, rows sort by descending timestamp (missing timestamps are
/// 0 and therefore last), ties break by constituency name so the order
/// is stable across snapshot replacements.
pub fn ticker_entries(snapshot: &ResultSnapshot) -> Vec<TickerEntry> {
    let mut entries: Vec<TickerEntry> = snapshot
        .iter()
        .filter(|(name, _)| name.as_str() != VERIFICATION_KEY)
        .map(|(name, record)| TickerEntry {
            constituency: name.clone(),
            candidate: record.candidate.clone(),
            party: record.party.clone(),
            color: record.color.clone(),
            timestamp: record.timestamp,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.constituency.cmp(&b.constituency))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::{ResultSnapshot, snapshot_from_json, ticker_entries};

    fn snapshot(json: &str) -> ResultSnapshot {
        snapshot_from_json(json).expect("snapshot parses")
    }

    #[test]
    fn orders_by_descending_timestamp() {
        let snap = snapshot(
            r##"{
                "Dhaka-1": {"candidate": "A", "party": "P", "color": "#111111", "timestamp": 300},
                "Dhaka-2": {"candidate": "B", "party": "Q", "color": "#222222", "timestamp": 100},
                "Dhaka-3": {"candidate": "C", "party": "R", "color": "#333333", "timestamp": 200}
            }"##,
        );
        let order: Vec<i64> = ticker_entries(&snap).iter().map(|e| e.timestamp).collect();
        assert_eq!(order, vec![300, 200, 100]);
    }

    #[test]
    fn missing_timestamp_sorts_last() {
        let snap = snapshot(
            r##"{
                "Dhaka-1": {"candidate": "A", "party": "P", "color": "#111111"},
                "Dhaka-2": {"candidate": "B", "party": "Q", "color": "#222222", "timestamp": 50}
            }"##,
        );
        let entries = ticker_entries(&snap);
        assert_eq!(entries[0].constituency, "Dhaka-2");
        assert_eq!(entries[1].timestamp, 0);
    }

    #[test]
    fn verification_sentinel_is_always_excluded() {
        let snap = snapshot(
            r##"{
                "Verification": {"candidate": "sync", "party": "", "color": "", "timestamp": 9999},
                "Dhaka-1": {"candidate": "A", "party": "P", "color": "#111111", "timestamp": 1}
            }"##,
        );
        let entries = ticker_entries(&snap);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].constituency, "Dhaka-1");
    }

    #[test]
    fn sentinel_only_snapshot_yields_no_rows() {
        let snap = snapshot(r#"{"Verification": {"candidate": "sync"}}"#);
        assert!(ticker_entries(&snap).is_empty());
    }

    #[test]
    fn equal_timestamps_break_ties_by_name() {
        let snap = snapshot(
            r#"{
                "Khulna-2": {"timestamp": 7},
                "Barisal-1": {"timestamp": 7}
            }"#,
        );
        let entries = ticker_entries(&snap);
        let names: Vec<&str> = entries
            .iter()
            .map(|e| e.constituency.as_str())
            .collect();
        assert_eq!(names, vec!["Barisal-1", "Khulna-2"]);
    }

    #[test]
    fn partial_records_keep_their_entry() {
        let snap = snapshot(r#"{"Dhaka-1": {}}"#);
        let entries = ticker_entries(&snap);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].candidate, "");
        assert_eq!(entries[0].timestamp, 0);
    }

    #[test]
    fn status_marker_roundtrips() {
        let snap = snapshot(
            r#"{"Dhaka-1": {"candidate": "A", "status": "Verification"}}"#,
        );
        assert_eq!(
            snap["Dhaka-1"].status.as_deref(),
            Some("Verification")
        );
    }
}
