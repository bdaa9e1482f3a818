use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::normalize::canonical_key;

/// Static metadata for a single seat, as shipped in `election_data.json`.
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    #[serde(default)]
    pub seat_name: String,
    #[serde(default)]
    pub district_name: String,
    #[serde(default)]
    pub division_name: String,
}

/// Top-level shape of the metadata asset:
/// `{ "divisions": { division: [seat, ...] } }`.
///
/// Divisions deserialize into a BTreeMap so iteration order (and with it
/// the seat-index overwrite order) is deterministic regardless of the
/// document's key order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionData {
    #[serde(default)]
    pub divisions: BTreeMap<String, Vec<SeatRecord>>,
}

impl ElectionData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Canonical-key → seat lookup built once at startup.
#[derive(Debug, Clone, Default)]
pub struct SeatIndex {
    entries: HashMap<String, SeatRecord>,
}

impl SeatIndex {
    /// Build the index from the metadata asset. Every seat contributes
    /// exactly one entry under `canonical_key(seat_name)`. Collisions
    /// are last-write-wins, in lexicographic division order and source
    /// seat order within each division.
    pub fn build(data: &ElectionData) -> Self {
        let mut entries = HashMap::new();
        for seats in data.divisions.values() {
            for seat in seats {
                entries.insert(canonical_key(&seat.seat_name), seat.clone());
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, key: &str) -> Option<&SeatRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
