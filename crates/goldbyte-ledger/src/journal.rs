//! Event journal - append-only, hash-chained record of committed mutations
//!
//! Each record commits to its predecessor's hash, so any edit to a stored
//! record (or a dropped record) breaks [`EventJournal::verify`].

use chrono::{DateTime, Utc};
use goldbyte_types::LedgerEvent;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash preceding the first record
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A journaled event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the journal, starting at 0
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: LedgerEvent,
    /// Hash of the previous record (or [`GENESIS_HASH`])
    pub previous_hash: String,
    /// Hash of this record
    pub hash: String,
}

impl EventRecord {
    /// Compute hash of this record
    pub fn compute_hash(&self) -> String {
        let content = format!(
            "{}:{}:{}:{:?}",
            self.previous_hash,
            self.sequence,
            self.recorded_at.timestamp_nanos_opt().unwrap_or_default(),
            self.event
        );
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify the record hash
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventJournal {
    records: Vec<EventRecord>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, chaining it to the previous record
    pub fn append(&mut self, event: LedgerEvent, recorded_at: DateTime<Utc>) -> &EventRecord {
        let previous_hash = self
            .records
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let mut record = EventRecord {
            sequence: self.records.len() as u64,
            recorded_at,
            event,
            previous_hash,
            hash: String::new(),
        };
        record.hash = record.compute_hash();
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check every hash and every link of the chain
    pub fn verify(&self) -> bool {
        let mut previous = GENESIS_HASH;
        for (index, record) in self.records.iter().enumerate() {
            if record.sequence != index as u64 || record.previous_hash != previous || !record.verify()
            {
                return false;
            }
            previous = record.hash.as_str();
        }
        true
    }
}
