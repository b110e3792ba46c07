//! Batch message and entry types returned from `get`/`getWithoutAck`.

/// One element of `Messages.messages`: the raw bytes of a single row-change
/// entry. Interior binlog-entry decoding is out of scope for this core; callers
/// that need structured columns decode these bytes with their own tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    bytes: Vec<u8>,
}

impl Entry {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Sentinel batch id meaning "no data available".
pub const EMPTY_BATCH_ID: i64 = -1;

/// A decoded `get` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub entries: Vec<Entry>,
    pub raw: bool,
    pub raw_entries: Vec<Vec<u8>>,
}

impl Message {
    /// The "no data available" response: `id == -1`, no entries.
    pub fn empty() -> Self {
        Self {
            id: EMPTY_BATCH_ID,
            entries: Vec::new(),
            raw: false,
            raw_entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_BATCH_ID
    }
}
