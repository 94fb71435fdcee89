//! Decoding of exposed-batch response bodies.
//!
//! Bodies are `ProtoExposedList` messages. Decoding goes through `prost`, so
//! unknown fields in the container or in an entry are skipped while truncated
//! or malformed framing is rejected. An empty body is a valid zero-entry list.

use base64::Engine;
use exposee_sync_proto::{ProtoExposedList, ProtoExposee};
use prost::Message;
use time::OffsetDateTime;

use crate::error::DecodeError;

/// One published diagnosis key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedRecord {
    key: Vec<u8>,
    onset: OffsetDateTime,
}

impl ExposedRecord {
    pub fn new(key: Vec<u8>, onset: OffsetDateTime) -> Self {
        Self { key, onset }
    }

    /// Opaque diagnosis key material.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Onset of the key, millisecond precision.
    pub fn onset(&self) -> OffsetDateTime {
        self.onset
    }

    /// Standard base64 rendering of the key, for diagnostics.
    pub fn key_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.key)
    }

    fn from_proto(entry: ProtoExposee) -> Result<Self, DecodeError> {
        let nanos = i128::from(entry.key_date) * 1_000_000;
        let onset = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| DecodeError::OnsetOutOfRange(entry.key_date))?;
        Ok(Self {
            key: entry.key,
            onset,
        })
    }
}

/// Records of one batch, in transport order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposedBatch {
    records: Vec<ExposedRecord>,
}

impl ExposedBatch {
    pub fn new(records: Vec<ExposedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExposedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ExposedRecord> {
        self.records
    }
}

impl IntoIterator for ExposedBatch {
    type Item = ExposedRecord;
    type IntoIter = std::vec::IntoIter<ExposedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExposedBatch {
    type Item = &'a ExposedRecord;
    type IntoIter = std::slice::Iter<'a, ExposedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parses a response body into an [`ExposedBatch`].
pub fn decode(bytes: &[u8]) -> Result<ExposedBatch, DecodeError> {
    let list = ProtoExposedList::decode(bytes)?;
    let records = list
        .exposed
        .into_iter()
        .map(ExposedRecord::from_proto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ExposedBatch::new(records))
}
