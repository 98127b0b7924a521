use chrono::{DateTime, Utc};
use gotham_protocol::ReportPayload;
use serde::{Deserialize, Serialize};

/// A payload that is waiting for delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferedRecord {
    pub slot: u32,
    pub payload: ReportPayload,
    pub timestamp: DateTime<Utc>,
}

/// Payloads kept for a later retry, oldest first. Serializes as a plain JSON
/// array so it can be stashed wherever the host keeps local data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfflineBuffer {
    records: Vec<BufferedRecord>,
}

impl OfflineBuffer {
    pub fn push(&mut self, payload: ReportPayload, timestamp: DateTime<Utc>) {
        self.records.push(BufferedRecord {
            slot: payload.slot(),
            payload,
            timestamp,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BufferedRecord] {
        &self.records
    }

    /// Takes every record out, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<BufferedRecord> {
        core::mem::take(&mut self.records)
    }

    pub(crate) fn restore(&mut self, record: BufferedRecord) {
        self.records.push(record);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotham_protocol::GameReport;

    fn game_payload(total_score: u32) -> ReportPayload {
        ReportPayload::Game(GameReport {
            total_score,
            rounds: Vec::new(),
            level_id: "deuce".into(),
            completed: true,
        })
    }

    #[test]
    fn buffer_survives_json() {
        let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut buffer = OfflineBuffer::default();
        buffer.push(game_payload(17), at);

        let json = buffer.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["slot"], 8);
        assert_eq!(value[0]["payload"]["total_score"], 17);

        assert_eq!(OfflineBuffer::from_json(&json).unwrap(), buffer);
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut buffer = OfflineBuffer::default();
        buffer.push(game_payload(1), DateTime::<Utc>::default());
        buffer.push(game_payload(2), DateTime::<Utc>::default());

        let drained = buffer.drain();

        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
    }
}
