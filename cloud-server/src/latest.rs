//! Most recent analysis result

use parking_lot::Mutex;

use crate::models::AnalysisResult;

/// Single-slot holder for the last `/api/analyse` result.
///
/// Replacement is one critical section, so a reader never sees fields from
/// two different requests. Lives in process memory only.
#[derive(Debug, Default)]
pub struct LatestStore {
    slot: Mutex<Option<AnalysisResult>>,
}

impl LatestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: AnalysisResult) {
        *self.slot.lock() = Some(result);
    }

    pub fn latest(&self) -> Option<AnalysisResult> {
        self.slot.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn result(power: f64, detection: u8) -> AnalysisResult {
        AnalysisResult {
            extra: Map::new(),
            current: 1.0,
            voltage: 230.0,
            power,
            detection,
        }
    }

    #[test]
    fn test_empty_until_recorded() {
        let store = LatestStore::new();
        assert!(store.latest().is_none());

        store.record(result(3.0, 0));
        assert_eq!(store.latest().map(|r| r.power), Some(3.0));
    }

    #[test]
    fn test_last_write_wins() {
        let store = LatestStore::new();
        store.record(result(3.0, 0));
        store.record(result(12.0, 1));

        let latest = store.latest().unwrap();
        assert_eq!(latest.power, 12.0);
        assert_eq!(latest.detection, 1);
    }
}
