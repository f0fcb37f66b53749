//! In-memory store of finished reports

use parking_lot::Mutex;
use std::collections::VecDeque;
use surge_core::Report;

/// Bounded, most-recent-first list of reports
#[derive(Debug)]
pub struct ReportStore {
    reports: Mutex<VecDeque<Report>>,
    capacity: usize,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            reports: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    /// Insert at the front, dropping the oldest report beyond capacity
    pub fn append(&self, report: Report) {
        let mut reports = self.reports.lock();
        reports.push_front(report);
        reports.truncate(self.capacity);
    }

    /// All reports, most recent first
    pub fn list(&self) -> Vec<Report> {
        self.reports.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Report> {
        self.reports.lock().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use surge_core::{RunId, RunSnapshot, StopReason, TestConfig, TestConfigRequest};

    fn report(concurrency: i64) -> Report {
        let config = TestConfig::new(TestConfigRequest {
            url: Some("http://localhost/".to_string()),
            method: None,
            concurrency: Some(concurrency),
            duration: Some(1),
            body: None,
        })
        .unwrap();

        let mut snapshot = RunSnapshot::new(Utc::now());
        snapshot.total_requests = concurrency as u64;
        snapshot.successful_requests = concurrency as u64;

        Report::finalize(
            RunId::new(),
            &config,
            snapshot,
            Duration::from_secs(1),
            StopReason::Deadline,
        )
    }

    #[test]
    fn test_store_keeps_most_recent_first() {
        let store = ReportStore::default();
        assert!(store.is_empty());
        assert!(store.latest().is_none());

        for concurrency in 1..=4 {
            store.append(report(concurrency));
            assert!(store.len() <= 3);
        }

        let list = store.list();
        assert_eq!(list.len(), 3);
        let order: Vec<u32> = list.iter().map(|r| r.concurrency).collect();
        assert_eq!(order, vec![4, 3, 2]);
        assert_eq!(store.latest().unwrap().concurrency, 4);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let store = ReportStore::new(0);
        store.append(report(1));
        store.append(report(2));
        assert_eq!(store.capacity(), 1);
        assert_eq!(store.list()[0].concurrency, 2);
    }
}
