//! Unread-count aggregates for the client badge.

use serde::Serialize;

use crate::notification::Priority;

/// Unread notifications per priority for one recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub normal: i64,
    pub high: i64,
    pub urgent: i64,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> i64 {
        match priority {
            Priority::Low => self.low,
            Priority::Normal => self.normal,
            Priority::High => self.high,
            Priority::Urgent => self.urgent,
        }
    }

    fn slot(&mut self, priority: Priority) -> &mut i64 {
        match priority {
            Priority::Low => &mut self.low,
            Priority::Normal => &mut self.normal,
            Priority::High => &mut self.high,
            Priority::Urgent => &mut self.urgent,
        }
    }

    pub fn add(&mut self, priority: Priority, n: i64) {
        *self.slot(priority) += n;
    }

    /// Remove one unread record; never goes below zero.
    pub fn decrement(&mut self, priority: Priority) {
        let slot = self.slot(priority);
        *slot = (*slot - 1).max(0);
    }

    pub fn total(&self) -> i64 {
        self.low + self.normal + self.high + self.urgent
    }
}

/// Badge data returned to the client.
///
/// `has_urgent` decides whether the red-dot indicator is shown, regardless of
/// the numeric total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreadSummary {
    pub total: i64,
    pub by_priority: PriorityCounts,
    pub has_urgent: bool,
}

impl From<PriorityCounts> for UnreadSummary {
    fn from(by_priority: PriorityCounts) -> Self {
        Self {
            total: by_priority.total(),
            by_priority,
            has_urgent: by_priority.urgent > 0,
        }
    }
}
