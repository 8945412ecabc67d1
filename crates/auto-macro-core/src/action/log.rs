use crate::ActionRecord;

use chrono::{DateTime, Local};

/// Ordered, append-only sequence of action records from one session.
///
/// Records keep the order they were appended in; the log never sorts or
/// deduplicates them.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLog {
    created: DateTime<Local>,
    records: Vec<ActionRecord>,
}

impl ActionLog {
    /// Empty log stamped with the current local time.
    pub fn new() -> Self {
        Self {
            created: Local::now(),
            records: Vec::new(),
        }
    }

    /// Log with existing records, e.g. from a saved file.
    pub fn from_records(created: DateTime<Local>, records: Vec<ActionRecord>) -> Self {
        Self { created, records }
    }

    pub(crate) fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    /// When the recording session began.
    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// Records in append order.
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Timestamp of the last record, or zero for an empty log.
    pub fn duration_secs(&self) -> f64 {
        self.records.last().map(ActionRecord::t).unwrap_or(0.0)
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
