// Status Snapshot - one poll's worth of job statuses

use std::collections::HashMap;

/// Mapping of job name to reported status (e.g. `blue`, `red_anime`)
///
/// Produced once per poll cycle and discarded after mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    statuses: HashMap<String, String>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status; a later entry for the same job replaces the earlier one
    pub fn insert(&mut self, job: impl Into<String>, status: impl Into<String>) {
        self.statuses.insert(job.into(), status.into());
    }

    /// Status of `job`, or `None` if the job is absent from this snapshot
    pub fn status_of(&self, job: &str) -> Option<&str> {
        self.statuses.get(job).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StatusSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = StatusSnapshot::new();
        for (job, status) in iter {
            snapshot.insert(job, status);
        }
        snapshot
    }
}
