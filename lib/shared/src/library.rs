use serde::{Deserialize, Serialize};

/// Outcome of one generated group in a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub playlist: String,
    /// Tracks the strategy assigned to this group
    pub track_count: usize,
    /// Tracks actually submitted to the catalog (always 0 on a dry run)
    pub added: usize,
}

/// Result of a full generate-and-reconcile run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    pub fn total_added(&self) -> usize {
        self.groups.iter().map(|g| g.added).sum()
    }
}
