use serde::{Deserialize, Serialize};

/// Review progress of a branch as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStats {
    pub total: u32,
    pub approved: u32,
}

impl BranchStats {
    pub fn pending(&self) -> u32 {
        self.total.saturating_sub(self.approved)
    }

    /// Approved share rounded to a whole percent. Zero when there is nothing to approve.
    pub fn progress_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let approved = self.approved.min(self.total);
        (f64::from(approved) / f64::from(self.total) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub name: String,
    #[serde(default)]
    pub stats: Option<BranchStats>,
}

impl BranchSummary {
    pub fn progress_percent(&self) -> u32 {
        self.stats.map_or(0, |s| s.progress_percent())
    }
}
