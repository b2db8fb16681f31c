//! # Archive Dashboard
//!
//! Pure aggregation over document rows; no I/O.

use serde::{Deserialize, Serialize};
use shared_types::ArchivedDocument;

/// Documents per kind code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: String,
    pub count: usize,
}

/// Documents per status label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Dashboard-shaped archive summary for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDashboard {
    /// Year the summary covers.
    pub year: u16,
    /// Total documents in the year.
    pub total: usize,
    /// Counts by kind, ordered by kind code.
    pub by_kind: Vec<KindCount>,
    /// Counts by status, ordered by status label.
    pub by_status: Vec<StatusCount>,
}

/// Aggregate document rows into a dashboard summary.
pub fn summarize(year: u16, documents: &[ArchivedDocument]) -> ArchiveDashboard {
    let mut by_kind: Vec<KindCount> = Vec::new();
    let mut by_status: Vec<StatusCount> = Vec::new();

    for doc in documents {
        match by_kind.iter_mut().find(|k| k.kind == doc.kind) {
            Some(entry) => entry.count += 1,
            None => by_kind.push(KindCount {
                kind: doc.kind.clone(),
                count: 1,
            }),
        }
        let label = doc.status.label();
        match by_status.iter_mut().find(|s| s.status == label) {
            Some(entry) => entry.count += 1,
            None => by_status.push(StatusCount {
                status: label.to_string(),
                count: 1,
            }),
        }
    }

    by_kind.sort_by(|a, b| a.kind.cmp(&b.kind));
    by_status.sort_by(|a, b| a.status.cmp(&b.status));

    ArchiveDashboard {
        year,
        total: documents.len(),
        by_kind,
        by_status,
    }
}
