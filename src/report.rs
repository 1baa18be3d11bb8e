use chrono::{DateTime, Utc};

/// What happened to one source collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// destination was replaced by source documents.
    Copied {
        /// documents read from source.
        read: u64,
        /// documents deleted from destination before insert.
        deleted: u64,
        /// documents inserted into destination.
        inserted: u64,
    },
    /// source collection is empty, destination not touched.
    SkippedEmpty,
}

/// Per collection migration result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    /// collection name.
    pub name: String,
    /// what happened.
    pub outcome: CollectionOutcome,
}

/// Result of one successful migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// when the run begins to enumerate collections.
    pub started_at: DateTime<Utc>,
    /// when the last collection is done.
    pub finished_at: DateTime<Utc>,
    /// reserved collections found on source and skipped.
    pub skipped_reserved: Vec<String>,
    /// collections in the order they were processed.
    pub collections: Vec<CollectionReport>,
}

impl MigrationReport {
    /// total documents inserted into destination.
    pub fn total_inserted(&self) -> u64 {
        self.collections
            .iter()
            .map(|c| match c.outcome {
                CollectionOutcome::Copied { inserted, .. } => inserted,
                CollectionOutcome::SkippedEmpty => 0,
            })
            .sum()
    }

    /// names of collections which were copied.
    pub fn copied_collections(&self) -> Vec<&str> {
        self.collections
            .iter()
            .filter(|c| matches!(c.outcome, CollectionOutcome::Copied { .. }))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// get report of collection `name`.
    pub fn get(&self, name: &str) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// seconds spent by the run.
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_totals() {
        let now = Utc::now();
        let report = MigrationReport {
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(1500),
            skipped_reserved: vec![],
            collections: vec![
                CollectionReport {
                    name: "students".to_string(),
                    outcome: CollectionOutcome::Copied {
                        read: 3,
                        deleted: 1,
                        inserted: 3,
                    },
                },
                CollectionReport {
                    name: "logs".to_string(),
                    outcome: CollectionOutcome::SkippedEmpty,
                },
                CollectionReport {
                    name: "faculty".to_string(),
                    outcome: CollectionOutcome::Copied {
                        read: 2,
                        deleted: 0,
                        inserted: 2,
                    },
                },
            ],
        };
        assert_eq!(report.total_inserted(), 5);
        assert_eq!(report.copied_collections(), vec!["students", "faculty"]);
        assert_eq!(
            report.get("logs").map(|c| &c.outcome),
            Some(&CollectionOutcome::SkippedEmpty)
        );
        assert!(report.get("stale").is_none());
        assert_eq!(report.elapsed_secs(), 1.5);
    }
}
