/// What happened to a single dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written {
        id: String,
        queries: usize,
        failed_cells: usize,
    },
    /// An artifact already existed when a worker picked the dashboard up.
    Skipped { id: String },
    Failed { id: String, failed_cells: usize },
}

impl Outcome {
    pub fn id(&self) -> &str {
        match self {
            Outcome::Written { id, .. } | Outcome::Skipped { id } | Outcome::Failed { id, .. } => id,
        }
    }
}

/// Totals over one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Dashboards returned by the upstream
    pub listed: usize,
    /// Dashboards queued after applying the limit
    pub selected: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Query texts across all written artifacts
    pub queries: usize,
    pub failed_cells: usize,
}

impl RunSummary {
    pub fn new(listed: usize, selected: usize) -> Self {
        Self {
            listed,
            selected,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written {
                queries,
                failed_cells,
                ..
            } => {
                self.written += 1;
                self.queries += queries;
                self.failed_cells += failed_cells;
            }
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { failed_cells, .. } => {
                self.failed += 1;
                self.failed_cells += failed_cells;
            }
        }
    }

    /// Dashboards that reached an outcome. Lower than `selected` only if a
    /// worker died mid-run.
    pub fn processed(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut summary = RunSummary::new(10, 3);

        summary.record(&Outcome::Written {
            id: "a".to_string(),
            queries: 4,
            failed_cells: 1,
        });
        summary.record(&Outcome::Skipped {
            id: "b".to_string(),
        });
        summary.record(&Outcome::Failed {
            id: "c".to_string(),
            failed_cells: 2,
        });

        assert_eq!(summary.listed, 10);
        assert_eq!(summary.selected, 3);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.queries, 4);
        assert_eq!(summary.failed_cells, 3);
        assert_eq!(summary.processed(), 3);
    }

    #[test]
    fn test_outcome_id() {
        let outcome = Outcome::Skipped {
            id: "d1".to_string(),
        };
        assert_eq!(outcome.id(), "d1");
    }
}
