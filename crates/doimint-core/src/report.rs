//! Per-row results and the end-of-run summary.
//!
//! Pure accumulation logic, decoupled from I/O and CLI orchestration. The
//! sequential pipeline records one [`RowResult`] per row; nothing here is
//! shared across threads.

/// Outcome of processing a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// A new DOI record was created (server minted or explicit identifier).
    Created,
    /// An existing DOI record was updated.
    Updated,
    /// Dry-run: the request was composed and logged, not sent.
    Simulated,
    /// Validation or the API call failed for this row.
    Failed,
}

/// Result of processing a single spreadsheet row.
#[derive(Debug, Clone)]
pub struct RowResult {
    /// 1-based spreadsheet row number.
    pub row_number: usize,
    /// Row title, for report lines.
    pub title: String,
    pub outcome: RowOutcome,
    /// The DOI that applies to this row after the operation, when known.
    pub doi: Option<String>,
    /// Error message if the row failed.
    pub error: Option<String>,
}

impl RowResult {
    /// Creates a successful result.
    pub fn success(
        row_number: usize,
        title: String,
        outcome: RowOutcome,
        doi: Option<String>,
    ) -> Self {
        Self {
            row_number,
            title,
            outcome,
            doi,
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(row_number: usize, title: String, error: String) -> Self {
        Self {
            row_number,
            title,
            outcome: RowOutcome::Failed,
            doi: None,
            error: Some(error),
        }
    }

    /// Returns true if the row reached a terminal success state.
    pub fn is_success(&self) -> bool {
        self.outcome != RowOutcome::Failed
    }
}

/// Accumulated results for a whole run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    results: Vec<RowResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one row result.
    pub fn record(&mut self, result: RowResult) {
        self.results.push(result);
    }

    /// All recorded results, in spreadsheet order.
    pub fn results(&self) -> &[RowResult] {
        &self.results
    }

    /// Total number of processed rows.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of rows that succeeded (including simulated successes).
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of rows that failed.
    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }

    fn count(&self, outcome: RowOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn created(&self) -> usize {
        self.count(RowOutcome::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(RowOutcome::Updated)
    }

    pub fn simulated(&self) -> usize {
        self.count(RowOutcome::Simulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.successful(), 0);
        assert_eq!(summary.failed(), 0);
    }

    #[test]
    fn test_record_and_count() {
        let mut summary = RunSummary::new();
        summary.record(RowResult::success(
            2,
            "a".to_string(),
            RowOutcome::Created,
            Some("10.1234/abc".to_string()),
        ));
        summary.record(RowResult::success(
            3,
            "b".to_string(),
            RowOutcome::Updated,
            Some("10.1234/def".to_string()),
        ));
        summary.record(RowResult::failure(
            4,
            "c".to_string(),
            "boom".to_string(),
        ));
        summary.record(RowResult::success(
            5,
            "d".to_string(),
            RowOutcome::Simulated,
            None,
        ));

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.successful(), 3);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.created(), 1);
        assert_eq!(summary.updated(), 1);
        assert_eq!(summary.simulated(), 1);
    }

    #[test]
    fn test_failure_carries_error_and_row() {
        let result = RowResult::failure(7, "t".to_string(), "bad year".to_string());
        assert!(!result.is_success());
        assert_eq!(result.row_number, 7);
        assert_eq!(result.error.as_deref(), Some("bad year"));
        assert_eq!(result.doi, None);
    }

    #[test]
    fn test_results_preserve_order() {
        let mut summary = RunSummary::new();
        for n in 2..=5 {
            summary.record(RowResult::success(
                n,
                format!("row {}", n),
                RowOutcome::Created,
                None,
            ));
        }
        let numbers: Vec<usize> = summary.results().iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5]);
    }
}
