//! Per-run reconciliation report.

use serde::Serialize;
use uuid::Uuid;

/// Which strategy resolved the Stripe counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    StoredId,
    NameMatch,
    MetadataMatch,
    FuzzyName,
}

/// Outcome classification for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// The resolved Stripe id equals the stored one.
    Ok,
    /// Resolved to a different id; a repair write was attempted.
    Mismatch,
    /// Every strategy came up empty.
    NotFound,
    /// A storage or Stripe error interrupted resolution.
    Error,
}

/// One row of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSyncResult {
    pub product_id: Uuid,
    pub product_name: String,
    pub status: MatchStatus,

    /// The Stripe id the product resolved to, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchStrategy>,

    /// True when a repair write committed.
    pub updated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregated run report. `total == ok + mismatches + not_found + errors`
/// holds by construction; `updated` counts committed repairs only.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub total: usize,
    pub ok: usize,
    pub mismatches: usize,
    pub not_found: usize,
    pub errors: usize,
    pub updated: usize,
    pub results: Vec<ProductSyncResult>,
}

impl SyncReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and bump the matching counters.
    pub fn push(&mut self, result: ProductSyncResult) {
        self.total += 1;
        match result.status {
            MatchStatus::Ok => self.ok += 1,
            MatchStatus::Mismatch => self.mismatches += 1,
            MatchStatus::NotFound => self.not_found += 1,
            MatchStatus::Error => self.errors += 1,
        }
        if result.updated {
            self.updated += 1;
        }
        self.results.push(result);
    }

    /// True when every product resolved to its stored id.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.ok == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: MatchStatus, updated: bool) -> ProductSyncResult {
        ProductSyncResult {
            product_id: Uuid::new_v4(),
            product_name: "Test".to_string(),
            status,
            stripe_id: None,
            matched_by: None,
            updated,
            message: None,
        }
    }

    #[test]
    fn counters_sum_to_total() {
        let mut report = SyncReport::new();
        report.push(row(MatchStatus::Ok, false));
        report.push(row(MatchStatus::Mismatch, true));
        report.push(row(MatchStatus::Mismatch, false)); // failed repair write
        report.push(row(MatchStatus::NotFound, false));
        report.push(row(MatchStatus::Error, false));

        assert_eq!(report.total, 5);
        assert_eq!(
            report.total,
            report.ok + report.mismatches + report.not_found + report.errors
        );
        assert_eq!(report.mismatches, 2);
        assert_eq!(report.updated, 1);
        assert!(!report.is_converged());
    }

    #[test]
    fn converged_report_is_all_ok() {
        let mut report = SyncReport::new();
        report.push(row(MatchStatus::Ok, false));
        report.push(row(MatchStatus::Ok, false));
        assert!(report.is_converged());
        assert_eq!(report.updated, 0);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(
            serde_json::to_string(&MatchStrategy::FuzzyName).unwrap(),
            "\"fuzzy_name\""
        );
    }
}
