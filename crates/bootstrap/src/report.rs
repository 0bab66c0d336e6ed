//! Run report: what happened to each declared resource.

use chrono::{DateTime, Utc};
use ws_cloud::ResourceId;

use crate::reconciler::{Outcome, ReconciliationResult};
use crate::ui;

/// Outcomes of one bootstrap run, in processing order.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run stopped, successfully or not.
    pub finished_at: Option<DateTime<Utc>>,
    /// One entry per processed resource.
    pub results: Vec<ReconciliationResult>,
}

impl RunReport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
        }
    }

    /// Append the outcome for a resource.
    pub fn record(&mut self, resource: ResourceId, outcome: Outcome) {
        self.results.push(ReconciliationResult { resource, outcome });
    }

    /// Mark the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Resources created during this run.
    pub fn created(&self) -> impl Iterator<Item = &ResourceId> {
        self.with_outcome(|o| matches!(o, Outcome::Created))
    }

    /// Resources that already existed.
    pub fn already_existing(&self) -> impl Iterator<Item = &ResourceId> {
        self.with_outcome(|o| matches!(o, Outcome::AlreadyExists))
    }

    /// The resource the run failed on, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&ReconciliationResult> {
        self.results
            .iter()
            .find(|r| matches!(r.outcome, Outcome::Failed { .. }))
    }

    /// Whether every processed resource converged.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// Wall-clock duration, if finished.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// Print a short summary to the console.
    pub fn print_summary(&self) {
        ui::print_section("Summary");
        ui::print_kv("Created", &self.created().count().to_string());
        ui::print_kv(
            "Already existed",
            &self.already_existing().count().to_string(),
        );
        if let Some(duration) = self.duration() {
            ui::print_kv("Elapsed", &format!("{}s", duration.num_seconds()));
        }
        for id in self.created() {
            ui::print_list_item(&id.to_string());
        }
        if let Some(failed) = self.failure() {
            ui::print_error(&format!("{}: {}", failed.resource, failed.outcome));
        }
    }

    fn with_outcome(&self, pred: fn(&Outcome) -> bool) -> impl Iterator<Item = &ResourceId> {
        self.results
            .iter()
            .filter(move |r| pred(&r.outcome))
            .map(|r| &r.resource)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
