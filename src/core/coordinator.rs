use std::sync::Arc;

use chrono::{DateTime, Local};

use super::alerts::model::AlertRecord;
use super::alerts::relevance::relevant_alerts;
use super::alerts::triage::{triage, TriageOutcome, LOCATION_UNKNOWN_MESSAGE};
use super::geo::Coordinate;
use super::notifier::Notifier;
use super::records::{decode_alerts, decode_shelters, Batch};
use super::shelters::model::ShelterRecord;
use super::shelters::ranker::{self, RankError, NO_SHELTERS_MESSAGE};
use super::store::{AlertSource, ShelterStore};

/// What the user sees after an alert check
#[derive(Debug, Clone, PartialEq)]
pub struct AlertReport {
    pub outcome: TriageOutcome,
    /// Relevant alerts of any severity, for display
    pub nearby: Vec<AlertRecord>,
    /// Alert records dropped as malformed
    pub skipped: usize,
    pub location_known: bool,
    pub checked_at: DateTime<Local>,
    pub message: String,
}

/// What the user sees after a shelter lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ShelterReport {
    pub ranked: Vec<ShelterRecord>,
    /// Shelter records dropped as malformed
    pub skipped: usize,
    pub message: String,
}

/// Fetches fresh batches from the stores on every call and runs them through
/// triage and ranking. Every failure degrades to a clear / no-shelters answer.
pub struct Coordinator {
    alerts: Arc<dyn AlertSource>,
    shelters: Arc<dyn ShelterStore>,
    notifier: Box<dyn Notifier>,
}

impl Coordinator {
    pub fn new(
        alerts: Arc<dyn AlertSource>,
        shelters: Arc<dyn ShelterStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            alerts,
            shelters,
            notifier,
        }
    }

    /// Use one store for both alerts and shelters.
    pub fn with_store<S>(store: S, notifier: Box<dyn Notifier>) -> Self
    where
        S: AlertSource + ShelterStore + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store, notifier)
    }

    fn load_alerts(&self) -> Batch<AlertRecord> {
        match self.alerts.current_alerts() {
            Ok(raw) => decode_alerts(&raw),
            Err(e) => {
                log::error!("Could not load alerts: {}", e);
                Batch::empty()
            }
        }
    }

    fn load_shelters(&self) -> Batch<ShelterRecord> {
        match self.shelters.shelters() {
            Ok(raw) => decode_shelters(&raw),
            Err(e) => {
                log::error!("Could not load shelters: {}", e);
                Batch::empty()
            }
        }
    }

    pub fn check_alerts(&self, user: Option<Coordinate>) -> AlertReport {
        let batch = self.load_alerts();
        log::debug!("Checking {} alerts at {:?}", batch.records.len(), user);

        let outcome = match triage(&batch.records, user, self.notifier.as_ref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Alert triage failed, reporting clear: {}", e);
                TriageOutcome::Clear
            }
        };

        let nearby = match relevant_alerts(&batch.records, user) {
            Ok(alerts) => alerts.into_iter().cloned().collect(),
            Err(e) => {
                log::warn!("Could not list nearby alerts: {}", e);
                Vec::new()
            }
        };

        let message = if user.is_none() && !outcome.is_urgent() {
            LOCATION_UNKNOWN_MESSAGE.to_string()
        } else {
            outcome.message()
        };

        AlertReport {
            outcome,
            nearby,
            skipped: batch.skipped,
            location_known: user.is_some(),
            checked_at: Local::now(),
            message,
        }
    }

    pub fn find_shelters(&self, user: Option<Coordinate>) -> ShelterReport {
        let batch = self.load_shelters();

        let (ranked, message) = match ranker::rank(&batch.records, user) {
            Ok(ranked) => {
                let message = ranker::format(&ranked);
                (ranked, message)
            }
            Err(RankError::LocationRequired) => {
                (Vec::new(), LOCATION_UNKNOWN_MESSAGE.to_string())
            }
            Err(e) => {
                log::warn!("Shelter ranking failed: {}", e);
                (Vec::new(), NO_SHELTERS_MESSAGE.to_string())
            }
        };

        ShelterReport {
            ranked,
            skipped: batch.skipped,
            message,
        }
    }
}
