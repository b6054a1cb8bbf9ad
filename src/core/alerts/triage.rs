// Alert triage - finds the first urgent alert in a batch and notifies.

use serde::{Deserialize, Serialize};

use super::model::AlertRecord;
use super::relevance::is_relevant;
use crate::core::geo::{Coordinate, GeoError};
use crate::core::notifier::Notifier;

pub const LOCATION_UNKNOWN_MESSAGE: &str = "📍 Fetching location...";

/// Result of a triage pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageOutcome {
    /// A High severity alert covers the user's location
    Urgent { kind: String },
    Clear,
}

impl TriageOutcome {
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Urgent { .. })
    }

    /// Text shown to the user for this outcome
    pub fn message(&self) -> String {
        match self {
            Self::Urgent { kind } => format!("⚠️ Urgent Alert: {} detected nearby!", kind),
            Self::Clear => "✅ No urgent alerts in your area.".to_string(),
        }
    }
}

/// Scan `alerts` in the order given and stop at the first High severity alert
/// whose radius contains `user`.
///
/// The notifier is invoked exactly once when an urgent alert is found, before
/// returning. Its failure is logged and does not change the outcome. With no
/// user location every alert is irrelevant, so the result is `Clear`.
pub fn triage<N: Notifier + ?Sized>(
    alerts: &[AlertRecord],
    user: Option<Coordinate>,
    notifier: &N,
) -> Result<TriageOutcome, GeoError> {
    for alert in alerts {
        if !alert.severity.is_urgent() {
            continue;
        }

        let relevance = is_relevant(alert, user)?;
        if !relevance.is_relevant() {
            continue;
        }

        log::info!(
            "Urgent {} alert within {:.1} km (radius {:.1} km)",
            alert.kind,
            relevance.distance_km().unwrap_or_default(),
            alert.radius_km
        );

        if let Err(e) = notifier.notify(&alert.kind) {
            log::error!("Failed to notify about {} alert: {}", alert.kind, e);
        }

        return Ok(TriageOutcome::Urgent {
            kind: alert.kind.clone(),
        });
    }

    Ok(TriageOutcome::Clear)
}
