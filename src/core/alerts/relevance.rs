// Geographic relevance of an alert to the user.
//
// Relevance ignores severity entirely. Whether a relevant alert is urgent is
// decided by triage.

use super::model::AlertRecord;
use crate::core::geo::{self, Coordinate, GeoError};

/// Outcome of checking one alert against the user's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relevance {
    /// User is within the alert radius
    Relevant { distance_km: f64 },
    /// User is outside the alert radius
    OutOfRange { distance_km: f64 },
    /// No user location, so nothing was assessed
    LocationUnknown,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant { .. })
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self {
            Self::Relevant { distance_km } | Self::OutOfRange { distance_km } => Some(*distance_km),
            Self::LocationUnknown => None,
        }
    }
}

/// Check whether `user` lies within `alert.radius_km` of the alert location.
pub fn is_relevant(alert: &AlertRecord, user: Option<Coordinate>) -> Result<Relevance, GeoError> {
    let Some(user) = user else {
        return Ok(Relevance::LocationUnknown);
    };

    let distance_km = geo::distance(user, alert.location)?;
    if distance_km <= alert.radius_km {
        Ok(Relevance::Relevant { distance_km })
    } else {
        Ok(Relevance::OutOfRange { distance_km })
    }
}

/// Every geographically relevant alert in batch order, whatever its severity.
/// Used for display alongside the triage result.
pub fn relevant_alerts<'a>(
    alerts: &'a [AlertRecord],
    user: Option<Coordinate>,
) -> Result<Vec<&'a AlertRecord>, GeoError> {
    let mut relevant = Vec::new();
    for alert in alerts {
        if is_relevant(alert, user)?.is_relevant() {
            relevant.push(alert);
        }
    }
    Ok(relevant)
}
