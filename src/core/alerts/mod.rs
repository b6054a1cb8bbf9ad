// Disaster alert handling.
//
// Architecture:
// - model.rs: Alert records and severity
// - relevance.rs: Whether an alert's radius covers the user
// - triage.rs: First urgent alert in a batch, notifier dispatch

pub mod model;
pub mod relevance;
pub mod triage;
