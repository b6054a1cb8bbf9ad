pub mod alerts;
pub mod config;
pub mod coordinator;
pub mod geo;
pub mod location;
pub mod notifier;
pub mod records;
pub mod shelters;
pub mod store;
