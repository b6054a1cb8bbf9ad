//! Location providers.
//!
//! A provider exposes the latest fix through a `tokio::sync::watch` channel.
//! `None` means no fix is available, which is a normal state rather than an
//! error. Callers wait for a fix with a timeout instead of polling.

use std::time::Duration;

use tokio::sync::watch;

use super::geo::Coordinate;

pub trait LocationProvider: Send + Sync {
    /// Receiver that always holds the most recent fix, if any.
    fn subscribe(&self) -> watch::Receiver<Option<Coordinate>>;

    /// Latest fix without waiting.
    fn current(&self) -> Option<Coordinate> {
        *self.subscribe().borrow()
    }
}

/// A provider that always reports the same position (or never has one).
///
/// The sending half is dropped straight away, so waiting on an unavailable
/// fixed location returns at once instead of running out the timeout.
pub struct FixedLocation {
    rx: watch::Receiver<Option<Coordinate>>,
}

impl FixedLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        let (_tx, rx) = watch::channel(coordinate);
        Self { rx }
    }

    pub fn unavailable() -> Self {
        Self::new(None)
    }
}

impl LocationProvider for FixedLocation {
    fn subscribe(&self) -> watch::Receiver<Option<Coordinate>> {
        self.rx.clone()
    }
}

/// A provider fed by a device adapter that publishes fixes as they arrive.
pub struct LocationFeed {
    tx: watch::Sender<Option<Coordinate>>,
}

impl LocationFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Publish a new fix. Invalid coordinates are dropped.
    pub fn publish(&self, coordinate: Coordinate) {
        if let Err(e) = coordinate.validate() {
            log::warn!("Ignoring location update: {}", e);
            return;
        }
        log::debug!("Location fix {}", coordinate);
        self.tx.send_replace(Some(coordinate));
    }

    /// Mark the location as lost.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for LocationFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for LocationFeed {
    fn subscribe(&self) -> watch::Receiver<Option<Coordinate>> {
        self.tx.subscribe()
    }
}

/// Return the current fix, or wait up to `timeout` for the first one.
///
/// Gives `None` if no fix arrives in time or the provider goes away.
pub async fn wait_for_fix<P: LocationProvider + ?Sized>(
    provider: &P,
    timeout: Duration,
) -> Option<Coordinate> {
    let mut rx = provider.subscribe();

    let fix = match tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await {
        Ok(Ok(fix)) => *fix,
        Ok(Err(_)) => {
            log::debug!("Location provider closed before a fix arrived");
            None
        }
        Err(_) => {
            log::info!("No location fix within {:?}", timeout);
            None
        }
    };
    fix
}
