//! Outbound notification when triage finds an urgent alert.
//!
//! Notifiers are fire-and-forget from the caller's point of view. A failing
//! notifier is logged by triage and never changes the triage result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Alarm sound unavailable: {0}")]
    SoundUnavailable(String),
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Notification failed: {0}")]
    Other(String),
}

pub trait Notifier: Send + Sync {
    /// Signal that an alert of `kind` needs the user's attention.
    fn notify(&self, kind: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, kind: &str) -> Result<(), NotifyError> {
        (**self).notify(kind)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, kind: &str) -> Result<(), NotifyError> {
        (**self).notify(kind)
    }
}

/// Writes a warning to the log. Used when no sound output is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: &str) -> Result<(), NotifyError> {
        log::warn!("URGENT: {} alert near your location", kind);
        Ok(())
    }
}

/// Suppresses repeat notifications for the same alert kind within a cooldown,
/// so a polling loop does not replay the alarm on every tick.
///
/// Time comes from `tokio::time`, so a paused test clock applies.
pub struct CooldownNotifier<N> {
    inner: N,
    cooldown: Duration,
    last_fired: Mutex<HashMap<String, Instant>>,
}

impl<N: Notifier> CooldownNotifier<N> {
    pub fn new(inner: N, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cooldown_seconds(inner: N, seconds: u32) -> Self {
        Self::new(inner, Duration::from_secs(u64::from(seconds)))
    }
}

impl<N: Notifier> Notifier for CooldownNotifier<N> {
    fn notify(&self, kind: &str) -> Result<(), NotifyError> {
        let now = Instant::now();
        {
            let mut last_fired = self
                .last_fired
                .lock()
                .map_err(|e| NotifyError::Other(e.to_string()))?;
            if let Some(last) = last_fired.get(kind) {
                if now.duration_since(*last) < self.cooldown {
                    log::debug!("Skipping {} notification, still cooling down", kind);
                    return Ok(());
                }
            }
            last_fired.insert(kind.to_string(), now);
        }
        self.inner.notify(kind)
    }
}

#[cfg(feature = "sound")]
pub use sound::SoundNotifier;

#[cfg(feature = "sound")]
mod sound {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;

    use rodio::{Decoder, OutputStreamBuilder, Sink};

    use super::{Notifier, NotifyError};

    /// Plays an alarm file through the default output device.
    ///
    /// The file is opened and decoded before returning so a missing or broken
    /// file is reported as an error. Playback itself runs on its own thread.
    pub struct SoundNotifier {
        path: PathBuf,
    }

    impl SoundNotifier {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl Notifier for SoundNotifier {
        fn notify(&self, kind: &str) -> Result<(), NotifyError> {
            let file = File::open(&self.path).map_err(|e| {
                NotifyError::SoundUnavailable(format!("{}: {}", self.path.display(), e))
            })?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| {
                NotifyError::SoundUnavailable(format!("{}: {}", self.path.display(), e))
            })?;

            let kind = kind.to_string();
            std::thread::spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        log::error!("Could not play alarm for {}: {}", kind, e);
                        return;
                    }
                };
                stream.log_on_drop(false);
                let sink = Sink::connect_new(stream.mixer());
                sink.append(source);
                sink.sleep_until_end();
                log::debug!("Alarm for {} finished", kind);
            });

            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tempfile::tempdir;

        #[test]
        fn test_missing_file_is_reported() {
            let dir = tempdir().unwrap();
            let notifier = SoundNotifier::new(dir.path().join("alarm.wav"));
            assert!(matches!(
                notifier.notify("Flood"),
                Err(NotifyError::SoundUnavailable(_))
            ));
        }

        #[test]
        fn test_garbage_file_is_reported() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("alarm.wav");
            std::fs::write(&path, b"not audio").unwrap();
            let notifier = SoundNotifier::new(path);
            assert!(matches!(
                notifier.notify("Flood"),
                Err(NotifyError::SoundUnavailable(_))
            ));
        }
    }
}
