use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::core::{
    config::{ConfigManager, Settings},
    coordinator::{AlertReport, Coordinator},
    geo::{Coordinate, GeoError},
    location::{wait_for_fix, FixedLocation, LocationProvider},
    notifier::{CooldownNotifier, LogNotifier, Notifier},
    store::JsonRecordStore,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Logger initialization error: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("Invalid location: {0}")]
    Location(#[from] GeoError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Nearby disaster alerts and shelters
#[derive(Parser)]
#[command(name = "shelter-watch", version, about = "Nearby disaster alerts and shelters")]
struct Cli {
    /// Directory holding settings.json
    #[arg(short, long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Your location as "lat,lon" (overrides home_location)
    #[arg(long, global = true, allow_hyphen_values = true)]
    at: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check once for urgent alerts near you
    Alerts,
    /// List shelters, nearest first
    Shelters,
    /// Keep checking for alerts until interrupted
    Watch,
    /// Write a default settings.json
    Init,
}

fn init_logging(level: Option<&str>) -> Result<(), AppError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.try_init()?;
    Ok(())
}

#[cfg(feature = "sound")]
fn alarm_notifier(settings: &Settings) -> Box<dyn Notifier> {
    match &settings.alarm_sound {
        Some(path) => Box::new(crate::core::notifier::SoundNotifier::new(path.clone())),
        None => Box::new(LogNotifier),
    }
}

#[cfg(not(feature = "sound"))]
fn alarm_notifier(settings: &Settings) -> Box<dyn Notifier> {
    if let Some(path) = &settings.alarm_sound {
        log::warn!(
            "alarm_sound {} ignored, built without the sound feature",
            path.display()
        );
    }
    Box::new(LogNotifier)
}

fn build_coordinator(settings: &Settings, alarm: Box<dyn Notifier>) -> Coordinator {
    let notifier = CooldownNotifier::new(alarm, settings.effective_alert_cooldown());
    Coordinator::with_store(
        JsonRecordStore::new(settings.data_dir.clone()),
        Box::new(notifier),
    )
}

fn location_provider(at: Option<&str>, settings: &Settings) -> Result<FixedLocation, AppError> {
    let coordinate = match at {
        Some(text) => Some(Coordinate::parse(text)?),
        None => match settings.home_location {
            Some(home) => {
                home.validate()?;
                Some(home)
            }
            None => None,
        },
    };
    Ok(FixedLocation::new(coordinate))
}

fn print_alert_report(report: &AlertReport, timestamped: bool) {
    if timestamped {
        println!("[{}] {}", report.checked_at.format("%H:%M:%S"), report.message);
    } else {
        println!("{}", report.message);
    }

    let others: Vec<_> = report
        .nearby
        .iter()
        .filter(|alert| !alert.severity.is_urgent())
        .collect();
    if !others.is_empty() {
        println!("Other alerts in your area:");
        for alert in others {
            println!("  {} ({})", alert.kind, alert.severity);
        }
    }
    if report.skipped > 0 {
        println!("({} malformed alert records skipped)", report.skipped);
    }
}

/// Check for alerts every poll interval until `shutdown` resolves.
async fn watch_alerts(
    coordinator: &Coordinator,
    provider: &dyn LocationProvider,
    settings: &Settings,
    shutdown: impl Future<Output = ()>,
) {
    let timeout = Duration::from_millis(settings.location_timeout_ms);
    let mut ticker = tokio::time::interval(settings.poll_interval());
    log::info!(
        "Watching for alerts every {}s. Press Ctrl-C to stop.",
        settings.poll_interval().as_secs()
    );

    tokio::pin!(shutdown);

    loop {
        // The whole tick, location wait included, races shutdown
        let tick = async {
            ticker.tick().await;
            let user = wait_for_fix(provider, timeout).await;
            coordinator.check_alerts(user)
        };

        tokio::select! {
            report = tick => print_alert_report(&report, true),
            _ = &mut shutdown => {
                log::info!("Stopping alert watch");
                break;
            }
        }
    }
}

async fn execute(cli: Cli) -> Result<(), AppError> {
    let config_manager = ConfigManager::new(cli.config_dir.clone());

    if let Command::Init = cli.command {
        let settings = Settings::default();
        config_manager.save(&settings)?;
        println!("Wrote {}", config_manager.config_path().display());
        return Ok(());
    }

    let settings = config_manager.load();
    let provider = location_provider(cli.at.as_deref(), &settings)?;
    let coordinator = build_coordinator(&settings, alarm_notifier(&settings));
    let timeout = Duration::from_millis(settings.location_timeout_ms);

    match cli.command {
        Command::Alerts => {
            let user = wait_for_fix(&provider, timeout).await;
            print_alert_report(&coordinator.check_alerts(user), false);
        }
        Command::Shelters => {
            let user = wait_for_fix(&provider, timeout).await;
            let report = coordinator.find_shelters(user);
            println!("{}", report.message);
            if report.skipped > 0 {
                println!("({} malformed shelter records skipped)", report.skipped);
            }
        }
        Command::Watch => {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            watch_alerts(&coordinator, &provider, &settings, ctrl_c).await
        }
        Command::Init => {}
    }

    Ok(())
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli))
}
