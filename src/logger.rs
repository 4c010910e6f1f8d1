use crate::routines::settings::Settings;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

/// Setup logging for the library
///
/// This function sets up logging for the library. It uses the `tracing`
/// crate, and the `tracing-subscriber` crate for formatting.
///
/// The log level is defined in the configuration file, and defaults to `INFO`.
///
/// If `log_file` is specified in the configuration file, a log file is
/// created with the specified name and receives the same messages as stdout.
pub fn setup_log(settings: &Settings) {
    let log_level = settings.log_level.to_lowercase();
    let env_filter = EnvFilter::new(&log_level);

    let subscriber = Registry::default().with(env_filter);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(CompactTimestamp);

    let file_layer = settings.log_file.as_ref().map(|log_file| {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file)
            .expect("Failed to open log file - does the directory exist?");

        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_timer(CompactTimestamp)
    });

    subscriber.with(stdout_layer).with(file_layer).init();
    tracing::debug!("Logging is configured with level: {}", log_level);
}

#[derive(Clone)]
struct CompactTimestamp;

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}
