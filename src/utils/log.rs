use crate::utils::config::LogConfig;
use crate::utils::error::AppError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{daily, RollingFileAppender};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

pub struct Logger;

impl Logger {
    /// Installs the global subscriber. When logging to a file the returned
    /// guard must be held until shutdown or buffered lines are lost.
    pub fn init(log_config: &LogConfig) -> Result<Option<WorkerGuard>, AppError> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));
        let json = log_config.format.eq_ignore_ascii_case("json");

        let (layer, guard): (BoxedLayer, Option<WorkerGuard>) = match log_config.output.as_str() {
            "file" => {
                let file_appender =
                    Self::create_file_appender(&log_config.file_path, &log_config.file_name)?;
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let base = fmt::layer()
                    .with_writer(non_blocking)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_ansi(false);
                let layer = if json { base.json().boxed() } else { base.boxed() };
                (layer, Some(guard))
            }
            _ => {
                let base = fmt::layer().with_timer(fmt::time::UtcTime::rfc_3339());
                let layer = if json { base.json().boxed() } else { base.boxed() };
                (layer, None)
            }
        };

        let subscriber = Registry::default().with(env_filter).with(layer);
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| AppError::LoggingError(e.to_string()))?;

        Ok(guard)
    }

    fn create_file_appender(
        log_dir: &str,
        file_name: &str,
    ) -> Result<RollingFileAppender, AppError> {
        let log_path = Path::new(log_dir);
        std::fs::create_dir_all(log_path)?;

        Ok(daily(log_path, file_name))
    }
}
