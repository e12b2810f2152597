//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: a compact coloured console layer and,
//! once a directory is given, a non-blocking rolling file layer (plain text or JSON).
//!
//! The builder is typestated: a name is required before [`LoggerBuilder::init`] is
//! available, and file-only knobs (rotation, retention, JSON) only exist after
//! [`LoggerBuilder::path`].
//!
//! ```rust
//! # use showroom_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("showroom")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("showroom=debug,tower_http=info")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Line format of the rolling log files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug)]
struct FileSettings {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    format: FileFormat,
}

#[derive(Debug)]
struct Settings {
    console: bool,
    level: LevelFilter,
    directives: Option<String>,
    file: Option<FileSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, directives: None, file: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Typestated builder for the global subscriber.
#[derive(Debug)]
#[must_use = "the builder does nothing until `init` is called"]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: Settings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the application. The name prefixes rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()), file: PhantomData }
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Default directives such as `showroom=debug,hyper=warn`. `RUST_LOG` is only read
    /// when no directives are given.
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Writes rolling log files (daily, ten kept) into `directory`.
    pub fn path(self, directory: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.file = Some(FileSettings {
            directory: directory.into(),
            rotation: Rotation::DAILY,
            max_files: 10,
            format: FileFormat::Text,
        });
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker guard; keep it alive until
    /// shutdown or buffered lines are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero retention, a bad
    ///   filter or when no layer is enabled.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        validate(&self.settings, &name)?;

        let filter = env_filter(&self.settings)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.settings.console {
            layers.push(fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match self.settings.file {
            Some(file) => {
                let (layer, guard) = file_layer(&name, file)?;
                layers.push(layer);
                Some(guard)
            }
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Neither console nor file output is enabled".into(),
                context: None,
            });
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .context("Installing global subscriber")?;

        Ok(Logger { guard })
    }
}

impl LoggerBuilder<WithName, WithFile> {
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files kept on disk.
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.max_files = max;
        }
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.format = format;
        }
        self
    }
}

/// Handle to the installed subscriber.
#[must_use = "dropping the handle stops the background log writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: NoName, file: PhantomData }
    }

    /// `true` when a rolling file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

fn file_layer(name: &str, file: FileSettings) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    std::fs::create_dir_all(&file.directory)
        .context(format!("Creating log directory {}", file.directory.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(file.rotation)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(file.max_files)
        .build(&file.directory)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);

    let boxed = match file.format {
        FileFormat::Text => layer.boxed(),
        FileFormat::Json => layer.json().boxed(),
    };
    Ok((boxed, guard))
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.file.as_ref().is_some_and(|file| file.max_files == 0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match settings.directives.as_deref() {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid filter '{directives}': {e}").into(),
                context: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_info_to_console_only() {
        let builder = Logger::builder().name("showroom");
        assert!(builder.settings.console);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert!(builder.settings.file.is_none());
    }

    #[test]
    fn file_knobs_apply_after_path() {
        let builder = Logger::builder()
            .name("showroom")
            .path("logs")
            .rotation(Rotation::HOURLY)
            .max_files(3)
            .format(FileFormat::Json);

        let file = builder.settings.file.as_ref().unwrap();
        assert_eq!(file.directory, PathBuf::from("logs"));
        assert_eq!(file.max_files, 3);
        assert_eq!(file.format, FileFormat::Json);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = validate(&Settings::default(), "  ").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_retention_is_rejected() {
        let builder = Logger::builder().name("showroom").path("logs").max_files(0);
        assert!(validate(&builder.settings, "showroom").is_err());
    }

    #[test]
    fn malformed_directives_are_rejected() {
        let settings =
            Settings { directives: Some("showroom=[".to_owned()), ..Settings::default() };
        assert!(env_filter(&settings).is_err());
    }

    #[test]
    fn no_output_is_rejected_before_installing() {
        let err = Logger::builder().name("showroom").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
