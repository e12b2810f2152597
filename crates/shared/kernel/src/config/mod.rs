use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variables with this prefix override file values.
pub const ENV_PREFIX: &str = "SHOWROOM";

#[showroom_derive::showroom_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `SHOWROOM__*` environment variables.
///
/// * The file defaults to `showroom` in the working directory; the extension (`.toml`,
///   `.yaml`, `.json`, ...) is detected by the `config` crate. It is required.
/// * Nested keys use a double underscore: `SHOWROOM__DATABASE__URL` sets `database.url`.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or the merged values do not
/// deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use showroom_kernel::config::load_config;
///
/// #[derive(serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from("showroom"), |p| p.as_ref().to_path_buf());
    info!("Loading config from {}", path.display());

    Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
