use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::Result;
use crate::error::{ConfigError, Error as NotifyError};
use crate::toast::ToastTiming;
use crate::types::PageSelectors;

mod defaults;
mod env;
mod raw;
mod serde;

use self::serde::FlexibleDuration;

/// Prefix of the structured environment source, e.g.
/// `NOTIFY_PAGE__TOAST__HIDE_AFTER=4s`.
pub const ENV_PREFIX: &str = "NOTIFY_PAGE";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the hosted page is considered loaded from.
    pub page_url: Url,
    pub selectors: PageSelectors,
    pub timing: ToastTiming,
    /// Toasts present in the page markup at load time.
    pub toasts: Vec<String>,
    pub desktop: DesktopSettings,
}

/// Mirroring of dialog reveals to desktop notifications.
#[derive(Debug, Clone)]
pub struct DesktopSettings {
    pub enabled: bool,
    pub appname: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path.as_ref()).map_err(NotifyError::from)?;
        raw.apply_env_overrides().map_err(NotifyError::from)?;
        raw.validate_and_build()
    }

    /// Like [`Config::from_env_and_file`], but the file must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] when the file cannot be accessed,
    /// then the same errors as [`Config::from_env_and_file`].
    pub fn from_env_and_required_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_env_and_file(path)
    }

    /// Built-in defaults, without reading any file or the environment.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in defaults stop validating.
    pub fn defaults() -> Result<Self> {
        raw::RawConfig::default().validate_and_build()
    }
}
