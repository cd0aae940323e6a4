use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;
use crate::toast::ToastTiming;
use crate::types::PageSelectors;

use super::defaults::{
    default_desktop_appname, default_desktop_timeout, default_dialog_id, default_endpoint_path,
    default_hide_after, default_message_id, default_page_url, default_refresh_id,
    default_removal_delay, default_shown_class, default_stagger, default_toast_class,
};
use super::env::{env_bool, env_duration, env_string};
use super::{Config, DesktopSettings, ENV_PREFIX, FlexibleDuration};

pub(super) fn load(path: &Path) -> std::result::Result<RawConfig, ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) page: RawPage,
    #[serde(default)]
    pub(super) toast: RawToast,
    #[serde(default)]
    pub(super) desktop: RawDesktop,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPage {
    #[serde(default = "default_page_url")]
    pub(super) url: String,
    #[serde(default = "default_dialog_id")]
    pub(super) dialog_id: String,
    #[serde(default = "default_message_id")]
    pub(super) message_id: String,
    #[serde(default = "default_refresh_id")]
    pub(super) refresh_id: String,
    #[serde(default = "default_toast_class")]
    pub(super) toast_class: String,
    #[serde(default = "default_shown_class")]
    pub(super) shown_class: String,
    #[serde(default = "default_endpoint_path")]
    pub(super) endpoint_path: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawToast {
    #[serde(default = "default_stagger")]
    #[serde_as(as = "FlexibleDuration")]
    pub(super) stagger: Duration,
    #[serde(default = "default_hide_after")]
    #[serde_as(as = "FlexibleDuration")]
    pub(super) hide_after: Duration,
    #[serde(default = "default_removal_delay")]
    #[serde_as(as = "FlexibleDuration")]
    pub(super) removal_delay: Duration,
    /// Texts of the toasts present when the page loads.
    #[serde(default)]
    pub(super) messages: Vec<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawDesktop {
    #[serde(default)]
    pub(super) enabled: bool,
    #[serde(default = "default_desktop_appname")]
    pub(super) appname: String,
    #[serde(default = "default_desktop_timeout")]
    #[serde_as(as = "FlexibleDuration")]
    pub(super) timeout: Duration,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("PAGE_URL")? {
            self.page.url = url;
        }
        if let Some(path) = env_string("PAGE_ENDPOINT_PATH")? {
            self.page.endpoint_path = path;
        }
        if let Some(stagger) = env_duration("TOAST_STAGGER")? {
            self.toast.stagger = stagger;
        }
        if let Some(hide_after) = env_duration("TOAST_HIDE_AFTER")? {
            self.toast.hide_after = hide_after;
        }
        if let Some(delay) = env_duration("TOAST_REMOVAL_DELAY")? {
            self.toast.removal_delay = delay;
        }
        if let Some(enabled) = env_bool("DESKTOP_NOTIFY")? {
            self.desktop.enabled = enabled;
        }
        if let Some(appname) = env_string("DESKTOP_APPNAME")? {
            self.desktop.appname = appname;
        }
        if let Some(timeout) = env_duration("DESKTOP_TIMEOUT")? {
            self.desktop.timeout = timeout;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let page_url = Url::parse(self.page.url.trim()).map_err(|err| {
            ConfigError::InvalidField {
                field: "page.url",
                message: err.to_string(),
            }
        })?;
        if !matches!(page_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidField {
                field: "page.url",
                message: format!("expected an http or https URL, got {}", page_url.scheme()),
            }
            .into());
        }
        if page_url.host_str().is_none() {
            return Err(ConfigError::InvalidField {
                field: "page.url",
                message: "URL has no host".to_string(),
            }
            .into());
        }

        let identifiers = [
            ("page.dialog_id", &self.page.dialog_id),
            ("page.message_id", &self.page.message_id),
            ("page.refresh_id", &self.page.refresh_id),
            ("page.toast_class", &self.page.toast_class),
            ("page.shown_class", &self.page.shown_class),
        ];
        for (field, value) in identifiers {
            if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidField {
                    field,
                    message: format!("expected a single non-empty identifier, got {value:?}"),
                }
                .into());
            }
        }

        let endpoint_path = format!("/{}", self.page.endpoint_path.trim().trim_start_matches('/'));

        if self.toast.hide_after.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "toast.hide_after",
                message: "hide delay must be greater than zero".to_string(),
            }
            .into());
        }
        if self.desktop.enabled && self.desktop.appname.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "desktop.appname",
                message: "application name cannot be empty".to_string(),
            }
            .into());
        }

        Ok(Config {
            page_url,
            selectors: PageSelectors {
                dialog_id: self.page.dialog_id,
                message_id: self.page.message_id,
                refresh_id: self.page.refresh_id,
                toast_class: self.page.toast_class,
                shown_class: self.page.shown_class,
                endpoint_path,
            },
            timing: ToastTiming {
                stagger: self.toast.stagger,
                hide_after: self.toast.hide_after,
                removal_delay: self.toast.removal_delay,
            },
            toasts: self.toast.messages,
            desktop: DesktopSettings {
                enabled: self.desktop.enabled,
                appname: self.desktop.appname,
                timeout: self.desktop.timeout,
            },
        })
    }
}

impl Default for RawPage {
    fn default() -> Self {
        Self {
            url: default_page_url(),
            dialog_id: default_dialog_id(),
            message_id: default_message_id(),
            refresh_id: default_refresh_id(),
            toast_class: default_toast_class(),
            shown_class: default_shown_class(),
            endpoint_path: default_endpoint_path(),
        }
    }
}

impl Default for RawToast {
    fn default() -> Self {
        Self {
            stagger: default_stagger(),
            hide_after: default_hide_after(),
            removal_delay: default_removal_delay(),
            messages: Vec::new(),
        }
    }
}

impl Default for RawDesktop {
    fn default() -> Self {
        Self {
            enabled: false,
            appname: default_desktop_appname(),
            timeout: default_desktop_timeout(),
        }
    }
}
