use std::time::Duration;

use crate::toast::{DEFAULT_HIDE_AFTER, DEFAULT_REMOVAL_DELAY, DEFAULT_STAGGER};
use crate::types::{
    DEFAULT_DIALOG_ID, DEFAULT_ENDPOINT_PATH, DEFAULT_MESSAGE_ID, DEFAULT_REFRESH_ID,
    DEFAULT_SHOWN_CLASS, DEFAULT_TOAST_CLASS,
};

pub(super) fn default_page_url() -> String {
    "http://localhost:4567/".to_string()
}

pub(super) fn default_dialog_id() -> String {
    DEFAULT_DIALOG_ID.to_string()
}

pub(super) fn default_message_id() -> String {
    DEFAULT_MESSAGE_ID.to_string()
}

pub(super) fn default_refresh_id() -> String {
    DEFAULT_REFRESH_ID.to_string()
}

pub(super) fn default_toast_class() -> String {
    DEFAULT_TOAST_CLASS.to_string()
}

pub(super) fn default_shown_class() -> String {
    DEFAULT_SHOWN_CLASS.to_string()
}

pub(super) fn default_endpoint_path() -> String {
    DEFAULT_ENDPOINT_PATH.to_string()
}

pub(super) const fn default_stagger() -> Duration {
    DEFAULT_STAGGER
}

pub(super) const fn default_hide_after() -> Duration {
    DEFAULT_HIDE_AFTER
}

pub(super) const fn default_removal_delay() -> Duration {
    DEFAULT_REMOVAL_DELAY
}

pub(super) fn default_desktop_appname() -> String {
    "Notify Page".to_string()
}

pub(super) const fn default_desktop_timeout() -> Duration {
    Duration::from_secs(5)
}
