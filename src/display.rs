//! The shared display routine behind every inbound connection event.

use tracing::debug;

use crate::page::{Dialog, Element, Location};

pub const SERVER_PREFIX: &str = "[Server] ";
pub const EMPTY_MESSAGE: &str = "[Server] Received empty message.";
pub const CLIENT_ERROR_PREFIX: &str = "[Client] WebSocket Error: ";

/// Writes `message` into the slot as plain text and reveals the dialog.
/// Does nothing unless both the dialog and the slot are present.
pub fn log<D, E>(message: &str, dialog: Option<&D>, slot: Option<&E>)
where
    D: Dialog + ?Sized,
    E: Element,
{
    let (Some(dialog), Some(slot)) = (dialog, slot) else {
        debug!(text = message, "dialog or message slot missing, message dropped");
        return;
    };
    slot.set_text(message);
    dialog.show();
    debug!(text = message, "dialog revealed");
}

/// Reloads the page when a location is available.
pub fn refresh_window<L: Location + ?Sized>(location: Option<&L>) {
    if let Some(location) = location {
        location.reload();
    }
}

/// Text shown for an inbound payload; empty or absent payloads get the
/// placeholder.
#[must_use]
pub fn server_message(payload: Option<&str>) -> String {
    match payload {
        Some(data) if !data.is_empty() => format!("{SERVER_PREFIX}{data}"),
        _ => EMPTY_MESSAGE.to_string(),
    }
}

/// Text shown for a connection error; a missing description reads
/// `undefined`.
#[must_use]
pub fn client_error(description: Option<&str>) -> String {
    format!("{CLIENT_ERROR_PREFIX}{}", description.unwrap_or("undefined"))
}
