//! Binding between the push-notification connection and the page.
//!
//! [`setup_web_socket`] resolves the dialog surface, opens one connection to
//! `{ws|wss}://{host}/notifications` through a [`Connector`] and routes the
//! four connection events to the shared display routine:
//!
//! - open: diagnostic trace only
//! - message: `[Server] <payload>`, or a placeholder for empty payloads
//! - error: `[Client] WebSocket Error: <description>`
//! - close: diagnostic trace only
//!
//! The refresh control, when present, reloads the page on click.

mod address;
mod handlers;
pub mod loopback;
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod native;

use std::rc::Rc;

use tracing::{debug, info, warn};
use url::Url;

use crate::display::{client_error, log, refresh_window, server_message};
use crate::error::ConnectionError;
use crate::page::{Document, Element, Location, Window};
use crate::types::PageSelectors;

pub use address::notification_url;
pub use handlers::{
    ABNORMAL_CLOSURE, CloseEvent, ErrorEvent, EventHandlers, MessageEvent, NO_STATUS,
    NORMAL_CLOSURE,
};

/// An open push-notification channel.
pub trait Connection {
    /// Replaces the four callback slots.
    fn set_handlers(&self, handlers: EventHandlers);

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// Fails once the connection is closed.
    fn send(&self, text: &str) -> std::result::Result<(), ConnectionError>;

    /// Starts the closing handshake. The close handler fires when it
    /// completes.
    fn close(&self);
}

/// Opens connections; the substitution point for tests and hosts.
pub trait Connector {
    type Connection: Connection;

    /// # Errors
    ///
    /// Returns an error when the backend refuses to start a connection.
    fn open(&self, address: &Url) -> std::result::Result<Self::Connection, ConnectionError>;
}

/// The connection opened by [`setup_web_socket`], with the address it
/// targets.
pub struct NotificationSocket<C> {
    address: Url,
    connection: C,
}

impl<C: Connection> NotificationSocket<C> {
    #[must_use]
    pub const fn address(&self) -> &Url {
        &self.address
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// # Errors
    ///
    /// Fails once the connection is closed.
    pub fn send(&self, text: &str) -> std::result::Result<(), ConnectionError> {
        self.connection.send(text)
    }

    pub fn close(&self) {
        self.connection.close();
    }
}

/// Opens the page's notification connection and binds its events to the
/// dialog. Missing page elements are tolerated: the display routine turns
/// into a no-op and the refresh control is simply not wired.
///
/// # Errors
///
/// Returns an error when the page host does not form a valid address or when
/// the connector cannot open a connection.
pub fn setup_web_socket<W, D, C>(
    window: &W,
    document: &D,
    connector: &C,
    selectors: &PageSelectors,
) -> std::result::Result<NotificationSocket<C::Connection>, ConnectionError>
where
    W: Window,
    D: Document,
    C: Connector,
{
    let dialog = document.dialog_by_id(&selectors.dialog_id);
    let slot = document.element_by_id(&selectors.message_id);
    let refresh = document.element_by_id(&selectors.refresh_id);
    if dialog.is_none() || slot.is_none() {
        warn!(
            dialog = %selectors.dialog_id,
            found_dialog = dialog.is_some(),
            slot = %selectors.message_id,
            found_slot = slot.is_some(),
            "notification dialog incomplete, messages will not be displayed"
        );
    }

    let location = window.location();
    let address = notification_url(
        &location.protocol(),
        &location.host(),
        &selectors.endpoint_path,
    )?;
    let connection = connector.open(&address)?;

    let surface = Rc::new((dialog, slot));
    let on_message = Rc::clone(&surface);
    let on_error = surface;
    let open_address = address.to_string();
    let close_address = address.to_string();

    connection.set_handlers(
        EventHandlers::new()
            .on_open(move || {
                info!(address = %open_address, "[Client] WebSocket open connection!");
            })
            .on_message(move |event: MessageEvent| {
                let text = server_message(event.data.as_deref());
                log(&text, on_message.0.as_ref(), on_message.1.as_ref());
            })
            .on_error(move |event: ErrorEvent| {
                let text = client_error(event.message.as_deref());
                log(&text, on_error.0.as_ref(), on_error.1.as_ref());
            })
            .on_close(move |event: CloseEvent| {
                info!(
                    address = %close_address,
                    code = event.code,
                    reason = event.reason.as_deref().unwrap_or(""),
                    "[Client] Connection closed."
                );
            }),
    );

    if let Some(button) = refresh {
        button.add_click_listener(Box::new(move || refresh_window(Some(&location))));
    } else {
        debug!(id = %selectors.refresh_id, "no refresh control on page");
    }

    info!(address = %address, "notification channel opening");
    Ok(NotificationSocket {
        address,
        connection,
    })
}
