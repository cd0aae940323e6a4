//! In-process connector whose events are driven by the caller.
//!
//! Stands in for the network in tests and offline hosts: the connector keeps
//! every connection it opened, and each connection exposes methods that play
//! the server side (`accept`, `deliver`, `fail`, `drop_with`).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

use super::handlers::{CloseEvent, ErrorEvent, EventHandlers, MessageEvent, NORMAL_CLOSURE};
use super::{Connection, Connector};
use crate::error::ConnectionError;

#[derive(Clone, Default)]
pub struct LoopbackConnector {
    opened: Rc<RefCell<Vec<LoopbackConnection>>>,
}

impl LoopbackConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn connections(&self) -> Vec<LoopbackConnection> {
        self.opened.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<LoopbackConnection> {
        self.opened.borrow().last().cloned()
    }
}

impl Connector for LoopbackConnector {
    type Connection = LoopbackConnection;

    fn open(&self, address: &Url) -> std::result::Result<LoopbackConnection, ConnectionError> {
        let connection = LoopbackConnection(Rc::new(State {
            address: address.clone(),
            handlers: RefCell::new(EventHandlers::new()),
            sent: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        }));
        self.opened.borrow_mut().push(connection.clone());
        Ok(connection)
    }
}

struct State {
    address: Url,
    handlers: RefCell<EventHandlers>,
    sent: RefCell<Vec<String>>,
    closed: Cell<bool>,
}

#[derive(Clone)]
pub struct LoopbackConnection(Rc<State>);

impl LoopbackConnection {
    #[must_use]
    pub fn address(&self) -> &Url {
        &self.0.address
    }

    /// Frames the page sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.0.sent.borrow().clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.closed.get()
    }

    /// Completes the opening handshake.
    pub fn accept(&self) {
        if !self.is_closed() {
            self.handlers().emit_open();
        }
    }

    /// Delivers a server frame; ignored once closed.
    pub fn deliver(&self, data: Option<&str>) {
        if !self.is_closed() {
            self.handlers().emit_message(MessageEvent {
                data: data.map(str::to_string),
            });
        }
    }

    /// Raises a connection error, optionally with a description.
    pub fn fail(&self, message: Option<&str>) {
        if !self.is_closed() {
            self.handlers().emit_error(ErrorEvent {
                message: message.map(str::to_string),
            });
        }
    }

    /// Server-side close. The close handler fires once.
    pub fn drop_with(&self, event: CloseEvent) {
        if !self.0.closed.replace(true) {
            self.handlers().emit_close(event);
        }
    }

    // Cloned out so a callback may replace the handlers while running.
    fn handlers(&self) -> EventHandlers {
        self.0.handlers.borrow().clone()
    }
}

impl Connection for LoopbackConnection {
    fn set_handlers(&self, handlers: EventHandlers) {
        *self.0.handlers.borrow_mut() = handlers;
    }

    fn send(&self, text: &str) -> std::result::Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed {
                address: self.0.address.to_string(),
            });
        }
        self.0.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn close(&self) {
        self.drop_with(CloseEvent::new(NORMAL_CLOSURE, ""));
    }
}

#[cfg(test)]
mod tests {
    use super::LoopbackConnector;
    use crate::error::ConnectionError;
    use crate::socket::{CloseEvent, Connection, Connector, EventHandlers};
    use std::cell::Cell;
    use std::rc::Rc;
    use url::Url;

    #[test]
    fn closed_connection_stops_delivering() {
        let connector = LoopbackConnector::new();
        let address = Url::parse("ws://localhost:4567/notifications").unwrap();
        let conn = connector.open(&address).unwrap();

        let messages = Rc::new(Cell::new(0));
        let closes = Rc::new(Cell::new(0));
        let (m, c) = (Rc::clone(&messages), Rc::clone(&closes));
        conn.set_handlers(
            EventHandlers::new()
                .on_message(move |_| m.set(m.get() + 1))
                .on_close(move |_| c.set(c.get() + 1)),
        );

        conn.deliver(Some("one"));
        conn.close();
        conn.close();
        conn.drop_with(CloseEvent::abnormal());
        conn.deliver(Some("two"));

        assert_eq!(messages.get(), 1);
        assert_eq!(closes.get(), 1);
        assert!(matches!(conn.send("late"), Err(ConnectionError::Closed { .. })));
        assert_eq!(connector.connections().len(), 1);
    }

    #[test]
    fn send_records_frames() {
        let connector = LoopbackConnector::new();
        let address = Url::parse("ws://localhost/notifications").unwrap();
        let conn = connector.open(&address).unwrap();
        conn.send("ping").unwrap();
        assert_eq!(conn.sent(), vec!["ping".to_string()]);
        assert_eq!(conn.address().as_str(), "ws://localhost/notifications");
    }
}
