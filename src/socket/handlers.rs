//! Connection lifecycle events and their callback slots.

use std::fmt;
use std::rc::Rc;

/// Payload of an inbound message. `None` when the frame carried no text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    pub data: Option<String>,
}

impl MessageEvent {
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }
}

/// A connection-level failure. The description is best effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: Option<String>,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Close code 1005: the peer's close frame carried no status code.
pub const NO_STATUS: u16 = 1005;

/// Close code 1006: the connection dropped without a closing handshake.
pub const ABNORMAL_CLOSURE: u16 = 1006;
pub const NORMAL_CLOSURE: u16 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseEvent {
    pub code: Option<u16>,
    pub reason: Option<String>,
}

impl CloseEvent {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            code: Some(code),
            reason: (!reason.is_empty()).then_some(reason),
        }
    }

    #[must_use]
    pub const fn no_status() -> Self {
        Self {
            code: Some(NO_STATUS),
            reason: None,
        }
    }

    #[must_use]
    pub const fn abnormal() -> Self {
        Self {
            code: Some(ABNORMAL_CLOSURE),
            reason: None,
        }
    }
}

impl fmt::Display for CloseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, self.code) {
            (Some(reason), Some(code)) => write!(f, "{reason} (code: {code})"),
            (Some(reason), None) => f.write_str(reason),
            (None, Some(code)) => write!(f, "code: {code}"),
            (None, None) => f.write_str("closed"),
        }
    }
}

pub type OnOpenCallback = Rc<dyn Fn()>;
pub type OnMessageCallback = Rc<dyn Fn(MessageEvent)>;
pub type OnErrorCallback = Rc<dyn Fn(ErrorEvent)>;
pub type OnCloseCallback = Rc<dyn Fn(CloseEvent)>;

/// The four callback slots of a connection. Every slot is optional; an
/// empty slot drops its events.
///
/// Callbacks are `Rc`-based: connections deliver events on the page's single
/// event loop, never from another thread.
#[derive(Clone, Default)]
pub struct EventHandlers {
    on_open: Option<OnOpenCallback>,
    on_message: Option<OnMessageCallback>,
    on_error: Option<OnErrorCallback>,
    on_close: Option<OnCloseCallback>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_open", &self.on_open.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl EventHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_open(mut self, f: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_message(mut self, f: impl Fn(MessageEvent) + 'static) -> Self {
        self.on_message = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(ErrorEvent) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_close(mut self, f: impl Fn(CloseEvent) + 'static) -> Self {
        self.on_close = Some(Rc::new(f));
        self
    }

    pub fn emit_open(&self) {
        if let Some(f) = &self.on_open {
            f();
        }
    }

    pub fn emit_message(&self, event: MessageEvent) {
        if let Some(f) = &self.on_message {
            f(event);
        }
    }

    pub fn emit_error(&self, event: ErrorEvent) {
        if let Some(f) = &self.on_error {
            f(event);
        }
    }

    pub fn emit_close(&self, event: CloseEvent) {
        if let Some(f) = &self.on_close {
            f(event);
        }
    }
}
