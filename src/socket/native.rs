//! Native connector over `tokio-tungstenite`.
//!
//! Each connection is pumped by a task spawned with
//! [`tokio::task::spawn_local`], so [`TungsteniteConnector::open`] must be
//! called from inside a [`tokio::task::LocalSet`]. Events are delivered on
//! that local set, one at a time, like a browser event loop.

use std::cell::RefCell;
use std::rc::Rc;

use async_channel::{Receiver, Sender, unbounded};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tracing::{debug, trace, warn};
use url::Url;

use super::handlers::{CloseEvent, ErrorEvent, EventHandlers, MessageEvent};
use super::{Connection, Connector};
use crate::error::ConnectionError;

enum Command {
    Send(String),
    Close,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TungsteniteConnector;

impl Connector for TungsteniteConnector {
    type Connection = TungsteniteConnection;

    fn open(&self, address: &Url) -> std::result::Result<TungsteniteConnection, ConnectionError> {
        let (tx, rx) = unbounded();
        let handlers = Rc::new(RefCell::new(EventHandlers::new()));
        tokio::task::spawn_local(pump(address.to_string(), rx, Rc::clone(&handlers)));
        Ok(TungsteniteConnection {
            address: address.clone(),
            handlers,
            commands: tx,
        })
    }
}

pub struct TungsteniteConnection {
    address: Url,
    handlers: Rc<RefCell<EventHandlers>>,
    commands: Sender<Command>,
}

impl Connection for TungsteniteConnection {
    fn set_handlers(&self, handlers: EventHandlers) {
        *self.handlers.borrow_mut() = handlers;
    }

    fn send(&self, text: &str) -> std::result::Result<(), ConnectionError> {
        self.commands
            .try_send(Command::Send(text.to_string()))
            .map_err(|_| ConnectionError::Closed {
                address: self.address.to_string(),
            })
    }

    fn close(&self) {
        if self.commands.try_send(Command::Close).is_ok() {
            self.commands.close();
        }
    }
}

impl Drop for TungsteniteConnection {
    fn drop(&mut self) {
        self.commands.close();
    }
}

/// Borrow-free snapshot so a callback may replace the handlers.
fn current(handlers: &RefCell<EventHandlers>) -> EventHandlers {
    handlers.borrow().clone()
}

async fn pump(address: String, commands: Receiver<Command>, handlers: Rc<RefCell<EventHandlers>>) {
    let mut ws = match connect_async(address.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(err) => {
            warn!(%address, error = %err, "notification channel failed to connect");
            current(&handlers).emit_error(ErrorEvent::new(err.to_string()));
            current(&handlers).emit_close(CloseEvent::abnormal());
            return;
        }
    };
    current(&handlers).emit_open();

    let mut closing = false;
    let close = loop {
        tokio::select! {
            command = commands.recv(), if !closing => match command {
                Ok(Command::Send(text)) => {
                    if let Err(err) = ws.send(Message::Text(text)).await {
                        current(&handlers).emit_error(ErrorEvent::new(err.to_string()));
                        break CloseEvent::abnormal();
                    }
                }
                // an explicit close, or the page dropped its handle
                Ok(Command::Close) | Err(_) => {
                    closing = true;
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "".into(),
                    };
                    if let Err(err) = ws.close(Some(frame)).await {
                        debug!(%address, error = %err, "closing handshake failed");
                        break CloseEvent::abnormal();
                    }
                }
            },
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    current(&handlers).emit_message(MessageEvent { data: Some(text) });
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => current(&handlers).emit_message(MessageEvent { data: Some(text) }),
                    Err(_) => trace!(%address, "non UTF-8 binary frame ignored"),
                },
                Some(Ok(Message::Close(frame))) => {
                    // tungstenite only queues the reply; it leaves on flush
                    if let Err(err) = ws.flush().await {
                        trace!(%address, error = %err, "close reply flush ended the stream");
                    }
                    break close_event(frame.as_ref());
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(err)) => {
                    current(&handlers).emit_error(ErrorEvent::new(err.to_string()));
                    break CloseEvent::abnormal();
                }
                None => break CloseEvent::abnormal(),
            },
        }
    };
    current(&handlers).emit_close(close);
}

/// Close frames without a payload read as 1005, like a browser reports them.
fn close_event(frame: Option<&CloseFrame<'_>>) -> CloseEvent {
    frame.map_or_else(CloseEvent::no_status, |f| {
        CloseEvent::new(f.code.into(), f.reason.to_string())
    })
}
