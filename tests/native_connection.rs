#![allow(clippy::unwrap_used, clippy::expect_used)]
#![cfg(feature = "native")]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use page_notify::page::{MemoryDocument, MemoryLocation, MemoryWindow};
use page_notify::socket::native::TungsteniteConnector;
use page_notify::socket::{Connection, Connector, EventHandlers, setup_web_socket};
use page_notify::types::PageSelectors;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::LocalSet;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

type Journal = Rc<RefCell<Vec<String>>>;

/// Handlers that journal every event and wake `closed` on close.
fn journaling(journal: &Journal, closed: &Rc<Notify>) -> EventHandlers {
    let (open, message, error, close) = (
        Rc::clone(journal),
        Rc::clone(journal),
        Rc::clone(journal),
        Rc::clone(journal),
    );
    let closed = Rc::clone(closed);
    EventHandlers::new()
        .on_open(move || open.borrow_mut().push("open".to_string()))
        .on_message(move |event| {
            message
                .borrow_mut()
                .push(format!("message {}", event.data.unwrap_or_default()));
        })
        .on_error(move |_| error.borrow_mut().push("error".to_string()))
        .on_close(move |event| {
            close.borrow_mut().push(format!("close {event}"));
            closed.notify_one();
        })
}

async fn listener() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = Url::parse(&format!("ws://127.0.0.1:{port}/notifications")).unwrap();
    (listener, url)
}

#[tokio::test]
async fn frames_flow_both_ways_until_the_server_closes() {
    let (listener, url) = listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("Hello".to_string())).await.unwrap();
        ws.send(Message::Binary(b"bytes".to_vec())).await.unwrap();

        let mut received = Vec::new();
        while let Some(Ok(frame)) = ws.next().await {
            if let Message::Text(text) = frame {
                received.push(text);
                break;
            }
        }
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "bye".into(),
        }))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
        received
    });

    LocalSet::new()
        .run_until(async move {
            let journal = Journal::default();
            let closed = Rc::new(Notify::new());
            let connection = TungsteniteConnector.open(&url).unwrap();
            connection.set_handlers(journaling(&journal, &closed));
            connection.send("ping").unwrap();

            timeout(WAIT, closed.notified()).await.unwrap();
            assert_eq!(
                *journal.borrow(),
                vec![
                    "open".to_string(),
                    "message Hello".to_string(),
                    "message bytes".to_string(),
                    "close bye (code: 1001)".to_string(),
                ]
            );
            assert!(connection.send("late").is_err());
        })
        .await;

    let received = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(received, vec!["ping".to_string()]);
}

#[tokio::test]
async fn server_close_is_answered_with_a_close_frame() {
    let (listener, url) = listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "bye".into(),
        }))
        .await
        .unwrap();

        let mut outcome = Vec::new();
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Close(_)) => outcome.push("close".to_string()),
                Ok(_) => {}
                Err(err) => {
                    outcome.push(format!("err {err}"));
                    break;
                }
            }
        }
        outcome
    });

    LocalSet::new()
        .run_until(async move {
            let journal = Journal::default();
            let closed = Rc::new(Notify::new());
            let connection = TungsteniteConnector.open(&url).unwrap();
            connection.set_handlers(journaling(&journal, &closed));

            timeout(WAIT, closed.notified()).await.unwrap();
            assert_eq!(
                journal.borrow().last().map(String::as_str),
                Some("close bye (code: 1001)")
            );
        })
        .await;

    let outcome = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(outcome, vec!["close".to_string()]);
}

#[tokio::test]
async fn client_close_is_reported_once() {
    let (listener, url) = listener().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut saw_close = false;
        while let Some(Ok(frame)) = ws.next().await {
            if let Message::Close(Some(frame)) = frame {
                saw_close = frame.code == CloseCode::Normal;
            }
        }
        saw_close
    });

    LocalSet::new()
        .run_until(async move {
            let journal = Journal::default();
            let closed = Rc::new(Notify::new());
            let connection = TungsteniteConnector.open(&url).unwrap();
            connection.set_handlers(journaling(&journal, &closed));
            connection.close();

            timeout(WAIT, closed.notified()).await.unwrap();
            let events = journal.borrow().clone();
            assert_eq!(events.first().map(String::as_str), Some("open"));
            assert_eq!(
                events.iter().filter(|e| e.starts_with("close")).count(),
                1
            );
        })
        .await;

    assert!(timeout(WAIT, server).await.unwrap().unwrap());
}

#[tokio::test]
async fn refused_connection_is_shown_in_the_dialog() {
    let (listener, url) = listener().await;
    let host = format!("127.0.0.1:{}", url.port().unwrap());
    drop(listener);

    LocalSet::new()
        .run_until(async move {
            let document = MemoryDocument::new();
            let dialog = document.create_dialog("ws-modal");
            let message = document.create_element(Some("ws-message"), &[]);
            dialog.element().append_child(&message);
            document.body().append_child(dialog.element());

            let revealed = Rc::new(Notify::new());
            let wake = Rc::clone(&revealed);
            dialog.on_show(move |_| wake.notify_one());

            let socket = setup_web_socket(
                &MemoryWindow::new(MemoryLocation::new("http:", &host)),
                &document,
                &TungsteniteConnector,
                &PageSelectors::default(),
            )
            .unwrap();
            assert_eq!(
                socket.address().as_str(),
                format!("ws://{host}/notifications")
            );

            timeout(WAIT, revealed.notified()).await.unwrap();
            assert!(message.text().starts_with("[Client] WebSocket Error: "));
            assert_eq!(dialog.reveal_count(), 1);
        })
        .await;
}
