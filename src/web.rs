//! Browser bindings: the page capabilities over the DOM and the browser
//! `WebSocket`, plus the page-load entry point.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::ConnectionError;
use crate::page::{Dialog, Document, Element, Location, Window};
use crate::socket::{
    CloseEvent, Connection, Connector, ErrorEvent, EventHandlers, MessageEvent, setup_web_socket,
};
use crate::telemetry::init_console_tracing;
use crate::toast::{ToastScheduler, ToastTiming, process_toast_notifications};
use crate::types::PageSelectors;

#[derive(Clone)]
pub struct WebElement(web_sys::Element);

impl Element for WebElement {
    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn has_parent(&self) -> bool {
        self.0.parent_node().is_some()
    }

    fn detach(&self) {
        if let Some(parent) = self.0.parent_node() {
            let _ = parent.remove_child(&self.0);
        }
    }

    // textContent, never innerHTML: server text must not become markup.
    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn add_click_listener(&self, listener: Box<dyn Fn()>) {
        let callback = Closure::<dyn Fn()>::new(move || listener());
        let _ = self
            .0
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

pub struct WebDialog(web_sys::HtmlDialogElement);

impl Dialog for WebDialog {
    fn show(&self) {
        self.0.show();
    }
}

#[derive(Clone)]
pub struct WebLocation(web_sys::Location);

impl Location for WebLocation {
    fn protocol(&self) -> String {
        self.0.protocol().unwrap_or_default()
    }

    fn host(&self) -> String {
        self.0.host().unwrap_or_default()
    }

    fn reload(&self) {
        let _ = self.0.reload();
    }
}

pub struct WebWindow(web_sys::Window);

impl Window for WebWindow {
    type Location = WebLocation;

    fn location(&self) -> WebLocation {
        WebLocation(self.0.location())
    }
}

pub struct WebDocument(web_sys::Document);

impl Document for WebDocument {
    type Element = WebElement;
    type Dialog = WebDialog;

    fn elements_by_class(&self, class: &str) -> Vec<WebElement> {
        let found = self.0.get_elements_by_class_name(class);
        (0..found.length())
            .filter_map(|i| found.item(i))
            .map(WebElement)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<WebElement> {
        self.0.get_element_by_id(id).map(WebElement)
    }

    fn dialog_by_id(&self, id: &str) -> Option<WebDialog> {
        self.0
            .get_element_by_id(id)?
            .dyn_into::<web_sys::HtmlDialogElement>()
            .ok()
            .map(WebDialog)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserConnector;

impl Connector for BrowserConnector {
    type Connection = BrowserConnection;

    fn open(&self, address: &url::Url) -> std::result::Result<BrowserConnection, ConnectionError> {
        web_sys::WebSocket::new(address.as_str())
            .map(BrowserConnection)
            .map_err(|err| ConnectionError::Backend(format!("{err:?}")))
    }
}

pub struct BrowserConnection(web_sys::WebSocket);

impl Connection for BrowserConnection {
    fn set_handlers(&self, handlers: EventHandlers) {
        let h = handlers.clone();
        let on_open = Closure::<dyn FnMut()>::new(move || h.emit_open());
        self.0.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let h = handlers.clone();
        let on_message = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |event: web_sys::MessageEvent| {
                h.emit_message(MessageEvent {
                    data: event.data().as_string(),
                });
            },
        );
        self.0.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        // Browsers fire a bare `Event` here; a `message` is rarely present.
        let h = handlers.clone();
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let message = js_sys::Reflect::get(&event, &JsValue::from_str("message"))
                .ok()
                .and_then(|value| value.as_string());
            h.emit_error(ErrorEvent { message });
        });
        self.0.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();

        let h = handlers;
        let on_close = Closure::<dyn FnMut(web_sys::CloseEvent)>::new(
            move |event: web_sys::CloseEvent| {
                h.emit_close(CloseEvent::new(event.code(), event.reason()));
            },
        );
        self.0.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();
    }

    fn send(&self, text: &str) -> std::result::Result<(), ConnectionError> {
        self.0.send_with_str(text).map_err(|_| ConnectionError::Closed {
            address: self.0.url(),
        })
    }

    fn close(&self) {
        let _ = self.0.close();
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis_since(start: f64) -> Duration {
    Duration::from_millis((js_sys::Date::now() - start).max(0.0) as u64)
}

/// Arms one browser timeout for the scheduler's next deadline, advancing and
/// re-arming when it fires.
fn arm(window: web_sys::Window, scheduler: Rc<RefCell<ToastScheduler<WebElement>>>, start: f64) {
    let Some(deadline) = scheduler.borrow().next_deadline() else {
        return;
    };
    let wait = deadline.saturating_sub(millis_since(start));
    let delay = i32::try_from(wait.as_millis()).unwrap_or(i32::MAX);
    let next_window = window.clone();
    let fire = Closure::once_into_js(move || {
        scheduler.borrow_mut().advance_to(millis_since(start));
        arm(next_window, scheduler, start);
    });
    let _ = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(fire.unchecked_ref(), delay);
}

/// Page-load entry point: binds the notification dialog and starts the
/// toast lifecycle with the default page contract.
///
/// # Errors
///
/// Fails when there is no window or document, or when the notification
/// connection cannot be opened.
#[wasm_bindgen(js_name = setupNotifications)]
pub fn setup_notifications() -> std::result::Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document object"))?;
    let page = WebDocument(document);
    let selectors = PageSelectors::default();
    // fails only when the embedding page installed its own subscriber
    let _ = init_console_tracing("info");

    setup_web_socket(
        &WebWindow(window.clone()),
        &page,
        &BrowserConnector,
        &selectors,
    )
    .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let scheduler = process_toast_notifications(&page, &selectors, ToastTiming::default());
    if !scheduler.is_empty() {
        arm(window, Rc::new(RefCell::new(scheduler)), js_sys::Date::now());
    }
    Ok(())
}
