//! Single-threaded in-memory page.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use url::Url;

use super::{Dialog, Document, Element, Location, Window};

type Listener = Rc<dyn Fn()>;
type TextObserver = Rc<dyn Fn(&str)>;

struct Node {
    id: Option<String>,
    classes: RefCell<Vec<String>>,
    text: RefCell<String>,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Rc<Node>>>,
    listeners: RefCell<Vec<Listener>>,
}

#[derive(Clone)]
pub struct MemoryElement(Rc<Node>);

impl MemoryElement {
    fn new(id: Option<&str>, classes: &[&str]) -> Self {
        Self(Rc::new(Node {
            id: id.map(str::to_string),
            classes: RefCell::new(classes.iter().map(|c| (*c).to_string()).collect()),
            text: RefCell::new(String::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    /// Appends `child`, moving it out of its previous container first.
    pub fn append_child(&self, child: &Self) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(Rc::clone(&child.0));
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.parent.borrow().upgrade().map(Self)
    }

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0.children.borrow().iter().cloned().map(Self).collect()
    }

    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.0.classes.borrow().clone()
    }

    /// The element's own text, without descendants.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.text.borrow().clone()
    }

    /// Own text followed by the text of every descendant, in tree order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = self.text();
        for child in self.children() {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Dispatches a click to every registered listener.
    pub fn click(&self) {
        let listeners: Vec<Listener> = self.0.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn walk(&self, visit: &mut impl FnMut(&Self)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl Element for MemoryElement {
    fn add_class(&self, class: &str) {
        let mut classes = self.0.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    fn has_parent(&self) -> bool {
        self.0.parent.borrow().upgrade().is_some()
    }

    fn detach(&self) {
        let Some(parent) = self.0.parent.replace(Weak::new()).upgrade() else {
            return;
        };
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, &self.0));
    }

    fn set_text(&self, text: &str) {
        self.0.children.borrow_mut().clear();
        *self.0.text.borrow_mut() = text.to_string();
    }

    fn add_click_listener(&self, listener: Box<dyn Fn()>) {
        self.0.listeners.borrow_mut().push(Rc::from(listener));
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("id", &self.0.id)
            .field("classes", &self.0.classes.borrow())
            .field("attached", &self.has_parent())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct DialogState {
    reveals: Cell<usize>,
    observer: RefCell<Option<TextObserver>>,
}

/// A dialog surface: an element plus a reveal counter.
#[derive(Clone)]
pub struct MemoryDialog {
    element: MemoryElement,
    state: Rc<DialogState>,
}

impl MemoryDialog {
    #[must_use]
    pub const fn element(&self) -> &MemoryElement {
        &self.element
    }

    #[must_use]
    pub fn reveal_count(&self) -> usize {
        self.state.reveals.get()
    }

    /// Called with the dialog's text content on every reveal.
    pub fn on_show(&self, observer: impl Fn(&str) + 'static) {
        *self.state.observer.borrow_mut() = Some(Rc::new(observer));
    }
}

impl Dialog for MemoryDialog {
    fn show(&self) {
        self.state.reveals.set(self.state.reveals.get() + 1);
        let observer = self.state.observer.borrow().clone();
        if let Some(observer) = observer {
            observer(&self.element.text_content());
        }
    }
}

/// Tree rooted at a `body` element, plus the dialogs created in it.
pub struct MemoryDocument {
    body: MemoryElement,
    dialogs: RefCell<Vec<MemoryDialog>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: MemoryElement::new(Some("body"), &[]),
            dialogs: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn body(&self) -> &MemoryElement {
        &self.body
    }

    /// Creates a detached element.
    #[must_use]
    pub fn create_element(&self, id: Option<&str>, classes: &[&str]) -> MemoryElement {
        MemoryElement::new(id, classes)
    }

    /// Creates a detached dialog surface.
    #[must_use]
    pub fn create_dialog(&self, id: &str) -> MemoryDialog {
        let dialog = MemoryDialog {
            element: MemoryElement::new(Some(id), &[]),
            state: Rc::new(DialogState::default()),
        };
        self.dialogs.borrow_mut().push(dialog.clone());
        dialog
    }

    fn find(&self, mut accept: impl FnMut(&MemoryElement) -> bool) -> Vec<MemoryElement> {
        let mut found = Vec::new();
        self.body.walk(&mut |el| {
            if accept(el) {
                found.push(el.clone());
            }
        });
        found
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;
    type Dialog = MemoryDialog;

    fn elements_by_class(&self, class: &str) -> Vec<MemoryElement> {
        self.find(|el| el.has_class(class))
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryElement> {
        self.find(|el| el.id() == Some(id)).into_iter().next()
    }

    fn dialog_by_id(&self, id: &str) -> Option<MemoryDialog> {
        let element = self.element_by_id(id)?;
        self.dialogs
            .borrow()
            .iter()
            .find(|dialog| dialog.element.ptr_eq(&element))
            .cloned()
    }
}

struct LocationState {
    protocol: String,
    host: String,
    reloads: Cell<usize>,
    observer: RefCell<Option<Listener>>,
}

#[derive(Clone)]
pub struct MemoryLocation(Rc<LocationState>);

impl MemoryLocation {
    #[must_use]
    pub fn new(protocol: &str, host: &str) -> Self {
        Self(Rc::new(LocationState {
            protocol: protocol.to_string(),
            host: host.to_string(),
            reloads: Cell::new(0),
            observer: RefCell::new(None),
        }))
    }

    /// Location of a page served from `url`. The host keeps the port only
    /// when it is not the scheme's default, like a browser does.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default();
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Self::new(&format!("{}:", url.scheme()), &host)
    }

    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.0.reloads.get()
    }

    /// Called on every reload.
    pub fn on_reload(&self, observer: impl Fn() + 'static) {
        *self.0.observer.borrow_mut() = Some(Rc::new(observer));
    }
}

impl Location for MemoryLocation {
    fn protocol(&self) -> String {
        self.0.protocol.clone()
    }

    fn host(&self) -> String {
        self.0.host.clone()
    }

    fn reload(&self) {
        self.0.reloads.set(self.0.reloads.get() + 1);
        let observer = self.0.observer.borrow().clone();
        if let Some(observer) = observer {
            observer();
        }
    }
}

#[derive(Clone)]
pub struct MemoryWindow {
    location: MemoryLocation,
}

impl MemoryWindow {
    #[must_use]
    pub const fn new(location: MemoryLocation) -> Self {
        Self { location }
    }
}

impl Window for MemoryWindow {
    type Location = MemoryLocation;

    fn location(&self) -> MemoryLocation {
        self.location.clone()
    }
}
