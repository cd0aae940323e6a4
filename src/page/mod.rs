//! Capability interfaces over a page.
//!
//! The notification layer never touches a concrete DOM. It talks to these
//! traits, implemented over the browser (`web` feature) and over an in-memory
//! tree ([`memory`]) used by the native host and the tests.

pub mod memory;

pub use memory::{MemoryDialog, MemoryDocument, MemoryElement, MemoryLocation, MemoryWindow};

/// A handle to one page element. Handles are cheap to clone and all clones
/// refer to the same element.
pub trait Element: Clone {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn has_parent(&self) -> bool;
    /// Removes the element from its parent container. No-op when detached.
    fn detach(&self);
    /// Replaces the element's content with plain text. The text is never
    /// interpreted as markup.
    fn set_text(&self, text: &str);
    fn add_click_listener(&self, listener: Box<dyn Fn()>);
}

/// The modal surface that presents server messages.
pub trait Dialog {
    fn show(&self);
}

pub trait Location {
    /// Page protocol including the trailing colon, e.g. `https:`.
    fn protocol(&self) -> String;
    /// Hostname plus non-default port, e.g. `localhost:4567`.
    fn host(&self) -> String;
    fn reload(&self);
}

pub trait Window {
    type Location: Location + Clone + 'static;

    fn location(&self) -> Self::Location;
}

pub trait Document {
    type Element: Element + 'static;
    type Dialog: Dialog + 'static;

    /// Elements carrying `class`, in document order.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn dialog_by_id(&self, id: &str) -> Option<Self::Dialog>;
}
