use std::fmt::{self, Display};

pub const DEFAULT_DIALOG_ID: &str = "ws-modal";
pub const DEFAULT_MESSAGE_ID: &str = "ws-message";
pub const DEFAULT_REFRESH_ID: &str = "ws-button";
pub const DEFAULT_TOAST_CLASS: &str = "toast-notification";
pub const DEFAULT_SHOWN_CLASS: &str = "show";
pub const DEFAULT_ENDPOINT_PATH: &str = "/notifications";

/// Transport flavour of the notification channel, picked from the page's own
/// protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transport {
    Ws,
    Wss,
}

impl Transport {
    /// `https:` pages get the secure scheme, anything else the plain one.
    #[must_use]
    pub fn for_page_protocol(protocol: &str) -> Self {
        if protocol.trim_end_matches(':').eq_ignore_ascii_case("https") {
            Self::Wss
        } else {
            Self::Ws
        }
    }

    #[must_use]
    pub const fn as_scheme(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_scheme())
    }
}

/// Identifiers of the page elements the notification layer binds to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageSelectors {
    pub dialog_id: String,
    pub message_id: String,
    pub refresh_id: String,
    pub toast_class: String,
    pub shown_class: String,
    pub endpoint_path: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            dialog_id: DEFAULT_DIALOG_ID.to_string(),
            message_id: DEFAULT_MESSAGE_ID.to_string(),
            refresh_id: DEFAULT_REFRESH_ID.to_string(),
            toast_class: DEFAULT_TOAST_CLASS.to_string(),
            shown_class: DEFAULT_SHOWN_CLASS.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Transport;

    #[test]
    fn secure_pages_use_wss() {
        assert_eq!(Transport::for_page_protocol("https:"), Transport::Wss);
        assert_eq!(Transport::for_page_protocol("HTTPS"), Transport::Wss);
        assert_eq!(Transport::for_page_protocol("http:"), Transport::Ws);
        assert_eq!(Transport::for_page_protocol("file:"), Transport::Ws);
    }

    #[test]
    fn transport_displays_as_its_scheme() {
        assert_eq!(Transport::Wss.to_string(), "wss");
        assert_eq!(Transport::Ws.as_scheme(), "ws");
    }
}
