use url::Url;

use crate::error::ConnectionError;
use crate::types::Transport;

/// Builds `{ws|wss}://{host}{path}`. The secure scheme is used iff the page
/// itself was loaded over `https:`.
///
/// # Errors
///
/// Returns [`ConnectionError::InvalidAddress`] when `host` is empty or is not
/// a bare `host[:port]`.
pub fn notification_url(
    protocol: &str,
    host: &str,
    path: &str,
) -> std::result::Result<Url, ConnectionError> {
    let invalid = |message: &str| ConnectionError::InvalidAddress {
        host: host.to_string(),
        message: message.to_string(),
    };

    if host.is_empty() {
        return Err(invalid("page has no host"));
    }
    if host
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@' | '\\'))
    {
        return Err(invalid("host must be a bare host[:port]"));
    }

    let transport = Transport::for_page_protocol(protocol);
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{transport}://{host}/{path}"))
        .map_err(|err| invalid(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::notification_url;
    use crate::error::ConnectionError;

    #[test]
    fn insecure_page_gets_ws() {
        let url = notification_url("http:", "localhost:4567", "/notifications").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:4567/notifications");
    }

    #[test]
    fn secure_page_gets_wss() {
        let url = notification_url("https:", "localhost:4567", "/notifications").unwrap();
        assert_eq!(url.as_str(), "wss://localhost:4567/notifications");
    }

    #[test]
    fn path_without_leading_slash_is_accepted() {
        let url = notification_url("http:", "example.org", "notifications").unwrap();
        assert_eq!(url.as_str(), "ws://example.org/notifications");
    }

    #[test]
    fn rejects_hosts_that_are_not_bare() {
        for host in ["", "evil.org/x", "user@host", "a b"] {
            assert!(matches!(
                notification_url("http:", host, "/notifications"),
                Err(ConnectionError::InvalidAddress { .. })
            ));
        }
    }

    #[test]
    fn rejects_unparseable_port() {
        assert!(notification_url("http:", "localhost:99999", "/notifications").is_err());
    }
}
