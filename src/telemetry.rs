use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

/// Installs the global `tracing` subscriber.
///
/// The filter is taken from `explicit_filter`, then `RUST_LOG`, then falls
/// back to `info`; the first candidate that parses wins.
///
/// # Errors
///
/// Returns an error when no filter candidate parses, when JSON output is
/// requested without the `json-logs` feature, or when a global subscriber is
/// already installed.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = [
        explicit_filter.map(str::to_string),
        std::env::var("RUST_LOG").ok(),
        Some("info".to_string()),
    ]
    .into_iter()
    .flatten()
    .find_map(|candidate| EnvFilter::try_new(candidate).ok())
    .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true),
        );
        return tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()));
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    // stdout carries the dialog output, logs go to stderr.
    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

/// Routes `tracing` events to the browser console, one console line per
/// event.
///
/// # Errors
///
/// Returns an error when `filter` does not parse or when a global subscriber
/// is already installed.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub fn init_console_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).map_err(|err| Error::Telemetry(err.to_string()))?;
    // no wall clock on wasm32-unknown-unknown
    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .without_time()
            .with_writer(|| {
                EventLine::new(|line: &str| {
                    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
                })
            }),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

/// Buffers one formatted event and hands it to `sink` when dropped.
#[cfg(any(test, all(feature = "web", target_arch = "wasm32")))]
struct EventLine<F: Fn(&str)> {
    buf: Vec<u8>,
    sink: F,
}

#[cfg(any(test, all(feature = "web", target_arch = "wasm32")))]
impl<F: Fn(&str)> EventLine<F> {
    const fn new(sink: F) -> Self {
        Self {
            buf: Vec::new(),
            sink,
        }
    }
}

#[cfg(any(test, all(feature = "web", target_arch = "wasm32")))]
impl<F: Fn(&str)> std::io::Write for EventLine<F> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(any(test, all(feature = "web", target_arch = "wasm32")))]
impl<F: Fn(&str)> Drop for EventLine<F> {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            (self.sink)(line);
        }
    }
}
