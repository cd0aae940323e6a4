use page_notify::config::DesktopSettings;

#[cfg(target_os = "linux")]
pub fn mirror(settings: &DesktopSettings, text: &str) {
    use notify_rust::{Notification, Timeout};
    use tracing::{trace, warn};

    let timeout = u32::try_from(settings.timeout.as_millis())
        .map_or(Timeout::Default, Timeout::Milliseconds);
    match Notification::new()
        .summary(&settings.appname)
        .body(text)
        .appname(&settings.appname)
        .timeout(timeout)
        .show()
    {
        Ok(_) => trace!("desktop notification sent"),
        Err(err) => warn!(error = %err, "desktop notification failed"),
    }
}

#[cfg(not(target_os = "linux"))]
pub fn mirror(settings: &DesktopSettings, text: &str) {
    let _ = (settings, text);
    tracing::debug!("desktop notifications are only wired on Linux");
}
