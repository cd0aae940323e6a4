use std::path::PathBuf;
use std::rc::Rc;

use chrono::Local;
use page_notify::Result;
use page_notify::config::Config;
use page_notify::error::{ConfigError, Error as NotifyError};
use page_notify::page::{Document, Element, MemoryDocument, MemoryLocation, MemoryWindow};
use page_notify::socket::native::{TungsteniteConnection, TungsteniteConnector};
use page_notify::socket::{NotificationSocket, setup_web_socket};
use page_notify::telemetry::init_tracing;
use page_notify::toast::process_toast_notifications;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, LocalSet};
use tracing::{debug, info, warn};

use super::cli::Cli;
use super::desktop;

const DEFAULT_CONFIG: &str = "notify-page.toml";

type StdinLines = Lines<BufReader<Stdin>>;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let mut config = match cli.config {
        Some(path) => Config::from_env_and_required_file(path)?,
        None => Config::from_env_and_file(PathBuf::from(DEFAULT_CONFIG))?,
    };

    if let Some(url) = cli.url {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(NotifyError::from(ConfigError::InvalidField {
                field: "cli.url",
                message: format!("expected an http(s) page address, got {url}"),
            }));
        }
        config.page_url = url;
    }
    if !cli.toasts.is_empty() {
        config.toasts = cli.toasts;
    }
    if let Some(hide_after) = cli.hide_after {
        if hide_after.is_zero() {
            return Err(NotifyError::from(ConfigError::InvalidField {
                field: "cli.hide_after",
                message: "must be greater than zero".to_string(),
            }));
        }
        config.timing.hide_after = hide_after;
    }
    if cli.desktop {
        config.desktop.enabled = true;
    }

    LocalSet::new().run_until(serve(config)).await
}

enum Outcome {
    Reload,
    Quit,
}

/// Loads the page, then loads it again after every reload until the user
/// quits.
async fn serve(config: Config) -> Result<()> {
    let mut stdin = Some(BufReader::new(tokio::io::stdin()).lines());
    loop {
        let reload = Rc::new(Notify::new());
        let session = Session::open(&config, Rc::clone(&reload))?;
        let outcome = session.drive(&reload, &mut stdin).await;
        session.close();
        match outcome {
            Outcome::Quit => break,
            Outcome::Reload => info!(url = %config.page_url, "page reloaded"),
        }
    }
    Ok(())
}

/// One page load: the page tree, its notification connection and its toast
/// timers.
struct Session<'a> {
    config: &'a Config,
    document: MemoryDocument,
    socket: NotificationSocket<TungsteniteConnection>,
    toasts: JoinHandle<()>,
}

impl<'a> Session<'a> {
    fn open(config: &'a Config, reload: Rc<Notify>) -> Result<Self> {
        let document = build_page(config);

        let location = MemoryLocation::from_url(&config.page_url);
        location.on_reload(move || reload.notify_one());
        let window = MemoryWindow::new(location);

        let scheduler = process_toast_notifications(&document, &config.selectors, config.timing);
        let toasts = tokio::task::spawn_local(scheduler.run());

        let socket = setup_web_socket(&window, &document, &TungsteniteConnector, &config.selectors)?;
        info!(url = %config.page_url, address = %socket.address(), "page loaded");

        Ok(Self {
            config,
            document,
            socket,
            toasts,
        })
    }

    async fn drive(&self, reload: &Notify, stdin: &mut Option<StdinLines>) -> Outcome {
        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("shutdown signal received");
                    return Outcome::Quit;
                }
                () = reload.notified() => return Outcome::Reload,
                line = next_line(stdin) => {
                    let Some(command) = line.as_deref().and_then(Command::parse) else {
                        continue;
                    };
                    if let Some(outcome) = self.apply(command) {
                        return outcome;
                    }
                }
            }
        }
    }

    fn apply(&self, command: Command) -> Option<Outcome> {
        match command {
            Command::Refresh => {
                match self.document.element_by_id(&self.config.selectors.refresh_id) {
                    Some(button) => button.click(),
                    None => warn!("page has no refresh control"),
                }
                None
            }
            Command::Send(text) => {
                if let Err(err) = self.socket.send(&text) {
                    warn!(error = %err, "cannot send on notification channel");
                }
                None
            }
            Command::Quit => Some(Outcome::Quit),
            Command::Unknown(input) => {
                warn!(input = %input, "unknown command (r, send <text>, q)");
                None
            }
        }
    }

    fn close(self) {
        self.socket.close();
        self.toasts.abort();
    }
}

/// Dialog holding the message slot and the refresh control, then one element
/// per configured toast text.
fn build_page(config: &Config) -> MemoryDocument {
    let selectors = &config.selectors;
    let document = MemoryDocument::new();

    let dialog = document.create_dialog(&selectors.dialog_id);
    dialog
        .element()
        .append_child(&document.create_element(Some(&selectors.message_id), &[]));
    dialog
        .element()
        .append_child(&document.create_element(Some(&selectors.refresh_id), &[]));
    document.body().append_child(dialog.element());

    let settings = config.desktop.clone();
    dialog.on_show(move |text| {
        println!("[{}] {text}", Local::now().format("%H:%M:%S"));
        if settings.enabled {
            desktop::mirror(&settings, text);
        }
    });

    for text in &config.toasts {
        let toast = document.create_element(None, &[selectors.toast_class.as_str()]);
        toast.set_text(text);
        document.body().append_child(&toast);
    }
    document
}

/// Next stdin line; pends forever once stdin is exhausted.
async fn next_line(stdin: &mut Option<StdinLines>) -> Option<String> {
    let Some(lines) = stdin.as_mut() else {
        return std::future::pending().await;
    };
    match lines.next_line().await {
        Ok(Some(line)) => Some(line),
        Ok(None) => {
            debug!("stdin closed, keyboard commands disabled");
            *stdin = None;
            None
        }
        Err(err) => {
            warn!(error = %err, "cannot read stdin, keyboard commands disabled");
            *stdin = None;
            None
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Refresh,
    Send(String),
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let command = match line {
            "r" | "refresh" => Self::Refresh,
            "q" | "quit" => Self::Quit,
            _ => match line.strip_prefix("send ") {
                Some(text) => Self::Send(text.trim_start().to_string()),
                None => Self::Unknown(line.to_string()),
            },
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, build_page};
    use page_notify::config::Config;
    use page_notify::page::{Document, Element};

    #[test]
    fn parses_keyboard_commands() {
        assert_eq!(Command::parse(" r "), Some(Command::Refresh));
        assert_eq!(Command::parse("refresh"), Some(Command::Refresh));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(
            Command::parse("send  hello there"),
            Some(Command::Send("hello there".to_string()))
        );
        assert_eq!(
            Command::parse("reload"),
            Some(Command::Unknown("reload".to_string()))
        );
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn built_page_follows_the_markup_contract() {
        let mut config = Config::defaults().unwrap();
        config.toasts = vec!["Offer saved".to_string(), "Item added".to_string()];
        let document = build_page(&config);

        let dialog = document.dialog_by_id("ws-modal").unwrap();
        let slot = document.element_by_id("ws-message").unwrap();
        let button = document.element_by_id("ws-button").unwrap();
        assert!(slot.parent().unwrap().ptr_eq(dialog.element()));
        assert!(button.parent().unwrap().ptr_eq(dialog.element()));

        let toasts = document.elements_by_class("toast-notification");
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].text(), "Offer saved");
        assert!(toasts.iter().all(Element::has_parent));
    }
}
