#[path = "notify-page/app.rs"]
mod app;
#[path = "notify-page/cli.rs"]
mod cli;
#[path = "notify-page/desktop.rs"]
mod desktop;

use std::error::Error as StdError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = cli::Cli::parse_args();
    match app::run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            std::process::ExitCode::from(if err.is_connection() { 2 } else { 1 })
        }
    }
}

fn report_error(err: &page_notify::error::Error) {
    eprintln!("Error: {err}");
    let mut source: Option<&dyn StdError> = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
