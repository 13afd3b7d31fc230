use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use hireo_client::{ClientConfig, ClientHandle, NotificationClient, WsConnector};
use hireo_core::{NotificationId, PageContext, Permission, UserIdentity};
use hireo_settings::{load_settings, load_settings_from_path, NotifySettings};
use hireo_telemetry::{init_telemetry, TelemetryConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

mod console;

use console::ConsoleRenderer;

/// Follow Hireo notifications from the terminal.
#[derive(Debug, Parser)]
#[command(name = "hireo-notify", version)]
struct Args {
    /// Site origin, e.g. https://jobs.example.com
    #[arg(long)]
    origin: String,

    /// Signed-in user. Without one the client stays inert.
    #[arg(long)]
    user_id: Option<String>,

    #[arg(long)]
    username: Option<String>,

    /// Raw Cookie header for the handshake, e.g. `sessionid=...`
    #[arg(long)]
    cookie: Option<String>,

    /// Settings file (default: ~/.hireo/notify.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base page title
    #[arg(long)]
    title: Option<String>,

    /// Treat OS notification permission as granted
    #[arg(long)]
    os_notifications: bool,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Read(NotificationId),
    ReadAll,
    Refresh,
    Status,
    Quit,
}

fn parse_input(line: &str) -> anyhow::Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let input = match command {
        "read" => {
            let Some(raw) = words.next() else {
                bail!("usage: read <id>");
            };
            Input::Read(NotificationId::from_str(raw).unwrap_or_else(|never| match never {}))
        }
        "read-all" => Input::ReadAll,
        "refresh" => Input::Refresh,
        "status" => Input::Status,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command {other:?} (read <id>, read-all, refresh, status, quit)"),
    };
    Ok(Some(input))
}

fn load(args: &Args) -> anyhow::Result<NotifySettings> {
    let mut settings = match &args.config {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => load_settings().context("loading settings")?,
    };
    if let Some(level) = &args.log_level {
        settings.logging.level = level.clone();
    }
    if args.json_logs {
        settings.logging.json = true;
    }
    if let Some(title) = &args.title {
        settings.display.title = title.clone();
    }
    Ok(settings)
}

fn page_context(args: &Args, settings: &NotifySettings) -> PageContext {
    let mut page = PageContext::new(args.origin.as_str(), settings.display.title.as_str());
    if let Some(id) = &args.user_id {
        page = page.with_user(UserIdentity {
            id: id.clone(),
            username: args.username.clone(),
        });
    }
    if args.os_notifications {
        page = page.with_permission(Permission::Granted);
    }
    page
}

async fn dispatch(handle: &ClientHandle, input: Input) -> bool {
    match input {
        Input::Read(id) => handle.mark_read(id).await,
        Input::ReadAll => handle.mark_all_read().await,
        Input::Refresh => handle.refresh().await,
        Input::Status => {
            let snapshot = handle.snapshot();
            println!("{} | {} unread", snapshot.status.label(), snapshot.unread);
        }
        Input::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load(&args)?;
    init_telemetry(&TelemetryConfig::from_settings(&settings.logging)?)?;

    let page = page_context(&args, &settings);
    let mut connector = WsConnector::new();
    if let Some(cookie) = &args.cookie {
        connector = connector.with_cookie(cookie.as_str());
    }

    let Some((handle, client)) = NotificationClient::spawn(
        page,
        ClientConfig::from(&settings),
        Arc::new(connector),
        Arc::new(ConsoleRenderer::new()),
    ) else {
        tracing::info!("no user id given, nothing to follow");
        return Ok(());
    };
    tracing::info!(origin = %args.origin, "notification client started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(Some(input)) => {
                        if !dispatch(&handle, input).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down");
    client.abort();
    Ok(())
}
