//! Relay control panel: live relay state with confirmed switch-off.
//!
//! Required env: OCTOPRINT_API_KEY
//! Optional: OCTOPRINT_URL, PANEL_PLUGIN_ID, PANEL_RECONNECT_SECS

use anyhow::Context;
use clap::Parser;
use panel::bus::PushBus;
use panel::cli::{self, Input};
use panel::config::Config;
use panel::error::PanelError;
use panel::panel::{Panel, PanelEvent};
use panel::session::{self, SessionInfo};
use panel::surface::PanelView;
use panel::{render, transport};
use shared::RelayKey;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = Config::from_env().context("config")?;

    match cli.command.unwrap_or(cli::Commands::Run { relays: Vec::new() }) {
        cli::Commands::CheckConfig => {
            println!("plugin:  {}", config.plugin_id);
            println!("push:    {}", config.push_url());
            println!("command: {}", config.command_url());
            println!("login:   {}", config.login_url());
        }
        cli::Commands::Run { relays } => run(config, relays).await?,
    }

    Ok(())
}

async fn run(config: Config, relays: Vec<String>) -> anyhow::Result<()> {
    let info = match session::login(&config).await {
        Ok(info) => info,
        Err(PanelError::LoginRejected) => {
            tracing::warn!("Login rejected, panel is read-only");
            SessionInfo::default()
        }
        Err(e) => return Err(e).context("login"),
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let bus = PushBus::new();
    let mut subscription = bus.subscribe_plugin(config.plugin_id.clone());
    tokio::spawn({
        let config = config.clone();
        let session = info.clone();
        let events_tx = events_tx.clone();
        async move {
            transport::run_push_client(&config, session, bus, move |state| {
                let _ = events_tx.send(PanelEvent::Login(state));
            })
            .await;
        }
    });

    let (queue, commands) = transport::command_channel();
    tokio::spawn(transport::run_dispatcher(
        transport::CommandClient::new(&config),
        commands,
    ));

    tokio::spawn({
        let events_tx = events_tx.clone();
        async move {
            while let Some(msg) = subscription.recv().await {
                if events_tx.send(PanelEvent::Push(msg)).is_err() {
                    break;
                }
            }
        }
    });

    let auto_mount = relays.is_empty();
    let mut view = PanelView::new();
    for key in relays {
        view.mount(RelayKey::new(key));
    }
    let panel = Panel::new(&config.plugin_id, view, info.login_state(), queue)
        .with_auto_mount(auto_mount);

    let input = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match cli::parse_input(&line) {
                Some(Input::Event(event)) => {
                    if events_tx.send(event).is_err() {
                        break;
                    }
                }
                Some(Input::Quit) => break,
                None if line.trim().is_empty() => {}
                None => eprintln!("unknown input: {}", line.trim()),
            }
        }
    };

    tokio::select! {
        _ = panel.run(events_rx, |view| println!("{}--", render::render_view(view))) => {}
        _ = input => tracing::info!("Input closed"),
    }

    Ok(())
}
