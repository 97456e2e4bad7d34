mod ui;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use matru_live::common::SubjectId;
use matru_live::config::{self, AppConfig};
use matru_live::network::{ApiClient, ApiWorker, NotificationHub};
use matru_live::sync::AlertFeed;
use tokio::sync::mpsc;
use ui::MonitorApp;

#[derive(Parser)]
#[command(
    name = "matru-live",
    version,
    about = "Live chat and alert client for maternal-health monitoring"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Mother record to open at start
    #[arg(long, value_name = "ID")]
    subject: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Print live alerts to the terminal (no UI)
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);
    let hub = NotificationHub::from_config(&app_config)?;

    if cli.mode == Some(Mode::Watch) {
        run_watch(hub, app_config.alert_capacity).await;
        return Ok(());
    }

    let api = ApiClient::from_config(&app_config)?;
    run_desktop(hub, api, &app_config, cli.subject.map(SubjectId::from))?;
    Ok(())
}

async fn run_watch(hub: NotificationHub, alert_capacity: usize) {
    let mut feed = AlertFeed::new(&hub, alert_capacity);
    log::info!("Watching live alerts; press Ctrl+C to stop");

    loop {
        tokio::select! {
            alert = feed.next() => match alert {
                Some(alert) => println!(
                    "{} [{}] {} ({}) from {}: {}",
                    alert.timestamp.format("%Y-%m-%d %H:%M"),
                    alert.priority,
                    alert.subject_name,
                    alert.subject_id,
                    alert.sender,
                    alert.content
                ),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    log::info!("Stopped watching");
}

fn run_desktop(
    hub: NotificationHub,
    api: ApiClient,
    app_config: &AppConfig,
    initial_subject: Option<SubjectId>,
) -> Result<(), eframe::Error> {
    // UI -> API worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // API worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    tokio::spawn(ApiWorker::new(api, event_tx, cmd_rx).run());

    let options = eframe::NativeOptions::default();
    let alert_capacity = app_config.alert_capacity;
    let api_url = app_config.api_base_url.clone();

    eframe::run_native(
        "MatruKavach Live",
        options,
        Box::new(move |cc| {
            log::info!("Client started against {api_url}");
            Ok(Box::new(MonitorApp::new(
                cc,
                hub,
                cmd_tx,
                event_rx,
                alert_capacity,
                initial_subject,
            )))
        }),
    )
}
