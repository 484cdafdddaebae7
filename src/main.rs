use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod api;
mod columns;
mod controller;
mod domain;
mod edit;
mod filter;
mod format;
mod gender;
mod inputter;
mod model;
mod pager;
mod records;
mod session;
mod store;
mod ui;

use api::ApiClient;
use controller::Controller;
use domain::{AppConfig, AppError};
use model::{Model, Status};
use session::Session;
use ui::TableUI;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// A tui based dashboard for tracking employee absenteeism.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base url of the backend api
    #[arg(long)]
    api_url: Option<String>,

    /// Client whose dataset to load
    #[arg(long)]
    client_id: Option<i64>,

    /// Restrict the dataset to a single upload batch
    #[arg(long)]
    upload_id: Option<i64>,

    /// Bearer token for the backend api
    #[arg(long)]
    token: Option<String>,

    /// Rows per page
    #[arg(long, default_value_t = 50)]
    page_size: usize,

    /// Write a trace log to this file
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        let log = std::sync::Arc::new(File::create(path)?);
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(ErrorLayer::default())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(log)
                    .with_ansi(false),
            )
            .init();
    }

    // Command line arguments win over the stored session; whatever the
    // user passed explicitly becomes the session for the next start.
    let mut session = Session::load();
    if cli.api_url.is_some() {
        session.api_url = cli.api_url.clone();
    }
    if cli.client_id.is_some() {
        session.client_id = cli.client_id;
    }
    if cli.token.is_some() {
        session.token = cli.token.clone();
    }
    session.save()?;

    let config = AppConfig {
        event_poll_time: 100,
        page_size: cli.page_size,
        max_column_width: 40,
        api_url: session
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        client_id: session.client_id,
        upload_id: cli.upload_id,
    };
    info!("Starting faltas against {}", config.api_url);

    let api = ApiClient::new(config.api_url.clone(), session.token.clone());
    let ui = TableUI::new();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(config, api, size.width as usize, size.height as usize)?;
    model.reload();

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}
