pub mod analytics;
pub mod attendance;
pub mod capture;
pub mod catalog;
pub mod cli;
pub mod db;
pub mod models;
pub mod platform;
pub mod ports;
pub mod settings;
mod utils;

#[cfg(test)]
mod test_support;

use std::{env, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use attendance::AttendanceController;
use capture::CaptureSimulator;
use catalog::Catalog;
use cli::Reply;
use db::Database;
use platform::{ChannelNavigator, SimulatedCamera, SimulatedGeolocation};
use ports::{Route, SystemClock, ThreadRandom};
use settings::SettingsStore;

pub struct AppState {
    pub db: Database,
    pub controller: AttendanceController,
    pub settings: SettingsStore,
    pub catalog: Catalog,
}

fn data_dir() -> PathBuf {
    match env::var_os("ATTENDLY_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => env::temp_dir().join("attendly"),
    }
}

fn debug_mode() -> bool {
    env::var("ATTENDLY_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Wires the simulated devices, the in-memory backend and the attendance controller.
/// Must be called inside a tokio runtime.
pub fn build_state() -> Result<(AppState, mpsc::UnboundedReceiver<Route>)> {
    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    let mut capture = settings.capture();
    if debug_mode() {
        info!("ATTENDLY_DEBUG set; shortening simulated capture durations");
        capture = capture.debug_scaled();
    }

    let database = Database::in_memory()?;
    let catalog = Catalog::demo(Utc::now());

    let simulator = CaptureSimulator::new(
        capture,
        Arc::new(ThreadRandom),
        Arc::new(SimulatedCamera::granting()),
        Arc::new(SimulatedGeolocation::available()),
    );
    let (navigator, routes) = ChannelNavigator::new();
    let controller = AttendanceController::new(
        catalog.current_class.clone(),
        simulator,
        Arc::new(database.clone()),
        Arc::new(navigator),
        Arc::new(SystemClock),
    );

    Ok((
        AppState {
            db: database,
            controller,
            settings,
            catalog,
        },
        routes,
    ))
}

async fn repl(state: Arc<AppState>, mut routes: mpsc::UnboundedReceiver<Route>) -> Result<()> {
    let (notice_tx, mut notices) = mpsc::unbounded_channel::<String>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let class = &state.catalog.current_class;
    println!(
        "{} {} with {} in {}, {}",
        class.code, class.subject, class.faculty, class.room, class.building
    );
    println!("{}", cli::HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match cli::parse(&line) {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };

                match cli::execute(&state, command, &notice_tx).await {
                    Ok(Reply::Print(text)) if text.is_empty() => {}
                    Ok(Reply::Print(text)) => println!("{text}"),
                    Ok(Reply::Quit) => break,
                    Err(err) => println!("error: {err}"),
                }
            }
            Some(notice) = notices.recv() => println!("{notice}"),
            Some(route) = routes.recv() => println!("-> {}", route.path()),
        }
    }

    state.controller.shutdown().await;
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Attendly starting up...");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(async {
        let (state, routes) = build_state()?;
        repl(Arc::new(state), routes).await
    });

    if let Err(err) = &result {
        error!("Attendly exited with error: {err:#}");
    }
    result
}
