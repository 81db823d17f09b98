//! Caliper Logger - Main Entry Point
//!
//! Exit codes: 0 when the session ends normally or the operator aborts setup,
//! 1 when the device or the log cannot be set up.

use anyhow::Context;
use caliper_logger::{
    acquisition::AcquisitionWorker,
    config::{self, AppConfig, AppState, APP_STATE_FILE},
    frontend::CaliperApp,
    transport::{select_transport, DeviceTransport},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const APP_TITLE: &str = "Caliper Logger";
const LOG_FILE_PREFIX: &str = "caliper-logger.log";

fn main() {
    let guard = match init_tracing() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        }
    };

    let code = run();
    tracing::info!("Exiting with code {}", code);

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    std::process::exit(code);
}

/// Stdout plus a daily rolling file in the app data directory
fn init_tracing() -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caliper_logger=debug"));

    let (file_layer, guard) = match config::log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

fn run() -> i32 {
    tracing::info!("Starting {}", APP_TITLE);

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();

    let transport = match select_transport(&config.device) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!("{}", e);
            show_fatal(&e.to_string());
            return 1;
        }
    };
    let transport_name = transport.describe();

    let (worker, frontend) = AcquisitionWorker::new(transport, config.clone(), app_state);
    let worker = match config::ensure_app_data_dir() {
        Ok(dir) => worker.with_state_path(dir.join(APP_STATE_FILE)),
        Err(e) => {
            tracing::warn!("App state will not be saved: {}", e);
            worker
        }
    };

    let handle = match worker.spawn() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("{}", e);
            show_fatal(&e.to_string());
            return 1;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title(format!("{} - {}", APP_TITLE, config.device.name)),
        ..Default::default()
    };

    let ui_frontend = frontend.clone();
    let ui_result = eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(CaliperApp::new(
                cc,
                ui_frontend,
                &config,
                transport_name,
            )))
        }),
    );

    // The window may be gone without on_exit having run
    frontend.shutdown();

    let outcome = match handle.join() {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("Acquisition worker panicked");
            return 1;
        }
    };

    if let Err(e) = ui_result {
        tracing::error!("UI failed: {}", e);
        show_fatal(&format!("The window could not be opened: {}", e));
        return 1;
    }

    outcome.exit_code()
}

/// Blocking native error box for failures outside the egui window
fn show_fatal(message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(APP_TITLE)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
