#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::sync::Arc;

use anyhow::Result;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod attachment;
mod chatapp;
mod chatapp_ui;
mod config;
mod controller;
mod endpoint;
mod error;
mod gemini;
mod message;
mod relay;
mod session;

use chatapp::ChatApp;
use config::Config;
use controller::ChatController;
use gemini::GeminiClient;
use relay::Relay;
use session::SessionManager;

const STARTUP_FAILURE: &str =
    "Error initializing the Gemini client. Please wait a few minutes and try again.";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn exit_on_startup_failure(error: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %error, "startup failed");
    eprintln!("{STARTUP_FAILURE}");
    std::process::exit(1);
}

fn main() -> Result<()> {
    // .env first so RUST_LOG from it applies
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::from_env().unwrap_or_else(|e| exit_on_startup_failure(&e));
    tracing::info!(?config, "configuration loaded");

    let client = GeminiClient::new(config.endpoint.clone(), config.api_key.clone())
        .unwrap_or_else(|e| exit_on_startup_failure(&e));

    let runtime = tokio::runtime::Runtime::new()?;
    let start = runtime.block_on(SessionManager::initialize(Arc::new(client), &config.model));
    let controller = ChatController::new(Relay::new(start.session));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MedMed - Multimodal Assistant")
            .with_inner_size([1000.0, 650.0]),
        ..Default::default()
    };

    let first_message = start.message;
    eframe::run_native(
        "MedMed - Multimodal Assistant",
        options,
        Box::new(move |cc| {
            Box::new(ChatApp::new(
                cc,
                runtime,
                controller,
                first_message,
                &config.icon_path,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
