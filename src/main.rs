use anyhow::{anyhow, Result};
use eframe::egui;
use mocktalk::relay::{RelayConfig, SessionRelay};
use mocktalk::service::{VapiConfig, VapiService};
use mocktalk::ui::InterviewApp;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mocktalk=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mocktalk interview practice");

    let config = RelayConfig::from_env();
    let problem = config.problem;
    let vapi = VapiConfig::new(config.api_key.clone().unwrap_or_default())
        .with_base_url(config.base_url.clone());
    let (relay, handle) = SessionRelay::new(config, Box::new(VapiService::new(vapi)));

    // The relay owns all session state on one task; give it its own runtime
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let relay_thread = std::thread::Builder::new()
        .name("session-relay".to_string())
        .spawn(move || runtime.block_on(relay.run()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Mocktalk"),
        ..Default::default()
    };

    let app_handle = handle.clone();
    let result = eframe::run_native(
        "Mocktalk",
        options,
        Box::new(move |cc| Ok(Box::new(InterviewApp::new(cc, app_handle, problem)))),
    );

    // on_exit has usually sent this already
    let _ = handle.shutdown();
    drop(handle);
    if relay_thread.join().is_err() {
        warn!("Session relay thread panicked");
    }

    result.map_err(|e| anyhow!("UI error: {}", e))
}
