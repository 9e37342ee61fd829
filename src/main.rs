//! # GCC Bridge
//!
//! Calibration-driven input shaping for GameCube controllers.
//!
//! This application sits between a GameCube controller and the console,
//! reshaping the analog stick signal on every poll cycle according to the
//! persisted calibration image.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (path from argv, falling back to defaults)
//!    - Open the calibration image and both serial ports
//!    - Run the GCCVerify handshake window, then capture the neutral
//!      stick position
//!
//! 2. **Main Loop**
//!    - Poll the controller at the configured rate, shape the stick
//!      signal, and forward the result to the console
//!    - Any byte on the operator line suspends forwarding and opens the
//!      configuration menu
//!    - Handle Ctrl+C for graceful shutdown

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use gcc_bridge::bridge::Bridge;
use gcc_bridge::calibration::CalibrationStore;
use gcc_bridge::config::Config;
use gcc_bridge::controller::DongleSerial;
use gcc_bridge::menu::MenuSession;
use gcc_bridge::serial::{LineIo, OperatorSerial};
use gcc_bridge::storage::FileStorage;
use gcc_bridge::verify;

/// Configuration file used when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const MENU_PROMPT: &str = "Enter anything to access config menu.";

/// Load configuration from argv or the default path, falling back to
/// built-in defaults when neither file is usable.
fn load_config() -> Config {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    match Config::load(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            warn!("Failed to load {} ({}); using defaults", path, e);
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("GCC Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config();

    let storage = FileStorage::open(&config.storage.path)?;
    let store = CalibrationStore::load(storage)?;
    info!("Calibration image loaded from {}", config.storage.path);

    let mut operator_paths: Vec<&str> = vec![config.serial.port.as_str()];
    operator_paths.extend(
        config
            .serial
            .fallback_ports
            .iter()
            .map(String::as_str)
            .filter(|p| *p != config.serial.port),
    );
    let mut operator = OperatorSerial::open_with_paths(&operator_paths, config.serial.baud_rate)?;
    let mut dongle = DongleSerial::open(&config.controller.port, config.controller.baud_rate)?;

    // Boot-time verification handshake on the operator line
    let window = Duration::from_millis(config.verify.window_ms);
    verify::run_window(&mut operator, store.flags(), window, &config.verify.marker).await?;

    let mut bridge = Bridge::new(store);
    bridge.capture_neutral(&mut dongle).await?;

    if let Err(e) = operator.write_line(MENU_PROMPT).await {
        debug!("Could not write menu prompt: {}", e);
    }

    let period_us = 1_000_000 / u64::from(config.poll.rate_hz);
    let mut poll_interval = interval(Duration::from_micros(period_us));
    let value_timeout = Duration::from_millis(config.serial.timeout_ms);

    info!("Starting poll loop at {}Hz", config.poll.rate_hz);
    info!("Press Ctrl+C to exit");

    let mut last_log_count: u64 = 0;
    let mut operator_alive = true;

    // Main poll loop
    loop {
        tokio::select! {
            // Forward one controller report at the configured rate
            _ = poll_interval.tick() => {
                if let Err(e) = bridge.poll_cycle(&mut dongle).await {
                    debug!("Poll cycle failed: {}", e);
                    continue;
                }

                if bridge.cycles() - last_log_count >= config.poll.status_log_cycles {
                    info!(
                        "Completed {} poll cycles ({}Hz{})",
                        bridge.cycles(),
                        config.poll.rate_hz,
                        if bridge.disabled() { ", mods disabled" } else { "" },
                    );
                    last_log_count = bridge.cycles();
                }
            }

            // Any operator byte opens the menu; forwarding is suspended
            // until the line drops
            byte = operator.read_byte(), if operator_alive => {
                match byte {
                    Ok(byte) => {
                        info!("Operator input received, entering config menu");
                        let mut session = MenuSession::new(
                            bridge.store_mut(),
                            &mut operator,
                            value_timeout,
                        );
                        if let Err(e) = session.run(Some(byte)).await {
                            warn!("Menu session ended: {}", e);
                            operator_alive = false;
                        }
                    }
                    Err(e) => {
                        warn!("Operator line closed: {}", e);
                        operator_alive = false;
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total poll cycles: {}", bridge.cycles());
                break;
            }
        }
    }

    Ok(())
}
