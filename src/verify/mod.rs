//! # GCCVerify Handshake
//!
//! Startup capability handshake for external verification tooling. For a
//! fixed window after boot, bytes arriving on the operator line are
//! buffered; if the accumulated text contains the verification marker, the
//! bridge emits a machine-readable manifest of its identity and per-feature
//! parameters, then continues normal startup.
//!
//! The manifest field names and numeric values are an external contract
//! (GCCVerify matches them against its expected mod parameters) and must
//! not drift, even where they differ from the thresholds in
//! [`crate::pipeline::stages`].

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::calibration::{Feature, FeatureSet};
use crate::error::Result;
use crate::serial::LineIo;

/// Firmware name reported to verification tooling.
pub const FW_NAME: &str = "Hax-WatchingTime";

/// Capability manifest emitted on a successful handshake.
#[derive(Debug, Serialize)]
pub struct Manifest {
    name: &'static str,
    major_version: u32,
    minor_version: u32,
    mods: Vec<ModEntry>,
}

#[derive(Debug, Serialize)]
struct ModEntry {
    name: &'static str,
    enabled: bool,
    values: Vec<ValueEntry>,
}

#[derive(Debug, Serialize)]
struct ValueEntry {
    name: &'static str,
    value: u32,
}

fn value(name: &'static str, value: u32) -> ValueEntry {
    ValueEntry { name, value }
}

impl Manifest {
    /// Builds the manifest for the current flag state.
    #[must_use]
    pub fn build(flags: &FeatureSet) -> Self {
        let mods = vec![
            ModEntry {
                name: Feature::MaxVectors.name(),
                enabled: flags.is_enabled(Feature::MaxVectors),
                values: vec![
                    value("analog_radius", 75),
                    value("analog_angle", 6),
                    // The C-stick snap is a cartesian box; these describe
                    // the minimum polar radius/angle that gets snapped.
                    value("c_radius", 79),
                    value("c_angle", 17),
                ],
            },
            ModEntry {
                name: Feature::PerfectAngles.name(),
                enabled: flags.is_enabled(Feature::PerfectAngles),
                values: vec![
                    value("radius", 75),
                    value("angle_min", 6),
                    value("angle_max", 19),
                ],
            },
            ModEntry {
                name: Feature::ShieldDropExpand.name(),
                enabled: flags.is_enabled(Feature::ShieldDropExpand),
                values: vec![value("radius", 72), value("angle", 4)],
            },
            ModEntry {
                name: Feature::DashBack.name(),
                enabled: flags.is_enabled(Feature::DashBack),
                values: vec![value("frames", 1)],
            },
            ModEntry {
                name: Feature::DolphinFix.name(),
                enabled: flags.is_enabled(Feature::DolphinFix),
                values: vec![
                    value("analog_radius", 8),
                    value("c_radius", 8),
                    value("dash_back_frames", 6),
                ],
            },
        ];

        Self {
            name: FW_NAME,
            major_version: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor_version: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            mods,
        }
    }

    /// Serializes to the single-line wire form (JSON + CRLF).
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails (it cannot for this type).
    pub fn to_wire(&self) -> Result<String> {
        let json = serde_json::to_string(self)
            .map_err(|e| crate::error::GccBridgeError::Serial(format!("manifest: {}", e)))?;
        Ok(format!("{}\r\n", json))
    }
}

/// Listens for the verification marker during the boot window.
///
/// Buffers incoming bytes until the window lapses or the marker appears;
/// on a match, writes the manifest and returns true. A transport error ends
/// the window quietly (no terminal attached is the normal case).
pub async fn run_window<T: LineIo>(
    transport: &mut T,
    flags: &FeatureSet,
    window: Duration,
    marker: &str,
) -> Result<bool> {
    let deadline = Instant::now() + window;
    let mut buffer = String::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!("Verify window lapsed without marker");
            return Ok(false);
        }

        match tokio::time::timeout(remaining, transport.read_byte()).await {
            Ok(Ok(byte)) => {
                buffer.push(char::from(byte));
                if buffer.contains(marker) {
                    info!("Verification marker received; sending manifest");
                    let manifest = Manifest::build(flags);
                    transport.write_str(&manifest.to_wire()?).await?;
                    return Ok(true);
                }
            }
            Ok(Err(_)) | Err(_) => {
                debug!("Verify window closed without marker");
                return Ok(false);
            }
        }
    }
}
