//! Serial adapter for the controller dongle.
//!
//! The dongle firmware handles the bit-level joybus exchange on both
//! connectors and talks to the host in fixed-size frames: an 8-byte
//! controller state in, an 8-byte corrected state out followed by a
//! 1-byte console status, and a 1-byte rumble command back.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::controller::io::ControllerIo;
use crate::controller::report::GamecubeReport;
use crate::error::{GccBridgeError, Result};

/// Console status bit carrying the rumble request.
const STATUS_RUMBLE: u8 = 0x01;

/// Rumble command bytes sent back to the dongle.
const RUMBLE_ON: u8 = 0x01;
const RUMBLE_OFF: u8 = 0x00;

/// Serial transport to the controller dongle.
pub struct DongleSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl std::fmt::Debug for DongleSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DongleSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl DongleSerial {
    /// Open the dongle port (8N1).
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        debug!("Trying to open dongle port: {}", path);

        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GccBridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened controller dongle at {} ({} baud)", path, baud_rate);

        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Get the device path of the opened dongle port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl ControllerIo for DongleSerial {
    async fn read_report(&mut self) -> Result<GamecubeReport> {
        let mut frame = [0u8; 8];
        self.port
            .read_exact(&mut frame)
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to read state: {}", e)))?;
        Ok(GamecubeReport::from_raw(&frame))
    }

    async fn write_report(&mut self, report: &GamecubeReport) -> Result<bool> {
        self.port
            .write_all(&report.to_raw())
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to write state: {}", e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to flush dongle port: {}", e)))?;

        let mut status = [0u8; 1];
        self.port
            .read_exact(&mut status)
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to read status: {}", e)))?;
        Ok(status[0] & STATUS_RUMBLE != 0)
    }

    async fn set_rumble(&mut self, rumble: bool) -> Result<()> {
        let command = if rumble { RUMBLE_ON } else { RUMBLE_OFF };
        self.port
            .write_all(&[command])
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to write rumble: {}", e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| GccBridgeError::Controller(format!("Failed to flush dongle port: {}", e)))?;
        Ok(())
    }
}
