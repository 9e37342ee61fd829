//! # Serial Communication Module
//!
//! Line-oriented serial transport for the operator: the GCCVerify handshake
//! at boot and the configuration menu afterwards.
//!
//! This module handles:
//! - Opening the serial port at the configured baud (8N1)
//! - Async byte reads and line writes
//! - A trait seam with an in-memory mock for testing

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{GccBridgeError, Result};

/// Default device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

/// Trait for the operator line transport
#[async_trait]
pub trait LineIo: Send {
    /// Await and return the next byte from the line.
    async fn read_byte(&mut self) -> Result<u8>;

    /// Write text followed by CRLF.
    async fn write_line(&mut self, line: &str) -> Result<()>;

    /// Write text as-is.
    async fn write_str(&mut self, text: &str) -> Result<()>;
}

/// Serial port handler for the operator transport.
pub struct OperatorSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for OperatorSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl OperatorSerial {
    /// Open the configured port, falling back to common device paths.
    ///
    /// # Errors
    ///
    /// Returns error if no device can be opened.
    pub fn open(preferred: &str, baud_rate: u32) -> Result<Self> {
        let mut paths = vec![preferred];
        paths.extend(
            DEFAULT_DEVICE_PATHS
                .iter()
                .filter(|p| **p != preferred),
        );
        Self::open_with_paths(&paths, baud_rate)
    }

    /// Open the first path that accepts a connection.
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened operator serial at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(GccBridgeError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GccBridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl LineIo for OperatorSerial {
    async fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = self
            .port
            .read(&mut buf)
            .await
            .map_err(|e| GccBridgeError::Serial(format!("Failed to read byte: {}", e)))?;
        if n == 0 {
            return Err(GccBridgeError::Serial("serial line closed".to_string()));
        }
        Ok(buf[0])
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_str(line).await?;
        self.write_str("\r\n").await
    }

    async fn write_str(&mut self, text: &str) -> Result<()> {
        self.port
            .write_all(text.as_bytes())
            .await
            .map_err(|e| GccBridgeError::Serial(format!("Failed to write: {}", e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| GccBridgeError::Serial(format!("Failed to flush serial port: {}", e)))?;
        Ok(())
    }
}
