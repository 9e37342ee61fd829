//! # Calibration Storage Module
//!
//! Byte-addressed persistence for notch coordinates and feature flags.
//!
//! The layout mirrors the EEPROM image of the original controller firmware so
//! that calibration data written by either implementation stays readable by
//! the other: twelve little-endian `f32` values followed by one packed flags
//! byte. Note that `E_Y` sits at offset 16, not 12: the four unused bytes
//! after `E_X` are a quirk of the historical layout and are preserved so
//! existing images keep loading.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{GccBridgeError, Result};

/// Notch coordinate offsets in the storage image (f32, little endian).
pub mod layout {
    pub const N_X: u32 = 0;
    pub const N_Y: u32 = 4;
    pub const E_X: u32 = 8;
    // Not 12. Existing calibration images have this gap.
    pub const E_Y: u32 = 16;
    pub const S_X: u32 = 20;
    pub const S_Y: u32 = 24;
    pub const W_X: u32 = 28;
    pub const W_Y: u32 = 32;
    pub const SW_X: u32 = 36;
    pub const SW_Y: u32 = 40;
    pub const SE_X: u32 = 44;
    pub const SE_Y: u32 = 48;

    /// Packed feature-enable bitmask.
    pub const FLAGS: u32 = 52;

    /// Total image size in bytes.
    pub const IMAGE_SIZE: usize = 53;
}

/// Byte-addressed storage primitive.
///
/// Models the firmware's EEPROM: get/put by address, no transactions. A power
/// loss mid-write can leave a mixed old/new image; the calibration layer
/// accepts that risk.
pub trait Storage {
    /// Read `buf.len()` bytes starting at `addr`.
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `addr`.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Read one little-endian `f32` at `addr`.
    fn read_f32(&mut self, addr: u32) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_bytes(addr, &mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Write one little-endian `f32` at `addr`.
    fn write_f32(&mut self, addr: u32, value: f32) -> Result<()> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    /// Read the single byte at `addr`.
    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Write the single byte at `addr`.
    fn write_u8(&mut self, addr: u32, value: u8) -> Result<()> {
        self.write_bytes(addr, &[value])
    }
}

/// File-backed storage image.
///
/// Created zero-filled if the file does not exist, so a fresh install starts
/// with all notches at (0, 0) and all features disabled.
pub struct FileStorage {
    file: File,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage").finish_non_exhaustive()
    }
}

impl FileStorage {
    /// Open or create the storage image at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or extended to the image size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let len = file.metadata()?.len();
        if len < layout::IMAGE_SIZE as u64 {
            file.seek(SeekFrom::End(0))?;
            let pad = vec![0u8; layout::IMAGE_SIZE - len as usize];
            file.write_all(&pad)?;
            file.flush()?;
        }

        Ok(Self { file })
    }

    fn check_range(addr: u32, len: usize) -> Result<()> {
        if addr as usize + len > layout::IMAGE_SIZE {
            return Err(GccBridgeError::Storage(format!(
                "access at {}+{} exceeds image size {}",
                addr,
                len,
                layout::IMAGE_SIZE
            )));
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        Self::check_range(addr, buf.len())?;
        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        Self::check_range(addr, data.len())?;
        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.write_all(data)?;
        self.file.flush()?;
        Ok(())
    }
}

/// In-memory storage image.
///
/// Used by tests and useful for running the pipeline without touching disk.
#[derive(Debug, Clone)]
pub struct MemStorage {
    image: [u8; layout::IMAGE_SIZE],
}

impl Default for MemStorage {
    fn default() -> Self {
        Self {
            image: [0u8; layout::IMAGE_SIZE],
        }
    }
}

impl MemStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw view of the whole image.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }
}

impl Storage for MemStorage {
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let start = addr as usize;
        let end = start + buf.len();
        if end > layout::IMAGE_SIZE {
            return Err(GccBridgeError::Storage(format!(
                "access at {}+{} exceeds image size {}",
                addr,
                buf.len(),
                layout::IMAGE_SIZE
            )));
        }
        buf.copy_from_slice(&self.image[start..end]);
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let start = addr as usize;
        let end = start + data.len();
        if end > layout::IMAGE_SIZE {
            return Err(GccBridgeError::Storage(format!(
                "access at {}+{} exceeds image size {}",
                addr,
                data.len(),
                layout::IMAGE_SIZE
            )));
        }
        self.image[start..end].copy_from_slice(data);
        Ok(())
    }
}
