//! # Controller Module
//!
//! GameCube controller report model and transport seam.
//!
//! This module handles:
//! - The decoded controller report (buttons, sticks, triggers)
//! - The per-cycle stick sample (offsets and polar coordinates)
//! - The opaque read-report/write-report/rumble collaborator trait

pub mod dongle;
pub mod io;
pub mod report;

pub use dongle::DongleSerial;
pub use io::ControllerIo;
pub use report::{GamecubeReport, StickSample};
