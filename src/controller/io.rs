//! Trait abstraction for the controller/console transport to enable testing.
//!
//! The bit-level wire protocol (joybus timing, origin frames, rumble
//! signaling) is a separate system; this seam only assumes synchronous
//! read-report / write-report / rumble operations.

use async_trait::async_trait;

use crate::controller::report::GamecubeReport;
use crate::error::Result;

/// Trait for the controller-in / console-out transport.
#[async_trait]
pub trait ControllerIo: Send {
    /// Read the current controller report.
    async fn read_report(&mut self) -> Result<GamecubeReport>;

    /// Write the corrected report out to the console. Returns the console's
    /// rumble request for this cycle.
    async fn write_report(&mut self, report: &GamecubeReport) -> Result<bool>;

    /// Forward the console's rumble request back to the controller.
    async fn set_rumble(&mut self, rumble: bool) -> Result<()>;
}
