//! # Bridge Module
//!
//! The per-cycle poll path: read the controller, shape the stick signal,
//! forward the result to the console, and relay rumble back.
//!
//! Each cycle the raw report is sampled once against the neutral offsets
//! captured at startup, snapped onto the calibration circle, and handed to
//! the correction pipeline. Once the kill switch latches the raw report
//! passes through untouched.

use std::time::Instant;

use tracing::{debug, info};

use crate::calibration::CalibrationStore;
use crate::controller::{ControllerIo, StickSample};
use crate::error::Result;
use crate::pipeline::{polar, Pipeline};
use crate::storage::Storage;

/// Owns the calibration state and pipeline for the poll loop.
pub struct Bridge<S: Storage> {
    store: CalibrationStore<S>,
    pipeline: Pipeline,
    /// Resting stick offsets captured at startup.
    neutral_x: i32,
    neutral_y: i32,
    cycles: u64,
}

impl<S: Storage> std::fmt::Debug for Bridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("neutral_x", &self.neutral_x)
            .field("neutral_y", &self.neutral_y)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl<S: Storage> Bridge<S> {
    #[must_use]
    pub fn new(store: CalibrationStore<S>) -> Self {
        Self {
            store,
            pipeline: Pipeline::new(),
            neutral_x: 0,
            neutral_y: 0,
            cycles: 0,
        }
    }

    /// Read one report and record the resting stick position as neutral.
    ///
    /// The stick must be untouched while this runs; every later sample is
    /// taken relative to these offsets.
    ///
    /// # Errors
    ///
    /// Returns error if the controller read fails.
    pub async fn capture_neutral<C: ControllerIo>(&mut self, io: &mut C) -> Result<()> {
        let report = io.read_report().await?;
        self.neutral_x = i32::from(report.stick_x) - i32::from(polar::AXIS_CENTER);
        self.neutral_y = i32::from(report.stick_y) - i32::from(polar::AXIS_CENTER);
        info!(
            "Captured neutral stick offsets: ({}, {})",
            self.neutral_x, self.neutral_y
        );
        Ok(())
    }

    /// Run one poll cycle: read, shape, write, relay rumble.
    ///
    /// # Errors
    ///
    /// Returns error if either transport direction fails.
    pub async fn poll_cycle<C: ControllerIo>(&mut self, io: &mut C) -> Result<()> {
        let raw = io.read_report().await?;
        let mut report = raw;

        if !self.pipeline.disabled() {
            let sample = StickSample::from_report(&raw, self.neutral_x, self.neutral_y);
            let (snap_x, snap_y) = polar::snap_to_circle(sample.deg, sample.r);
            report.stick_x = snap_x;
            report.stick_y = snap_y;

            let angles = self.store.notch_angles();
            let flags = *self.store.flags();
            self.pipeline
                .run(&mut report, &sample, &angles, &flags, Instant::now());

            if self.pipeline.disabled() {
                info!("Kill switch engaged, passing controller input through raw");
                report = raw;
            }
        }

        let rumble = io.write_report(&report).await?;
        io.set_rumble(rumble).await?;

        self.cycles += 1;
        if self.cycles % 10_000 == 0 {
            debug!("Poll cycles: {}", self.cycles);
        }
        Ok(())
    }

    /// Whether the kill switch has latched.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.pipeline.disabled()
    }

    /// Poll cycles completed since startup.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn store(&self) -> &CalibrationStore<S> {
        &self.store
    }

    /// Mutable calibration access for the configuration menu.
    pub fn store_mut(&mut self) -> &mut CalibrationStore<S> {
        &mut self.store
    }
}
