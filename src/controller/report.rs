//! # Controller Report Model
//!
//! Decoded GameCube controller state and the per-cycle stick sample the
//! correction pipeline works from.

use crate::pipeline::polar;

pub use crate::pipeline::polar::AXIS_CENTER;

/// Decoded state of a GameCube controller.
///
/// Analog values are raw axis bytes (0-255, physical center near 128).
/// Scaling and correction are handled by the pipeline, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamecubeReport {
    // Face and shoulder buttons
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub start: bool,
    pub z: bool,
    /// L digital click.
    pub l: bool,
    /// R digital click.
    pub r: bool,

    // D-pad
    pub d_up: bool,
    pub d_down: bool,
    pub d_left: bool,
    pub d_right: bool,

    // Analog sticks (0-255, center ~128)
    pub stick_x: u8,
    pub stick_y: u8,
    pub c_stick_x: u8,
    pub c_stick_y: u8,

    // Analog triggers (0-255)
    pub trigger_l: u8,
    pub trigger_r: u8,
}

impl Default for GamecubeReport {
    /// Sticks centered, everything released.
    fn default() -> Self {
        Self {
            a: false,
            b: false,
            x: false,
            y: false,
            start: false,
            z: false,
            l: false,
            r: false,
            d_up: false,
            d_down: false,
            d_left: false,
            d_right: false,
            stick_x: AXIS_CENTER,
            stick_y: AXIS_CENTER,
            c_stick_x: AXIS_CENTER,
            c_stick_y: AXIS_CENTER,
            trigger_l: 0,
            trigger_r: 0,
        }
    }
}

impl GamecubeReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a shield input is held: either digital trigger, Z, or an
    /// analog trigger past the light-shield threshold.
    #[must_use]
    pub fn shield_held(&self) -> bool {
        self.l || self.r || self.z || self.trigger_l > 74 || self.trigger_r > 74
    }

    /// Parses the raw 8-byte controller state.
    ///
    /// Byte 0 carries Start/Y/X/B/A, byte 1 carries L/R/Z and the d-pad
    /// (bit 7 always set on the wire), bytes 2-5 the stick axes, 6-7 the
    /// analog triggers.
    #[must_use]
    pub fn from_raw(raw: &[u8; 8]) -> Self {
        Self {
            start: (raw[0] & 0x10) != 0,
            y: (raw[0] & 0x08) != 0,
            x: (raw[0] & 0x04) != 0,
            b: (raw[0] & 0x02) != 0,
            a: (raw[0] & 0x01) != 0,

            l: (raw[1] & 0x40) != 0,
            r: (raw[1] & 0x20) != 0,
            z: (raw[1] & 0x10) != 0,
            d_up: (raw[1] & 0x08) != 0,
            d_down: (raw[1] & 0x04) != 0,
            d_right: (raw[1] & 0x02) != 0,
            d_left: (raw[1] & 0x01) != 0,

            stick_x: raw[2],
            stick_y: raw[3],
            c_stick_x: raw[4],
            c_stick_y: raw[5],

            trigger_l: raw[6],
            trigger_r: raw[7],
        }
    }

    /// Packs the report back into the raw 8-byte wire form.
    #[must_use]
    pub fn to_raw(&self) -> [u8; 8] {
        let mut raw = [0u8; 8];
        raw[0] = u8::from(self.start) << 4
            | u8::from(self.y) << 3
            | u8::from(self.x) << 2
            | u8::from(self.b) << 1
            | u8::from(self.a);
        raw[1] = 0x80
            | u8::from(self.l) << 6
            | u8::from(self.r) << 5
            | u8::from(self.z) << 4
            | u8::from(self.d_up) << 3
            | u8::from(self.d_down) << 2
            | u8::from(self.d_right) << 1
            | u8::from(self.d_left);
        raw[2] = self.stick_x;
        raw[3] = self.stick_y;
        raw[4] = self.c_stick_x;
        raw[5] = self.c_stick_y;
        raw[6] = self.trigger_l;
        raw[7] = self.trigger_r;
        raw
    }
}

/// Per-cycle stick measurements, computed once from the raw report before any
/// stage runs.
///
/// Stages mutate the outgoing report but read this shared sample, so every
/// stage sees the same raw offsets regardless of what earlier stages wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickSample {
    /// Main stick offset from the calibrated neutral, x.
    pub ax: i32,
    /// Main stick offset from the calibrated neutral, y.
    pub ay: i32,
    /// C-stick offset from center, x.
    pub cx: i32,
    /// C-stick offset from center, y.
    pub cy: i32,
    /// Main stick polar magnitude.
    pub r: f32,
    /// Main stick polar angle in degrees.
    pub deg: f32,
}

impl StickSample {
    /// Builds a sample from a raw report and the neutral offsets captured at
    /// startup.
    #[must_use]
    pub fn from_report(report: &GamecubeReport, neutral_x: i32, neutral_y: i32) -> Self {
        let ax = i32::from(report.stick_x) - i32::from(AXIS_CENTER) - neutral_x;
        let ay = i32::from(report.stick_y) - i32::from(AXIS_CENTER) - neutral_y;
        let cx = i32::from(report.c_stick_x) - i32::from(AXIS_CENTER);
        let cy = i32::from(report.c_stick_y) - i32::from(AXIS_CENTER);
        Self {
            ax,
            ay,
            cx,
            cy,
            r: polar::magnitude(ax, ay),
            deg: polar::angle_deg(ax as f32, ay as f32),
        }
    }

    /// Absolute main-stick offset, x.
    #[must_use]
    pub fn axm(&self) -> i32 {
        self.ax.abs()
    }

    /// Absolute main-stick offset, y.
    #[must_use]
    pub fn aym(&self) -> i32 {
        self.ay.abs()
    }

    /// Absolute C-stick offset, x.
    #[must_use]
    pub fn cxm(&self) -> i32 {
        self.cx.abs()
    }

    /// Absolute C-stick offset, y.
    #[must_use]
    pub fn cym(&self) -> i32 {
        self.cy.abs()
    }

    /// C-stick polar magnitude.
    #[must_use]
    pub fn c_magnitude(&self) -> f32 {
        polar::magnitude(self.cx, self.cy)
    }
}
