//! # Correction Pipeline
//!
//! The ordered, independently toggleable correction stages and the
//! flag-independent kill switch.
//!
//! Stages run in a fixed, significant order: later stages see earlier
//! stages' report output, but every stage reads the same immutable per-cycle
//! [`StickSample`], taken from the raw report before any stage ran.

pub mod polar;
pub mod stages;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::calibration::{Feature, FeatureSet, NotchAngles};
use crate::controller::report::{GamecubeReport, StickSample};
use crate::pipeline::stages::{DashBack, DolphinFix, MaxVectors, PerfectAngles, ShieldDrop};

/// How long d-pad down must be held before the kill switch engages.
pub const KILL_SWITCH_HOLD: Duration = Duration::from_millis(500);

/// Baseline dash-back debounce window in poll cycles.
pub const DASH_BACK_CYCLES: i32 = 3;

/// Read-only per-cycle context shared by all stages.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub sample: &'a StickSample,
    pub angles: &'a NotchAngles,
}

/// Pipeline tuning values a stage may adjust for later cycles.
///
/// Dolphin-fix widens the dash-back window here; since dolphin-fix runs
/// after dash-back, the change takes effect on the next cycle.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub dash_back_cycles: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dash_back_cycles: DASH_BACK_CYCLES,
        }
    }
}

/// One correction stage.
///
/// Stages mutate the outgoing report in place and may carry state across
/// cycles (debounce counters, latches).
pub trait Stage: Send {
    /// The flag gating this stage.
    fn feature(&self) -> Feature;

    /// Applies the correction for one cycle.
    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, tuning: &mut Tuning);
}

/// Latched pipeline bypass, engaged by holding d-pad down.
///
/// Reversible only by restarting the bridge (reconnecting the controller),
/// not by further input.
#[derive(Debug, Default)]
pub struct KillSwitch {
    held_since: Option<Instant>,
    engaged: bool,
}

impl KillSwitch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pipeline is bypassed.
    #[must_use]
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Feeds one cycle's d-pad-down state. Once the hold reaches
    /// [`KILL_SWITCH_HOLD`], the switch latches.
    pub fn update(&mut self, d_down_held: bool, now: Instant) {
        if d_down_held {
            let since = *self.held_since.get_or_insert(now);
            if !self.engaged && now.duration_since(since) >= KILL_SWITCH_HOLD {
                self.engaged = true;
                warn!("Kill switch engaged: passthrough until reconnect");
            }
        } else {
            self.held_since = None;
        }
    }
}

/// The five correction stages in their fixed order, plus the kill switch.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    tuning: Tuning,
    kill: KillSwitch,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("tuning", &self.tuning)
            .field("kill", &self.kill)
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Builds the pipeline with the documented stage order.
    #[must_use]
    pub fn new() -> Self {
        info!("Pipeline initialized: max_vectors, perfect_angles, shield_drop_expand, dash_back, dolphin_fix");
        Self {
            stages: vec![
                Box::new(MaxVectors),
                Box::new(PerfectAngles),
                Box::new(ShieldDrop),
                Box::new(DashBack::new()),
                Box::new(DolphinFix::new()),
            ],
            tuning: Tuning::default(),
            kill: KillSwitch::new(),
        }
    }

    /// Whether the kill switch has latched.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.kill.engaged()
    }

    /// Current dash-back debounce window (widened once the dolphin latch
    /// sets).
    #[must_use]
    pub fn dash_back_cycles(&self) -> i32 {
        self.tuning.dash_back_cycles
    }

    /// Runs one cycle: enabled stages in order, then the kill-switch check.
    ///
    /// Callers must skip both the calibration snap and this method once
    /// [`Pipeline::disabled`] reports true; the kill-switch check itself is
    /// still fed so the latch engages from a live pipeline only.
    pub fn run(
        &mut self,
        report: &mut GamecubeReport,
        sample: &StickSample,
        angles: &NotchAngles,
        flags: &FeatureSet,
        now: Instant,
    ) {
        let ctx = StageContext { sample, angles };
        for stage in &mut self.stages {
            if flags.is_enabled(stage.feature()) {
                stage.apply(report, &ctx, &mut self.tuning);
            }
        }
        self.kill.update(report.d_down, now);
    }
}
