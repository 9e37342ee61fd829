//! # Correction Stages
//!
//! The five toggleable corrections. Thresholds and output constants are part
//! of the external verification contract (see [`crate::verify`]) and must
//! stay in sync with the published manifest values.

use crate::calibration::{Feature, Notch};
use crate::controller::report::{GamecubeReport, AXIS_CENTER};
use crate::pipeline::polar::arc_distance;
use crate::pipeline::{Stage, StageContext, Tuning, DASH_BACK_CYCLES};

/// Minimum polar magnitude for max-vector and perfect-angle snapping.
pub const SNAP_RADIUS: f32 = 75.0;
/// Arc distance under which a cardinal input snaps to full deflection.
pub const MAX_VECTOR_ARC: f32 = 6.0;
/// Perfect-angle band: arc distance strictly between these bounds.
pub const PERFECT_ANGLE_ARC_MIN: f32 = 6.0;
pub const PERFECT_ANGLE_ARC_MAX: f32 = 19.0;
/// C-stick snap: one axis past this...
pub const C_SNAP_AXIS: i32 = 75;
/// ...while the orthogonal axis stays under this.
pub const C_SNAP_ORTHO: i32 = 23;
/// Minimum magnitude for the shield-drop snap.
pub const SHIELD_DROP_RADIUS: f32 = 72.0;
/// Arc distance around the SW/SE gates that shield-drops.
pub const SHIELD_DROP_ARC: f32 = 4.0;
/// Dash-back: vertical offsets under this count as "on the horizontal rail".
pub const DASH_BACK_TILT: i32 = 23;
/// Dash-back: horizontal magnitudes past this escape the hold.
pub const DASH_BACK_ESCAPE: i32 = 64;
/// Dolphin-fix dead zone radius for both sticks.
pub const DOLPHIN_DEAD_ZONE: f32 = 8.0;
/// Cycles of continuous d-pad-right before the dolphin latch sets.
pub const DOLPHIN_HOLD_CYCLES: u32 = 2000;
/// Extra dash-back cycles once the dolphin latch is set.
pub const DOLPHIN_EXTRA_CYCLES: i32 = 14;

fn between(value: f32, low: f32, high: f32) -> bool {
    value > low && value < high
}

/// Stage 1: snaps sufficiently strong near-cardinal inputs to full
/// deflection, on both sticks.
#[derive(Debug, Default)]
pub struct MaxVectors;

impl Stage for MaxVectors {
    fn feature(&self) -> Feature {
        Feature::MaxVectors
    }

    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, _tuning: &mut Tuning) {
        let sample = ctx.sample;
        if sample.r > SNAP_RADIUS {
            if arc_distance(sample.deg, ctx.angles.get(Notch::North)) < MAX_VECTOR_ARC {
                report.stick_x = 128;
                report.stick_y = 255;
            }
            if arc_distance(sample.deg, ctx.angles.get(Notch::East)) < MAX_VECTOR_ARC {
                report.stick_x = 255;
                report.stick_y = 128;
            }
            if arc_distance(sample.deg, ctx.angles.get(Notch::South)) < MAX_VECTOR_ARC {
                report.stick_x = 128;
                report.stick_y = 1;
            }
            if arc_distance(sample.deg, ctx.angles.get(Notch::West)) < MAX_VECTOR_ARC {
                report.stick_x = 1;
                report.stick_y = 128;
            }
        }

        // The C-stick snap is a cartesian box, not polar: one axis strongly
        // deflected while the other stays near center.
        if sample.cxm() > C_SNAP_AXIS && sample.cym() < C_SNAP_ORTHO {
            report.c_stick_x = if sample.cx > 0 { 255 } else { 1 };
            report.c_stick_y = 128;
        }
        if sample.cym() > C_SNAP_AXIS && sample.cxm() < C_SNAP_ORTHO {
            report.c_stick_y = if sample.cy > 0 { 255 } else { 1 };
            report.c_stick_x = 128;
        }
    }
}

/// Stage 2: forces known-good steep/shallow coordinates when the stick rides
/// the gate just off a cardinal.
#[derive(Debug, Default)]
pub struct PerfectAngles;

impl Stage for PerfectAngles {
    fn feature(&self) -> Feature {
        Feature::PerfectAngles
    }

    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, _tuning: &mut Tuning) {
        let sample = ctx.sample;
        if sample.r <= SNAP_RADIUS {
            return;
        }

        let steep = |offset: i32| if offset > 0 { 151 } else { 105 };

        if between(
            arc_distance(sample.deg, ctx.angles.get(Notch::North)),
            PERFECT_ANGLE_ARC_MIN,
            PERFECT_ANGLE_ARC_MAX,
        ) {
            report.stick_x = steep(sample.ax);
            report.stick_y = 204;
        }
        if between(
            arc_distance(sample.deg, ctx.angles.get(Notch::East)),
            PERFECT_ANGLE_ARC_MIN,
            PERFECT_ANGLE_ARC_MAX,
        ) {
            report.stick_y = steep(sample.ay);
            report.stick_x = 204;
        }
        if between(
            arc_distance(sample.deg, ctx.angles.get(Notch::South)),
            PERFECT_ANGLE_ARC_MIN,
            PERFECT_ANGLE_ARC_MAX,
        ) {
            report.stick_x = steep(sample.ax);
            report.stick_y = 52;
        }
        if between(
            arc_distance(sample.deg, ctx.angles.get(Notch::West)),
            PERFECT_ANGLE_ARC_MIN,
            PERFECT_ANGLE_ARC_MAX,
        ) {
            report.stick_y = steep(sample.ay);
            report.stick_x = 52;
        }
    }
}

/// Stage 3: widens the shield-drop window around the SW and SE gates while a
/// shield input is held.
#[derive(Debug, Default)]
pub struct ShieldDrop;

impl Stage for ShieldDrop {
    fn feature(&self) -> Feature {
        Feature::ShieldDropExpand
    }

    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, _tuning: &mut Tuning) {
        let sample = ctx.sample;
        if !report.shield_held() {
            return;
        }
        if sample.ay < 0 && sample.r > SHIELD_DROP_RADIUS {
            if arc_distance(sample.deg, ctx.angles.get(Notch::Southwest)) < SHIELD_DROP_ARC {
                report.stick_x = 73;
                report.stick_y = 73;
            }
            if arc_distance(sample.deg, ctx.angles.get(Notch::Southeast)) < SHIELD_DROP_ARC {
                report.stick_x = 183;
                report.stick_y = 73;
            }
        }
    }
}

/// Stage 4: debounces brief horizontal reversals during a dash-back.
///
/// While the stick rides the horizontal rail, passing through the center
/// region arms a countdown; while it runs, mid-range horizontal values are
/// re-centered so the reversal only registers once it outlasts the window.
#[derive(Debug)]
pub struct DashBack {
    buf: i32,
}

impl DashBack {
    #[must_use]
    pub fn new() -> Self {
        Self { buf: 0 }
    }
}

impl Default for DashBack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for DashBack {
    fn feature(&self) -> Feature {
        Feature::DashBack
    }

    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, tuning: &mut Tuning) {
        let sample = ctx.sample;
        if sample.aym() < DASH_BACK_TILT {
            if sample.axm() < DASH_BACK_TILT {
                self.buf = tuning.dash_back_cycles;
            }
            if self.buf > 0 {
                self.buf -= 1;
                if sample.axm() < DASH_BACK_ESCAPE {
                    let held = if sample.axm() < DASH_BACK_TILT {
                        sample.ax
                    } else {
                        0
                    };
                    report.stick_x = (i32::from(AXIS_CENTER) + held) as u8;
                }
            }
        } else {
            self.buf = 0;
        }
    }
}

/// Stage 5: zeroes near-center noise on both sticks and detects Dolphin's
/// slower polling.
///
/// Holding d-pad right for [`DOLPHIN_HOLD_CYCLES`] consecutive cycles sets a
/// sticky latch that widens the dash-back window for the rest of the
/// session; the hold counter resets when the direction releases.
#[derive(Debug)]
pub struct DolphinFix {
    hold_cycles: u32,
    latched: bool,
}

impl DolphinFix {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hold_cycles: 0,
            latched: false,
        }
    }

    /// Whether the slow-poll latch has set.
    #[must_use]
    pub fn latched(&self) -> bool {
        self.latched
    }
}

impl Default for DolphinFix {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for DolphinFix {
    fn feature(&self) -> Feature {
        Feature::DolphinFix
    }

    fn apply(&mut self, report: &mut GamecubeReport, ctx: &StageContext<'_>, tuning: &mut Tuning) {
        let sample = ctx.sample;
        if sample.r < DOLPHIN_DEAD_ZONE {
            report.stick_x = AXIS_CENTER;
            report.stick_y = AXIS_CENTER;
        }
        if sample.c_magnitude() < DOLPHIN_DEAD_ZONE {
            report.c_stick_x = AXIS_CENTER;
            report.c_stick_y = AXIS_CENTER;
        }

        if report.d_right {
            if self.hold_cycles <= DOLPHIN_HOLD_CYCLES {
                self.hold_cycles += 1;
            }
            if self.hold_cycles > DOLPHIN_HOLD_CYCLES {
                self.latched = true;
            }
        } else {
            self.hold_cycles = 0;
        }

        tuning.dash_back_cycles = DASH_BACK_CYCLES
            + if self.latched {
                DOLPHIN_EXTRA_CYCLES
            } else {
                0
            };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{NotchAngles, NotchAxis, NotchSet};
    use crate::controller::report::StickSample;
    use crate::pipeline::polar;

    fn angles(pairs: &[(Notch, f32, f32)]) -> NotchAngles {
        let mut notches = NotchSet::default();
        for &(notch, x, y) in pairs {
            notches.set_value(notch, NotchAxis::X, x);
            notches.set_value(notch, NotchAxis::Y, y);
        }
        NotchAngles::from(&notches)
    }

    fn report_with_stick(x: u8, y: u8) -> GamecubeReport {
        let mut report = GamecubeReport::default();
        report.stick_x = x;
        report.stick_y = y;
        report
    }

    fn run_stage<S: Stage>(
        stage: &mut S,
        report: &mut GamecubeReport,
        angles: &NotchAngles,
        tuning: &mut Tuning,
    ) {
        let sample = StickSample::from_report(report, 0, 0);
        let ctx = StageContext {
            sample: &sample,
            angles,
        };
        stage.apply(report, &ctx, tuning);
    }

    // ==================== MaxVectors ====================

    #[test]
    fn test_max_vectors_snaps_near_north() {
        // Notch at (0, 50); raw offset of magnitude ~80 at ~3 degrees from it
        let angles = angles(&[(Notch::North, 0.0, 50.0)]);
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 + 4, 128 + 80);
        let sample = StickSample::from_report(&report, 0, 0);
        assert!(sample.r > 75.0);
        assert!(arc_distance(sample.deg, angles.get(Notch::North)) < 6.0);

        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128, 255));
    }

    #[test]
    fn test_max_vectors_each_cardinal() {
        let angles = angles(&[
            (Notch::North, 0.0, 80.0),
            (Notch::East, 80.0, 0.0),
            (Notch::South, 0.0, -80.0),
            (Notch::West, -80.0, 0.0),
        ]);
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        let cases = [
            ((128 + 2, 128 + 80), (128u8, 255u8)),
            ((128 + 80, 128 + 2), (255, 128)),
            ((128 + 2, 128 - 80), (128, 1)),
            ((128 - 80, 128 + 2), (1, 128)),
        ];
        for ((x, y), expected) in cases {
            let mut report = report_with_stick(x, y);
            run_stage(&mut stage, &mut report, &angles, &mut tuning);
            assert_eq!((report.stick_x, report.stick_y), expected);
        }
    }

    #[test]
    fn test_max_vectors_needs_radius() {
        let angles = angles(&[(Notch::North, 0.0, 80.0)]);
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        // Dead on the notch angle but r = 70 < 75
        let mut report = report_with_stick(128, 128 + 70);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128, 128 + 70));
    }

    #[test]
    fn test_max_vectors_uncalibrated_notch_never_matches() {
        // All notches at (0,0): NaN angles, stage must not fire
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128, 128 + 80);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128, 128 + 80));
    }

    #[test]
    fn test_max_vectors_c_stick_box() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        let mut report = GamecubeReport::default();
        report.c_stick_x = 128 + 80;
        report.c_stick_y = 128 + 10;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.c_stick_x, report.c_stick_y), (255, 128));

        let mut report = GamecubeReport::default();
        report.c_stick_y = 128 - 80;
        report.c_stick_x = 128 - 10;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.c_stick_x, report.c_stick_y), (128, 1));
    }

    #[test]
    fn test_max_vectors_c_stick_diagonal_untouched() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = MaxVectors;
        let mut tuning = Tuning::default();

        // Both axes strongly deflected: outside the box on the orthogonal test
        let mut report = GamecubeReport::default();
        report.c_stick_x = 128 + 80;
        report.c_stick_y = 128 + 80;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.c_stick_x, report.c_stick_y), (128 + 80, 128 + 80));
    }

    // ==================== PerfectAngles ====================

    #[test]
    fn test_perfect_angles_east_band() {
        // East notch along +x; offset at ~12 degrees above it, magnitude 80
        let angles = angles(&[(Notch::East, 80.0, 0.0)]);
        let mut stage = PerfectAngles;
        let mut tuning = Tuning::default();

        let dx = (80.0 * (12.0f32 / polar::DEG_PER_RAD).cos()) as i32;
        let dy = (80.0 * (12.0f32 / polar::DEG_PER_RAD).sin()) as i32;
        let mut report = report_with_stick((128 + dx) as u8, (128 + dy) as u8);

        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        // ay > 0: steep value on y, extreme-adjacent x
        assert_eq!((report.stick_x, report.stick_y), (204, 151));
    }

    #[test]
    fn test_perfect_angles_east_band_negative_y() {
        let angles = angles(&[(Notch::East, 80.0, 0.0)]);
        let mut stage = PerfectAngles;
        let mut tuning = Tuning::default();

        let dx = (80.0 * (12.0f32 / polar::DEG_PER_RAD).cos()) as i32;
        let dy = -((80.0 * (12.0f32 / polar::DEG_PER_RAD).sin()) as i32);
        let mut report = report_with_stick((128 + dx) as u8, (128 + dy) as u8);

        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (204, 105));
    }

    #[test]
    fn test_perfect_angles_band_is_exclusive() {
        let angles = angles(&[(Notch::East, 80.0, 0.0)]);
        let mut stage = PerfectAngles;
        let mut tuning = Tuning::default();

        // Inside the max-vector zone (< 6 degrees): perfect angles must not fire
        let mut report = report_with_stick(128 + 80, 128 + 4);
        let sample = StickSample::from_report(&report, 0, 0);
        assert!(arc_distance(sample.deg, angles.get(Notch::East)) < 6.0);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128 + 80, 128 + 4));

        // Past the band (> 19 degrees)
        let mut report = report_with_stick(128 + 70, 128 + 40);
        let sample = StickSample::from_report(&report, 0, 0);
        assert!(arc_distance(sample.deg, angles.get(Notch::East)) > 19.0);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128 + 70, 128 + 40));
    }

    #[test]
    fn test_perfect_angles_north_band() {
        let angles = angles(&[(Notch::North, 0.0, 80.0)]);
        let mut stage = PerfectAngles;
        let mut tuning = Tuning::default();

        // ~12 degrees east of north, ax > 0
        let dx = (80.0 * (12.0f32 / polar::DEG_PER_RAD).sin()) as i32;
        let dy = (80.0 * (12.0f32 / polar::DEG_PER_RAD).cos()) as i32;
        let mut report = report_with_stick((128 + dx) as u8, (128 + dy) as u8);

        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (151, 204));
    }

    // ==================== ShieldDrop ====================

    fn shield_drop_angles() -> NotchAngles {
        angles(&[
            (Notch::Southwest, -59.0, -59.0),
            (Notch::Southeast, 59.0, -59.0),
        ])
    }

    #[test]
    fn test_shield_drop_southwest() {
        let angles = shield_drop_angles();
        let mut stage = ShieldDrop;
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 - 55, 128 - 55);
        report.l = true;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (73, 73));
    }

    #[test]
    fn test_shield_drop_southeast() {
        let angles = shield_drop_angles();
        let mut stage = ShieldDrop;
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 + 55, 128 - 55);
        report.trigger_r = 100;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (183, 73));
    }

    #[test]
    fn test_shield_drop_requires_shield() {
        let angles = shield_drop_angles();
        let mut stage = ShieldDrop;
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 - 55, 128 - 55);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128 - 55, 128 - 55));
    }

    #[test]
    fn test_shield_drop_requires_downward_offset() {
        let angles = shield_drop_angles();
        let mut stage = ShieldDrop;
        let mut tuning = Tuning::default();

        // Upward stick with shield held: no drop
        let mut report = report_with_stick(128 - 55, 128 + 55);
        report.l = true;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128 - 55, 128 + 55));
    }

    #[test]
    fn test_shield_drop_requires_radius() {
        let angles = shield_drop_angles();
        let mut stage = ShieldDrop;
        let mut tuning = Tuning::default();

        // On the SW angle but r ~ 56 < 72
        let mut report = report_with_stick(128 - 40, 128 - 40);
        report.l = true;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!((report.stick_x, report.stick_y), (128 - 40, 128 - 40));
    }

    // ==================== DashBack ====================

    fn dash_back_cycle(stage: &mut DashBack, tuning: &mut Tuning, ax: i32, ay: i32) -> u8 {
        let mut report = report_with_stick((128 + ax) as u8, (128 + ay) as u8);
        let angles = NotchAngles::from(&NotchSet::default());
        run_stage(stage, &mut report, &angles, tuning);
        report.stick_x
    }

    #[test]
    fn test_dash_back_holds_mid_range_reversal() {
        let mut stage = DashBack::new();
        let mut tuning = Tuning::default();

        // Riding right at 40: no arming (axm >= 23), passes through
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, 40, 0), 128 + 40);

        // Drops to 10: arms the window and holds the small offset
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, 10, 0), 128 + 10);

        // Spikes to the other side at -40 inside the window: re-centered
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 0), 128);
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 0), 128);

        // Window drained: raw value flows again
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 0), 128 - 40);
    }

    #[test]
    fn test_dash_back_full_deflection_escapes_hold() {
        let mut stage = DashBack::new();
        let mut tuning = Tuning::default();

        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, 10, 0), 128 + 10);
        // A committed reversal (|ax| >= 64) is never suppressed
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -70, 0), 128 - 70);
    }

    #[test]
    fn test_dash_back_vertical_tilt_resets() {
        let mut stage = DashBack::new();
        let mut tuning = Tuning::default();

        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, 10, 0), 128 + 10);
        // Vertical movement leaves the rail and clears the window
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 30), 128 - 40);
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 0), 128 - 40);
    }

    #[test]
    fn test_dash_back_rearms_while_centered() {
        let mut stage = DashBack::new();
        let mut tuning = Tuning::default();

        // Staying near center keeps re-arming the window each cycle
        for _ in 0..10 {
            assert_eq!(dash_back_cycle(&mut stage, &mut tuning, 5, 0), 128 + 5);
        }
        assert_eq!(dash_back_cycle(&mut stage, &mut tuning, -40, 0), 128);
    }

    // ==================== DolphinFix ====================

    #[test]
    fn test_dolphin_fix_centers_near_zero() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = DolphinFix::new();
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 + 3, 128 - 4);
        report.c_stick_x = 128 - 5;
        report.c_stick_y = 128 + 2;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);

        assert_eq!((report.stick_x, report.stick_y), (128, 128));
        assert_eq!((report.c_stick_x, report.c_stick_y), (128, 128));
    }

    #[test]
    fn test_dolphin_fix_leaves_real_input() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = DolphinFix::new();
        let mut tuning = Tuning::default();

        let mut report = report_with_stick(128 + 10, 128);
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert_eq!(report.stick_x, 128 + 10);
    }

    #[test]
    fn test_dolphin_latch_widens_dash_back() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = DolphinFix::new();
        let mut tuning = Tuning::default();

        let mut report = GamecubeReport::default();
        report.d_right = true;
        for _ in 0..=DOLPHIN_HOLD_CYCLES {
            run_stage(&mut stage, &mut report, &angles, &mut tuning);
        }
        assert!(stage.latched());
        assert_eq!(tuning.dash_back_cycles, DASH_BACK_CYCLES + DOLPHIN_EXTRA_CYCLES);

        // Latch is sticky across release
        report.d_right = false;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        assert!(stage.latched());
        assert_eq!(tuning.dash_back_cycles, DASH_BACK_CYCLES + DOLPHIN_EXTRA_CYCLES);
    }

    #[test]
    fn test_dolphin_release_resets_counter() {
        let angles = NotchAngles::from(&NotchSet::default());
        let mut stage = DolphinFix::new();
        let mut tuning = Tuning::default();

        let mut report = GamecubeReport::default();
        report.d_right = true;
        for _ in 0..DOLPHIN_HOLD_CYCLES {
            run_stage(&mut stage, &mut report, &angles, &mut tuning);
        }
        assert!(!stage.latched());

        // Release, then hold again just short of the threshold: still unlatched
        report.d_right = false;
        run_stage(&mut stage, &mut report, &angles, &mut tuning);
        report.d_right = true;
        for _ in 0..DOLPHIN_HOLD_CYCLES {
            run_stage(&mut stage, &mut report, &angles, &mut tuning);
        }
        assert!(!stage.latched());
        assert_eq!(tuning.dash_back_cycles, DASH_BACK_CYCLES);
    }
}
