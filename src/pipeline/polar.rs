//! # Polar Transform
//!
//! Cartesian to polar conversion for stick offsets, and the angular distance
//! helper every correction stage uses for "is the stick near notch X" tests.
//!
//! The angle formula is *not* a general `atan2`: it converts `atan(dy/dx)` to
//! degrees with the firmware's 57.3 deg/rad constant, then corrects toward
//! the 0-360 range by adding 180 when `dx < 0` and 360 when `dy < 0 && dx >
//! 0`. Exact south (`dx == 0`, `dy < 0`) gets neither correction and stays
//! at -90; notches and samples share the formula, so arc distances are
//! unaffected.
//! Every notch threshold in the pipeline was tuned against this exact
//! formula, so it is reproduced as-is rather than replaced with
//! `f32::atan2`. A (0, 0) input divides by zero and yields NaN, which never
//! matches any arc-distance threshold; callers rely on that graceful
//! degradation instead of guarding.

/// Degrees per radian as the original firmware rounds it.
pub const DEG_PER_RAD: f32 = 57.3;

/// Dead-zone radius: at or below this magnitude the stick reports exact center.
pub const DEAD_ZONE_RADIUS: f32 = 1.0;

/// Raw axis center value.
pub const AXIS_CENTER: u8 = 128;

/// Angle in degrees (0-360 by the correction terms) of an offset pair.
#[must_use]
pub fn angle_deg(dx: f32, dy: f32) -> f32 {
    let flip = if dx < 0.0 { 180.0 } else { 0.0 };
    let wrap = if dy < 0.0 && dx > 0.0 { 360.0 } else { 0.0 };
    (dy / dx).atan() * DEG_PER_RAD + flip + wrap
}

/// Euclidean magnitude of an offset pair.
#[must_use]
pub fn magnitude(dx: i32, dy: i32) -> f32 {
    ((dx * dx + dy * dy) as f32).sqrt()
}

/// Shortest angular distance between two angles on the circle, in [0, 180].
#[must_use]
pub fn arc_distance(a: f32, b: f32) -> f32 {
    (180.0 - ((a - b).abs() - 180.0).abs()).abs()
}

/// Converts polar coordinates back to raw axis values on the calibrated
/// circle. Output is centered on 128 and clamped to the axis range.
#[must_use]
pub fn to_axes(angle: f32, r: f32) -> (u8, u8) {
    let rad = angle / DEG_PER_RAD;
    let x = (f32::from(AXIS_CENTER) + r * rad.cos()).clamp(0.0, 255.0);
    let y = (f32::from(AXIS_CENTER) + r * rad.sin()).clamp(0.0, 255.0);
    (x as u8, y as u8)
}

/// Snaps a stick onto the calibrated circle.
///
/// Magnitudes within the dead zone report exact center; anything else is
/// re-projected from the polar form so coordinates off the true circle (from
/// mechanical drift) land back on it.
#[must_use]
pub fn snap_to_circle(angle: f32, r: f32) -> (u8, u8) {
    if r > DEAD_ZONE_RADIUS {
        to_axes(angle, r)
    } else {
        (AXIS_CENTER, AXIS_CENTER)
    }
}
