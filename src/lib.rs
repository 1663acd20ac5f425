//! Shape Hunt - click the red shapes before the green ones get you
//!
//! Core modules:
//! - `sim`: Deterministic game state (elements, timers, picking, win/loss)
//! - `session`: Per-frame session controller driving a `Game`
//! - `platform`: Host seam to the rendering/windowing layer
//! - `renderer`: Camera projection and the web canvas renderer
//! - `settings`: Data-driven game configuration

pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Session, SessionState};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Elements spawned per session
    pub const DEFAULT_ELEMENT_COUNT: usize = 15;

    /// Distance an element travels per rendered frame
    pub const ELEMENT_STEP: f32 = 0.01;
    /// Change elements spin clockwise one degree per frame
    pub const SPIN_STEP: f32 = -std::f32::consts::PI / 180.0;

    /// Seconds between Collect direction changes
    pub const COLLECT_PERIOD: f64 = 2.0;
    /// Seconds between Avoid direction flips
    pub const AVOID_PERIOD: f64 = 3.0;
    /// Seconds between Change kind toggles
    pub const CHANGE_PERIOD: f64 = 4.0;
    /// Shortest timer period accepted from settings
    pub const MIN_TIMER_PERIOD: f64 = 1e-3;

    /// Movement bounding box
    pub const BOUNDS_MIN: Vec3 = Vec3::new(-5.0, -2.0, -1.0);
    pub const BOUNDS_MAX: Vec3 = Vec3::new(5.0, 3.0, 1.0);

    /// Spawn volume is centered on the origin with these half extents
    pub const SPAWN_HALF_EXTENTS: Vec3 = Vec3::new(5.0, 2.5, 1.0);

    /// Camera sits on +z looking at the origin
    pub const CAMERA_DISTANCE: f32 = 5.0;
    /// Vertical field of view (degrees)
    pub const CAMERA_FOV_DEG: f32 = 75.0;

    /// Host frame rate assumed by the headless driver
    pub const FRAME_DT: f64 = 1.0 / 60.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU);
    // rem_euclid may round up to TAU itself
    if wrapped >= TAU { -PI } else { wrapped - PI }
}

/// Format elapsed seconds as `MM:SS` (seconds floored)
pub fn format_elapsed(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "00:00");
        assert_eq!(format_elapsed(9.99), "00:09");
        assert_eq!(format_elapsed(61.5), "01:01");
        assert_eq!(format_elapsed(3599.0), "59:59");
        assert_eq!(format_elapsed(6000.0), "100:00");
    }

    #[test]
    fn test_normalize_angle_wraps() {
        use std::f32::consts::PI;
        assert!((normalize_angle(PI) + PI).abs() < 1e-5);
        assert!((normalize_angle(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }

    #[test]
    fn test_normalize_angle_huge_inputs_terminate() {
        use std::f32::consts::PI;
        for angle in [1e30, -1e30, f32::MAX, 4.0 * PI + 0.5] {
            let wrapped = normalize_angle(angle);
            assert!((-PI..PI).contains(&wrapped), "{angle} -> {wrapped}");
        }
        assert!((normalize_angle(4.0 * PI + 0.5) - 0.5).abs() < 1e-5);
    }
}
