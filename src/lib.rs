//! Tilt Sandbox - a touch-driven 2D physics playground
//!
//! Core modules:
//! - `sim`: Sandbox state, per-frame systems, gravity sources (physics via rapier2d)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native sensor backends
//! - `settings`: Persisted configuration and presets

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Result, SandboxError};
pub use settings::{SandboxPreset, Settings};

use glam::Vec2;

/// Sandbox configuration constants
pub mod consts {
    /// Box edge length as a fraction of the longer screen side
    pub const BOX_SIZE_RATIO: f32 = 0.075;

    /// Air friction applied to every dynamic box (per 60 Hz step)
    pub const FRICTION_AIR: f32 = 0.021;
    /// Default bounciness of dynamic boxes
    pub const RESTITUTION: f32 = 0.5;
    /// Restitution used by the bouncy preset
    pub const BOUNCY_RESTITUTION: f32 = 1.0;
    /// Surface friction of every collider
    pub const SURFACE_FRICTION: f32 = 0.1;

    /// Ceiling centre, in pixels from the top edge
    pub const CEILING_Y: f32 = 10.0;

    /// Gravity acceleration in pixels/s² for a unit gravity vector
    pub const GRAVITY_PX: f32 = 1000.0;
    /// Physics world scale
    pub const PIXELS_PER_METER: f32 = 50.0;

    /// Delay used by the snapshot reset preset (seconds)
    pub const SNAPSHOT_RESET_DELAY: f32 = 0.05;

    /// Largest frame delta handed to the physics step (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Delta assumed for the very first frame
    pub const FIRST_FRAME_DELTA: f32 = 1.0 / 60.0;
}

/// Edge length of a box for the given screen size: `trunc(max(w, h) * 0.075)`
#[inline]
pub fn box_size(width: f32, height: f32) -> f32 {
    (width.max(height) * consts::BOX_SIZE_RATIO).trunc()
}

/// Rotate `point` around the origin by `angle` radians
#[inline]
pub fn rotate(point: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_box_size_portrait_phone() {
        assert_eq!(box_size(390.0, 844.0), 63.0);
        assert_eq!(box_size(844.0, 390.0), 63.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = rotate(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn box_size_is_truncated_fraction_of_long_side(w in 1.0f32..4000.0, h in 1.0f32..4000.0) {
            let size = box_size(w, h);
            prop_assert_eq!(size, size.trunc());
            prop_assert!(size <= w.max(h) * consts::BOX_SIZE_RATIO);
            prop_assert!(size > w.max(h) * consts::BOX_SIZE_RATIO - 1.0);
        }
    }
}
