//! Per-frame update
//!
//! Systems run once per rendered frame in a fixed order:
//! physics (with sensor gravity) → events/reset → touch spawning.

use super::input::{FrameInput, GameEvent, TouchEvent, TouchKind};
use super::state::{Sandbox, SandboxPhase};

/// Advance the sandbox by one frame
pub fn tick(sandbox: &mut Sandbox, input: &FrameInput) {
    sandbox.resize(input.screen);
    // `clamp` panics on an inverted range; min/max also drop NaN
    let dt = input.delta.max(0.0).min(sandbox.config.max_frame_delta);

    physics_system(sandbox, dt);
    events_system(sandbox, &input.events, dt);
    touch_system(sandbox, &input.touches);

    sandbox.frame_count += 1;
}

/// Apply the latest sensor gravity, then step the world by `dt`
pub fn physics_system(sandbox: &mut Sandbox, dt: f32) {
    if let Some(direction) = sandbox.gravity.poll() {
        sandbox.world_mut().set_gravity(direction);
    }
    if !matches!(sandbox.phase, SandboxPhase::Running) {
        return;
    }
    sandbox.world_mut().step(dt);
}

/// Run the reset timer, then dispatch control events in order
pub fn events_system(sandbox: &mut Sandbox, events: &[GameEvent], dt: f32) {
    sandbox.advance_reset(dt);

    for event in events {
        log::debug!("Event: {:?}", event);
        match event {
            GameEvent::Reset => sandbox.begin_reset(),
            GameEvent::Started => sandbox.handle_started(),
        }
    }
}

/// Spawn one box per press, in event order
pub fn touch_system(sandbox: &mut Sandbox, touches: &[TouchEvent]) {
    if !sandbox.is_running() {
        if !touches.is_empty() {
            log::debug!("Ignoring {} touches while resetting", touches.len());
        }
        return;
    }
    for touch in touches.iter().filter(|t| t.kind == TouchKind::Press) {
        sandbox.spawn_box(touch.pos);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::platform::ScriptedSensors;
    use crate::sim::entity::palette;
    use crate::sim::gravity::GravitySource;
    use crate::sim::input::ScreenSize;
    use crate::sim::sensor::SensorSample;
    use crate::sim::state::SandboxConfig;

    const DT: f32 = 1.0 / 60.0;

    fn phone() -> ScreenSize {
        ScreenSize::new(390.0, 844.0)
    }

    fn started() -> Sandbox {
        let mut sandbox = Sandbox::new(SandboxConfig::default(), phone());
        let mut input = FrameInput::idle(DT, phone());
        input.events.push(GameEvent::Started);
        tick(&mut sandbox, &input);
        sandbox
    }

    #[test]
    fn test_started_event_seeds_scene() {
        let sandbox = started();
        assert_eq!(sandbox.entity_count(), 5);
        assert_eq!(sandbox.frame_count, 1);
    }

    #[test]
    fn test_multiple_presses_in_one_frame() {
        let mut sandbox = started();
        let mut input = FrameInput::idle(DT, phone());
        input.touches = vec![
            TouchEvent::press(50.0, 100.0),
            TouchEvent {
                kind: TouchKind::Move,
                pos: Vec2::new(60.0, 100.0),
            },
            TouchEvent::press(150.0, 100.0),
            TouchEvent::press(250.0, 100.0),
        ];
        tick(&mut sandbox, &input);

        let spawned: Vec<_> = sandbox.entities().filter(|e| !e.role.is_fixture()).collect();
        assert_eq!(spawned.len(), 3);
        let colors: Vec<_> = spawned.iter().map(|e| e.color.unwrap()).collect();
        assert_eq!(colors, vec![palette::LIME, palette::PINK, palette::LIME]);
        // Event order preserved
        let xs: Vec<_> = spawned.iter().map(|e| sandbox.pose(e.id).unwrap().0.x).collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    }

    #[test]
    fn test_reset_then_tap_in_same_frame() {
        let mut sandbox = started();
        let mut input = FrameInput::idle(DT, phone());
        input.touches.push(TouchEvent::press(100.0, 200.0));
        tick(&mut sandbox, &input);
        assert_eq!(sandbox.entity_count(), 6);

        let mut input = FrameInput::idle(DT, phone());
        input.events.push(GameEvent::Reset);
        input.touches.push(TouchEvent::press(100.0, 200.0));
        tick(&mut sandbox, &input);
        // Synchronous reset re-seeds before the touch system runs
        assert_eq!(sandbox.entity_count(), 6);
        assert_eq!(sandbox.world().body_count(), 6);
    }

    #[test]
    fn test_delayed_reset_ignores_taps_until_done() {
        let config = SandboxConfig {
            reset_delay: 0.05,
            ..Default::default()
        };
        let mut sandbox = Sandbox::with_scene(config, phone());

        let mut input = FrameInput::idle(DT, phone());
        input.events.push(GameEvent::Reset);
        tick(&mut sandbox, &input);
        assert_eq!(sandbox.world().body_count(), 0);

        let mut input = FrameInput::idle(DT, phone());
        input.touches.push(TouchEvent::press(10.0, 10.0));
        tick(&mut sandbox, &input);
        assert_eq!(sandbox.entity_count(), 0);

        for _ in 0..3 {
            tick(&mut sandbox, &FrameInput::idle(DT, phone()));
        }
        assert!(sandbox.is_running());
        assert_eq!(sandbox.entity_count(), 5);
    }

    #[test]
    fn test_start_box_falls_to_floor() {
        let mut sandbox = started();
        let start_id = sandbox.entities().next().unwrap().id;
        let (before, _) = sandbox.pose(start_id).unwrap();
        for _ in 0..240 {
            tick(&mut sandbox, &FrameInput::idle(DT, phone()));
        }
        let (after, _) = sandbox.pose(start_id).unwrap();
        assert!(after.y > before.y);
        // Resting on the floor, whose top edge is at 844 - 63 - 31.5
        assert!(after.y < 844.0 - 63.0);
    }

    #[test]
    fn test_sensor_sample_redirects_gravity() {
        let config = SandboxConfig {
            gravity_source: GravitySource::Accelerometer,
            ..Default::default()
        };
        let mut sandbox = Sandbox::with_scene(config, phone());
        let mut sensors = ScriptedSensors::default();
        assert!(sandbox.toggle_sensor(&mut sensors).unwrap());

        sensors.emit(SensorSample::new(-1.0, 0.0, 0.0));
        tick(&mut sandbox, &FrameInput::idle(DT, phone()));
        assert_eq!(sandbox.world().gravity(), Vec2::new(-1.0, 0.0));

        assert!(!sandbox.toggle_sensor(&mut sensors).unwrap());
        assert_eq!(sandbox.world().gravity(), Vec2::new(0.0, 1.0));
        sensors.emit(SensorSample::new(1.0, 0.0, 0.0));
        tick(&mut sandbox, &FrameInput::idle(DT, phone()));
        assert_eq!(sandbox.world().gravity(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut sandbox = started();
        let start_id = sandbox.entities().next().unwrap().id;
        let (before, _) = sandbox.pose(start_id).unwrap();
        // A stalled tab reports a huge delta; the step is bounded
        tick(&mut sandbox, &FrameInput::idle(5.0, phone()));
        let (after, _) = sandbox.pose(start_id).unwrap();
        assert!(after.y - before.y < 100.0);
    }

    #[test]
    fn test_inverted_delta_bound_does_not_panic() {
        let config = SandboxConfig {
            max_frame_delta: -1.0,
            ..Default::default()
        };
        let mut sandbox = Sandbox::with_scene(config, phone());
        tick(&mut sandbox, &FrameInput::idle(DT, phone()));
        tick(&mut sandbox, &FrameInput::idle(f32::NAN, phone()));
        assert_eq!(sandbox.frame_count, 2);
        assert_eq!(sandbox.entity_count(), 5);
    }
}
