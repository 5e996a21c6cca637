//! End-to-end frame loop sessions, no rendering

use glam::Vec2;
use proptest::prelude::*;

use tilt_sandbox::platform::{NoSensors, ScriptedSensors};
use tilt_sandbox::sim::{
    FrameInput, GameEvent, Sandbox, ScreenSize, SensorSample, TouchEvent, palette, tick,
};
use tilt_sandbox::{SandboxError, SandboxPreset, Settings, box_size};

const DT: f32 = 1.0 / 60.0;
const PHONE: ScreenSize = ScreenSize::new(390.0, 844.0);

fn start(preset: SandboxPreset) -> Sandbox {
    let settings = Settings::from_preset(preset);
    let mut sandbox = Sandbox::new(settings.physics, PHONE);
    let mut input = FrameInput::idle(DT, PHONE);
    input.events.push(GameEvent::Started);
    tick(&mut sandbox, &input);
    sandbox
}

fn taps(points: &[(f32, f32)]) -> FrameInput {
    let mut input = FrameInput::idle(DT, PHONE);
    input.touches = points.iter().map(|&(x, y)| TouchEvent::press(x, y)).collect();
    input
}

#[test]
fn test_tap_scenario_on_phone_screen() {
    let mut sandbox = start(SandboxPreset::Plain);
    tick(&mut sandbox, &taps(&[(100.0, 200.0)]));

    let spawned = sandbox.entities().last().unwrap();
    assert_eq!(spawned.id, 6);
    assert_eq!(spawned.size, Vec2::splat(63.0));
    assert_eq!(spawned.color, Some(palette::LIME));
    let (pos, _) = sandbox.pose(spawned.id).unwrap();
    assert!((pos - Vec2::new(100.0, 200.0)).length() < 1e-3);
}

#[test]
fn test_reset_restores_initial_body_count() {
    let mut sandbox = start(SandboxPreset::Plain);
    tick(&mut sandbox, &taps(&[(50.0, 100.0), (150.0, 100.0), (250.0, 100.0)]));
    for _ in 0..30 {
        tick(&mut sandbox, &FrameInput::idle(DT, PHONE));
    }
    let before: Vec<u32> = sandbox.entities().map(|e| e.id).collect();
    assert_eq!(before.len(), 8);
    assert_eq!(sandbox.ids_allocated(), 8);

    let mut input = FrameInput::idle(DT, PHONE);
    input.events.push(GameEvent::Reset);
    tick(&mut sandbox, &input);

    assert_eq!(sandbox.world().body_count(), 5);
    assert_eq!(sandbox.entity_count(), 5);
    assert!(before.iter().all(|id| sandbox.entity(*id).is_none()));
    // Fixtures are re-seeded under fresh ids
    assert_eq!(sandbox.ids_allocated(), 13);
    assert!(sandbox.entities().all(|e| e.id > 8));
}

#[test]
fn test_snapshot_preset_resets_after_delay() {
    let mut sandbox = start(SandboxPreset::Snapshot);
    let mut input = FrameInput::idle(DT, PHONE);
    input.events.push(GameEvent::Reset);
    tick(&mut sandbox, &input);
    assert!(!sandbox.is_running());

    let mut frames = 0;
    while !sandbox.is_running() {
        tick(&mut sandbox, &FrameInput::idle(DT, PHONE));
        frames += 1;
        assert!(frames < 10, "reset never completed");
    }
    // 50 ms at 60 Hz
    assert!((3..=4).contains(&frames), "took {frames} frames");
    assert_eq!(sandbox.world().body_count(), 5);
}

#[test]
fn test_accelerometer_tilt_moves_box_sideways() {
    let mut sandbox = start(SandboxPreset::Accelerometer);
    let mut sensors = ScriptedSensors::default();
    assert!(sandbox.toggle_sensor(&mut sensors).unwrap());

    tick(&mut sandbox, &taps(&[(195.0, 300.0)]));
    let id = sandbox.entities().last().unwrap().id;
    let (before, _) = sandbox.pose(id).unwrap();

    sensors.emit(SensorSample::new(1.0, 0.0, 0.0));
    for _ in 0..20 {
        tick(&mut sandbox, &FrameInput::idle(DT, PHONE));
    }
    let (after, _) = sandbox.pose(id).unwrap();
    assert!(after.x > before.x + 5.0, "box should drift right: {before:?} -> {after:?}");
}

#[test]
fn test_gyroscope_preset_spawns_bouncy_boxes() {
    let settings = Settings::from_preset(SandboxPreset::Gyroscope);
    assert_eq!(settings.physics.spawn_restitution, 1.0);
    let mut sandbox = start(SandboxPreset::Gyroscope);
    let mut sensors = ScriptedSensors::default();
    sandbox.toggle_sensor(&mut sensors).unwrap();
    sensors.emit(SensorSample::new(0.5, 0.25, 3.0));
    tick(&mut sandbox, &FrameInput::idle(DT, PHONE));
    assert_eq!(sandbox.world().gravity(), Vec2::new(-0.5, 0.25));
}

#[test]
fn test_sensor_unavailable_leaves_gravity_fixed() {
    let mut sandbox = start(SandboxPreset::Accelerometer);
    let err = sandbox.toggle_sensor(&mut NoSensors).unwrap_err();
    assert!(matches!(err, SandboxError::SensorUnavailable { .. }));
    assert!(!sandbox.gravity.is_enabled());
    assert_eq!(sandbox.world().gravity(), Vec2::new(0.0, 1.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn presses_spawn_alternating_boxes(xs in prop::collection::vec(40.0f32..350.0, 1..12)) {
        let mut sandbox = start(SandboxPreset::Plain);
        let points: Vec<_> = xs.iter().map(|&x| (x, 150.0)).collect();
        tick(&mut sandbox, &taps(&points));

        let spawned: Vec<_> = sandbox.entities().filter(|e| !e.role.is_fixture()).collect();
        prop_assert_eq!(spawned.len(), xs.len());
        for (i, entity) in spawned.iter().enumerate() {
            // Counter is 5 before the first spawn
            let expected = palette::SPAWN[(5 + i) % 2];
            prop_assert_eq!(entity.color, Some(expected));
            prop_assert!(!entity.is_static);
        }
    }

    #[test]
    fn every_box_uses_screen_box_size(w in 200.0f32..2000.0, h in 200.0f32..2000.0) {
        let screen = ScreenSize::new(w, h);
        let mut sandbox = Sandbox::with_scene(Settings::default().physics, screen);
        let id = sandbox.spawn_box(Vec2::new(w / 2.0, h / 3.0));
        let size = box_size(w, h);
        prop_assert_eq!(sandbox.entity(id).unwrap().size, Vec2::splat(size));
        let start_box = sandbox.entities().next().unwrap();
        prop_assert_eq!(start_box.size, Vec2::splat(size));
    }
}
