//! Platform abstraction layer
//!
//! Sensor backends behind `sim::SensorBackend`:
//! - `web::WebSensors`: browser `devicemotion` listeners (wasm32)
//! - `NoSensors`: platforms without motion sensors
//! - `ScriptedSensors`: samples pushed by code (headless runs, tests)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::error::{Result, SandboxError};
use crate::sim::{GravitySource, SensorBackend, SensorFeed, SensorSample};

/// Answer to a motion-sensor permission request (iOS Safari)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPermission {
    Granted,
    Denied,
    /// Anything else the browser reports
    Unknown,
}

impl MotionPermission {
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("granted") => MotionPermission::Granted,
            Some("denied") => MotionPermission::Denied,
            _ => MotionPermission::Unknown,
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == MotionPermission::Granted
    }
}

/// Backend for platforms without motion sensors
#[derive(Debug, Default)]
pub struct NoSensors;

impl SensorBackend for NoSensors {
    fn attach(&mut self, source: GravitySource, _feed: SensorFeed) -> Result<()> {
        Err(SandboxError::SensorUnavailable { kind: source })
    }

    fn detach(&mut self) {}
}

/// Backend whose samples come from `emit` calls
#[derive(Debug, Default)]
pub struct ScriptedSensors {
    attached: Option<(GravitySource, SensorFeed)>,
}

impl ScriptedSensors {
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Source currently attached, if any
    pub fn source(&self) -> Option<GravitySource> {
        self.attached.as_ref().map(|(source, _)| *source)
    }

    /// Deliver a sample as the sensor would. Returns false when detached.
    pub fn emit(&self, sample: SensorSample) -> bool {
        match &self.attached {
            Some((_, feed)) => feed.push(sample),
            None => false,
        }
    }
}

impl SensorBackend for ScriptedSensors {
    fn attach(&mut self, source: GravitySource, feed: SensorFeed) -> Result<()> {
        self.attached = Some((source, feed));
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_states() {
        assert!(MotionPermission::from_state(Some("granted")).is_granted());
        assert_eq!(MotionPermission::from_state(Some("denied")), MotionPermission::Denied);
        assert_eq!(MotionPermission::from_state(Some("prompt")), MotionPermission::Unknown);
        assert!(!MotionPermission::from_state(None).is_granted());
    }

    #[test]
    fn test_no_sensors_refuses_attach() {
        let mut backend = NoSensors;
        let err = backend
            .attach(GravitySource::Gyroscope, SensorFeed::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SandboxError::SensorUnavailable {
                kind: GravitySource::Gyroscope
            }
        ));
    }

    #[test]
    fn test_scripted_emit_reaches_feed() {
        let feed = SensorFeed::new();
        feed.subscribe();
        let mut backend = ScriptedSensors::default();
        assert!(!backend.emit(SensorSample::new(1.0, 0.0, 0.0)));

        backend.attach(GravitySource::Accelerometer, feed.clone()).unwrap();
        assert_eq!(backend.source(), Some(GravitySource::Accelerometer));
        assert!(backend.emit(SensorSample::new(1.0, 0.0, 0.0)));
        assert_eq!(feed.take(), Some(SensorSample::new(1.0, 0.0, 0.0)));

        backend.detach();
        assert!(!backend.emit(SensorSample::new(1.0, 0.0, 0.0)));
    }
}
