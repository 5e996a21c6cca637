//! Gravity sources and the sensor-to-gravity mapping

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::sensor::{SensorBackend, SensorFeed, SensorSample};
use crate::error::Result;

/// Default gravity direction (screen-down)
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 1.0);

/// Where the gravity vector comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravitySource {
    /// Constant gravity, sensor samples ignored
    #[default]
    Fixed,
    /// Normalised accelerometer reading projected onto the screen plane
    Accelerometer,
    /// Raw gyroscope reading with the x axis flipped
    Gyroscope,
}

impl GravitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GravitySource::Fixed => "Fixed",
            GravitySource::Accelerometer => "Accelerometer",
            GravitySource::Gyroscope => "Gyroscope",
        }
    }

    /// Whether this source reads a device sensor
    pub fn uses_sensor(&self) -> bool {
        !matches!(self, GravitySource::Fixed)
    }

    /// Map a sample to a gravity direction.
    ///
    /// Returns `None` for `Fixed`, and for samples that would produce a
    /// non-finite vector (zero-length accelerometer reading, NaN input).
    pub fn map_sample(&self, sample: SensorSample) -> Option<Vec2> {
        let gravity = match self {
            GravitySource::Fixed => return None,
            GravitySource::Accelerometer => {
                let v = Vec3::new(sample.x, sample.y, sample.z);
                let unit = v.try_normalize()?;
                unit.truncate()
            }
            GravitySource::Gyroscope => Vec2::new(-sample.x, sample.y),
        };
        gravity.is_finite().then_some(gravity)
    }
}

/// Owns the gravity direction and the sensor subscription state
#[derive(Debug)]
pub struct GravityController {
    source: GravitySource,
    direction: Vec2,
    feed: SensorFeed,
    rejected: u64,
}

impl GravityController {
    pub fn new(source: GravitySource) -> Self {
        Self {
            source,
            direction: DEFAULT_GRAVITY,
            feed: SensorFeed::new(),
            rejected: 0,
        }
    }

    pub fn source(&self) -> GravitySource {
        self.source
    }

    /// Current gravity direction
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Handle for listeners to push samples into
    pub fn feed(&self) -> SensorFeed {
        self.feed.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.feed.is_subscribed()
    }

    /// Samples that mapped to no usable direction
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Subscribe the feed and attach a platform listener
    pub fn enable(&mut self, backend: &mut dyn SensorBackend) -> Result<()> {
        if !self.source.uses_sensor() {
            log::debug!("Gravity source is fixed; nothing to enable");
            return Ok(());
        }
        if !self.feed.subscribe() {
            return Ok(());
        }
        if let Err(e) = backend.attach(self.source, self.feed.clone()) {
            self.feed.unsubscribe();
            return Err(e);
        }
        log::info!("{} enabled", self.source.as_str());
        Ok(())
    }

    /// Detach the listener and unsubscribe; a no-op when not enabled
    pub fn disable(&mut self, backend: &mut dyn SensorBackend) {
        if !self.feed.unsubscribe() {
            log::debug!("Sensor disable requested without a subscription");
            return;
        }
        backend.detach();
        log::info!("{} disabled", self.source.as_str());
    }

    /// Flip the sensor on/off. Returns the new enabled state.
    pub fn toggle(&mut self, backend: &mut dyn SensorBackend) -> Result<bool> {
        if self.is_enabled() {
            self.disable(backend);
        } else {
            self.enable(backend)?;
        }
        Ok(self.is_enabled())
    }

    /// Switch to another source at runtime. The old subscription is dropped;
    /// the new source starts disabled.
    pub fn set_source(&mut self, source: GravitySource, backend: &mut dyn SensorBackend) {
        if source == self.source {
            return;
        }
        self.disable(backend);
        self.source = source;
        log::info!("Gravity source set to {}", source.as_str());
    }

    /// Reset the direction to screen-down
    pub fn reset_direction(&mut self) {
        self.direction = DEFAULT_GRAVITY;
    }

    /// Consume the newest sample, if any, and update the direction.
    /// Returns the new direction when it changed.
    pub fn poll(&mut self) -> Option<Vec2> {
        let sample = self.feed.take()?;
        match self.source.map_sample(sample) {
            Some(direction) => {
                self.direction = direction;
                Some(direction)
            }
            None => {
                self.rejected += 1;
                log::debug!("Ignoring unusable sensor sample {:?}", sample);
                None
            }
        }
    }
}
