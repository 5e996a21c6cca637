//! Sensor feed: a single-slot latest-value buffer
//!
//! Sensor listeners run on the platform's cadence, not the frame loop's. They
//! only ever `push` into the feed; the physics step `take`s the newest sample
//! at most once per frame. Older unread samples are overwritten.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::gravity::GravitySource;
use crate::error::Result;

/// One 3-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SensorSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Default)]
struct Slot {
    subscribed: bool,
    latest: Option<SensorSample>,
}

/// Shared handle to the feed; clones refer to the same slot
#[derive(Debug, Clone, Default)]
pub struct SensorFeed {
    slot: Arc<Mutex<Slot>>,
}

impl SensorFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start accepting samples. Returns false if already subscribed.
    pub fn subscribe(&self) -> bool {
        let mut slot = self.lock();
        if slot.subscribed {
            return false;
        }
        slot.subscribed = true;
        slot.latest = None;
        true
    }

    /// Stop accepting samples and drop any unread one.
    /// Returns false if there was no subscription.
    pub fn unsubscribe(&self) -> bool {
        let mut slot = self.lock();
        let was = slot.subscribed;
        slot.subscribed = false;
        slot.latest = None;
        was
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().subscribed
    }

    /// Publish a sample. Ignored (returns false) while unsubscribed.
    pub fn push(&self, sample: SensorSample) -> bool {
        let mut slot = self.lock();
        if !slot.subscribed {
            return false;
        }
        slot.latest = Some(sample);
        true
    }

    /// Consume the newest unread sample
    pub fn take(&self) -> Option<SensorSample> {
        self.lock().latest.take()
    }
}

/// Platform seam for registering sensor listeners
///
/// `attach` starts delivering samples of the given source into `feed`;
/// `detach` stops delivery. Implementations live in `crate::platform`.
pub trait SensorBackend {
    fn attach(&mut self, source: GravitySource, feed: SensorFeed) -> Result<()>;
    fn detach(&mut self);
}
