//! Per-frame inputs gathered by the platform layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Screen dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl ScreenSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Box edge length for this screen
    pub fn box_size(&self) -> f32 {
        crate::box_size(self.width, self.height)
    }
}

/// Touch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Press,
    Move,
    Release,
}

/// A touch at screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchKind,
    pub pos: Vec2,
}

impl TouchEvent {
    pub fn press(x: f32, y: f32) -> Self {
        Self {
            kind: TouchKind::Press,
            pos: Vec2::new(x, y),
        }
    }
}

/// Control events dispatched into the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Clear the scene and re-seed the fixtures
    Reset,
    /// Loop started; seed the fixtures
    Started,
}

/// Everything one frame step consumes
#[derive(Debug, Clone)]
pub struct FrameInput {
    /// Elapsed time since the previous frame (seconds)
    pub delta: f32,
    pub screen: ScreenSize,
    pub touches: Vec<TouchEvent>,
    pub events: Vec<GameEvent>,
}

impl FrameInput {
    /// A frame with no touches or events
    pub fn idle(delta: f32, screen: ScreenSize) -> Self {
        Self {
            delta,
            screen,
            touches: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Drop consumed one-shot inputs, keeping the screen size
    pub fn clear(&mut self) {
        self.touches.clear();
        self.events.clear();
    }
}
