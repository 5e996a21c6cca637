//! Entity records: a physics body paired with its visual attributes

use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;

/// RGBA colour, components in 0..=1
pub type Color = [f32; 4];

/// Named colours used by the sandbox
pub mod palette {
    use super::Color;

    pub const RED: Color = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: Color = [0.0, 0.502, 0.0, 1.0];
    pub const PINK: Color = [1.0, 0.753, 0.796, 1.0];
    /// #B8E986
    pub const LIME: Color = [0.722, 0.914, 0.525, 1.0];

    /// Spawn colours, indexed by counter parity (even, odd)
    pub const SPAWN: [Color; 2] = [PINK, LIME];
}

/// Which draw routine an entity uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Rotated filled rectangle
    Rectangle,
}

/// Role of an entity in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    /// Dynamic box seeded at scene setup
    StartBox,
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
    /// Dynamic box created by a tap
    Spawned,
}

impl EntityRole {
    /// True for the five entities seeded by scene setup
    pub fn is_fixture(&self) -> bool {
        !matches!(self, EntityRole::Spawned)
    }
}

/// An on-screen object
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub body: RigidBodyHandle,
    /// Width and height in pixels
    pub size: Vec2,
    /// Fill colour (`None` = renderer default)
    pub color: Option<Color>,
    pub renderer: RendererKind,
    pub is_static: bool,
    pub role: EntityRole,
}
