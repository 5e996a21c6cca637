//! Simulation module
//!
//! Everything that happens inside one frame step lives here:
//! - Entity bookkeeping (id → body + visual attributes)
//! - Gravity sources and the sensor feed
//! - Running/Resetting state machine
//! - No rendering or platform dependencies

pub mod entity;
pub mod gravity;
pub mod input;
pub mod sensor;
pub mod state;
pub mod tick;
pub mod world;

pub use entity::{Color, Entity, EntityRole, RendererKind, palette};
pub use gravity::{DEFAULT_GRAVITY, GravityController, GravitySource};
pub use input::{FrameInput, GameEvent, ScreenSize, TouchEvent, TouchKind};
pub use sensor::{SensorBackend, SensorFeed, SensorSample};
pub use state::{Sandbox, SandboxConfig, SandboxPhase};
pub use tick::tick;
pub use world::{PhysicsWorld, RectBody};
