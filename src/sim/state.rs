//! Sandbox state: the physics world, entity map and reset state machine

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Color, Entity, EntityRole, RendererKind, palette};
use super::gravity::{GravityController, GravitySource};
use super::input::ScreenSize;
use super::sensor::SensorBackend;
use super::world::{PhysicsWorld, RectBody};
use crate::consts::*;
use crate::error::Result;

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub gravity_source: GravitySource,
    /// Acceleration in px/s² for a unit gravity vector
    pub gravity_px: f32,
    pub pixels_per_meter: f32,
    /// Restitution of boxes spawned by taps
    pub spawn_restitution: f32,
    /// Air friction of every dynamic box
    pub friction_air: f32,
    /// Seconds between clearing the world and re-seeding the fixtures
    pub reset_delay: f32,
    pub enable_sleeping: bool,
    /// Largest delta handed to one physics step (seconds)
    pub max_frame_delta: f32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            gravity_source: GravitySource::Fixed,
            gravity_px: GRAVITY_PX,
            pixels_per_meter: PIXELS_PER_METER,
            spawn_restitution: RESTITUTION,
            friction_air: FRICTION_AIR,
            reset_delay: 0.0,
            enable_sleeping: false,
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl SandboxConfig {
    /// Replace out-of-range values with defaults.
    ///
    /// Stored settings are user-editable, so a bad value must not reach the
    /// frame loop.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32, name: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("Invalid {} {}; using {}", name, value, fallback);
                fallback
            }
        };
        let non_negative = |value: f32, fallback: f32, name: &str| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                log::warn!("Invalid {} {}; using {}", name, value, fallback);
                fallback
            }
        };
        Self {
            gravity_px: positive(self.gravity_px, defaults.gravity_px, "gravity_px"),
            pixels_per_meter: positive(
                self.pixels_per_meter,
                defaults.pixels_per_meter,
                "pixels_per_meter",
            ),
            max_frame_delta: positive(
                self.max_frame_delta,
                defaults.max_frame_delta,
                "max_frame_delta",
            ),
            reset_delay: non_negative(self.reset_delay, defaults.reset_delay, "reset_delay"),
            spawn_restitution: non_negative(
                self.spawn_restitution,
                defaults.spawn_restitution,
                "spawn_restitution",
            ),
            friction_air: non_negative(self.friction_air, defaults.friction_air, "friction_air"),
            ..self
        }
    }
}

/// Reset state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SandboxPhase {
    Running,
    /// World cleared; fixtures re-seeded once `remaining` reaches zero
    Resetting { remaining: f32 },
}

/// The playground
pub struct Sandbox {
    pub config: SandboxConfig,
    pub phase: SandboxPhase,
    pub screen: ScreenSize,
    pub gravity: GravityController,
    /// Frames stepped since creation
    pub frame_count: u64,
    world: PhysicsWorld,
    entities: BTreeMap<u32, Entity>,
    /// Last allocated entity id (ids start at 1, never reused)
    entity_count: u32,
}

impl Sandbox {
    /// Create an empty sandbox. Fixtures are seeded by `setup_scene` or a
    /// `Started` event.
    pub fn new(config: SandboxConfig, screen: ScreenSize) -> Self {
        let world = PhysicsWorld::new(
            config.gravity_px,
            config.pixels_per_meter,
            config.enable_sleeping,
        );
        Self {
            gravity: GravityController::new(config.gravity_source),
            config,
            phase: SandboxPhase::Running,
            screen,
            frame_count: 0,
            world,
            entities: BTreeMap::new(),
            entity_count: 0,
        }
    }

    /// Create a sandbox with the fixtures already seeded
    pub fn with_scene(config: SandboxConfig, screen: ScreenSize) -> Self {
        let mut sandbox = Self::new(config, screen);
        sandbox.setup_scene();
        sandbox
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Entities ordered by id
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Replace the configuration and rebuild the scene.
    ///
    /// Any sensor subscription is dropped first; the new gravity source
    /// starts disabled.
    pub fn reconfigure(&mut self, config: SandboxConfig, backend: &mut dyn SensorBackend) {
        self.gravity.disable(backend);
        log::info!("Reconfiguring sandbox ({})", config.gravity_source.as_str());
        *self = Self::with_scene(config, self.screen);
    }

    /// Ids handed out so far
    pub fn ids_allocated(&self) -> u32 {
        self.entity_count
    }

    pub fn is_running(&self) -> bool {
        self.phase == SandboxPhase::Running
    }

    /// Position and rotation of an entity's body, in pixels
    pub fn pose(&self, id: u32) -> Option<(Vec2, f32)> {
        self.entities
            .get(&id)
            .and_then(|e| self.world.body_pose(e.body))
    }

    /// Insert a body and its entity record under the next id
    fn add_rectangle(&mut self, rect: RectBody, color: Option<Color>, role: EntityRole) -> u32 {
        let body = self.world.add_rectangle(rect);
        self.entity_count += 1;
        let id = self.entity_count;
        self.entities.insert(
            id,
            Entity {
                id,
                body,
                size: rect.size,
                color,
                renderer: RendererKind::Rectangle,
                is_static: rect.is_static,
                role,
            },
        );
        id
    }

    /// Seed the start box and the four boundaries for the current screen
    pub fn setup_scene(&mut self) {
        let ScreenSize { width, height } = self.screen;
        let size = self.screen.box_size();
        let friction_air = self.config.friction_air;

        self.add_rectangle(
            RectBody::dynamic(self.screen.center(), Vec2::splat(size), friction_air, RESTITUTION),
            Some(palette::RED),
            EntityRole::StartBox,
        );

        let boundaries = [
            (
                EntityRole::Floor,
                Vec2::new(width / 2.0, height - size),
                Vec2::new(width, size),
            ),
            (
                EntityRole::Ceiling,
                Vec2::new(width / 2.0, CEILING_Y),
                Vec2::new(width, size),
            ),
            (
                EntityRole::LeftWall,
                Vec2::new(-size / 2.0, height / 2.0),
                Vec2::new(size, height),
            ),
            (
                EntityRole::RightWall,
                Vec2::new(width + size / 2.0, height / 2.0),
                Vec2::new(size, height),
            ),
        ];
        for (role, center, extent) in boundaries {
            self.add_rectangle(RectBody::fixed(center, extent), Some(palette::GREEN), role);
        }

        log::debug!(
            "Scene seeded for {}x{} (box {}), ids up to {}",
            width,
            height,
            size,
            self.entity_count
        );
    }

    /// Spawn a dynamic box centred at `pos`. Colour follows counter parity.
    pub fn spawn_box(&mut self, pos: Vec2) -> u32 {
        let size = self.screen.box_size();
        let color = palette::SPAWN[(self.entity_count % 2) as usize];
        let rect = RectBody::dynamic(
            pos,
            Vec2::splat(size),
            self.config.friction_air,
            self.config.spawn_restitution,
        );
        let id = self.add_rectangle(rect, Some(color), EntityRole::Spawned);
        log::debug!("Spawned box {} at ({:.0}, {:.0})", id, pos.x, pos.y);
        id
    }

    /// Clear the world and enter `Resetting`. A reset while already
    /// resetting restarts the timer.
    pub fn begin_reset(&mut self) {
        let removed = self.world.clear();
        let dropped = self.entities.len();
        self.entities.clear();
        self.phase = SandboxPhase::Resetting {
            remaining: self.config.reset_delay.max(0.0),
        };
        log::info!("Reset: removed {} bodies, {} entities", removed, dropped);
        self.finish_reset_if_due();
    }

    /// Count the reset timer down by `dt`
    pub fn advance_reset(&mut self, dt: f32) {
        if let SandboxPhase::Resetting { remaining } = &mut self.phase {
            *remaining -= dt.max(0.0);
            self.finish_reset_if_due();
        }
    }

    fn finish_reset_if_due(&mut self) {
        if let SandboxPhase::Resetting { remaining } = self.phase {
            if remaining <= 0.0 {
                self.setup_scene();
                self.phase = SandboxPhase::Running;
                log::info!("Reset complete ({} entities)", self.entities.len());
            }
        }
    }

    /// Handle the loop-started signal: seed fixtures into an empty scene
    pub fn handle_started(&mut self) {
        if !self.entities.is_empty() {
            log::debug!("Started event ignored; scene already populated");
            return;
        }
        self.setup_scene();
    }

    /// Update the screen size used by later spawns and resets
    pub fn resize(&mut self, screen: ScreenSize) {
        if screen != self.screen {
            log::info!("Screen resized to {}x{}", screen.width, screen.height);
            self.screen = screen;
        }
    }

    /// Toggle the sensor-driven gravity source on or off
    pub fn toggle_sensor(&mut self, backend: &mut dyn SensorBackend) -> Result<bool> {
        let enabled = self.gravity.toggle(backend)?;
        if !enabled {
            self.gravity.reset_direction();
            self.world.set_gravity(self.gravity.direction());
        }
        Ok(enabled)
    }
}
