//! Physics world handle
//!
//! Thin wrapper over the rapier2d pipeline. The world is simulated in metres
//! with y pointing down (screen orientation); every public method takes and
//! returns pixels.

use glam::Vec2;
use rapier2d::prelude::*;

/// Convert a per-step air friction coefficient (60 Hz reference) into a
/// continuous linear damping rate.
///
/// Air friction scales velocity by `1 - f` every 1/60 s; rapier damping scales
/// it by `1 / (1 + dt * d)`, so `d ≈ -ln(1 - f) * 60`.
pub fn air_friction_to_damping(friction_air: f32) -> f32 {
    let f = friction_air.clamp(0.0, 0.99);
    -(1.0 - f).ln() * 60.0
}

/// Body parameters for a new rectangle
#[derive(Debug, Clone, Copy)]
pub struct RectBody {
    /// Centre in pixels
    pub center: Vec2,
    /// Width and height in pixels
    pub size: Vec2,
    pub is_static: bool,
    pub friction_air: f32,
    pub restitution: f32,
}

impl RectBody {
    /// A static body with default surface properties
    pub fn fixed(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            is_static: true,
            friction_air: 0.0,
            restitution: 0.0,
        }
    }

    /// A dynamic body
    pub fn dynamic(center: Vec2, size: Vec2, friction_air: f32, restitution: f32) -> Self {
        Self {
            center,
            size,
            is_static: false,
            friction_air,
            restitution,
        }
    }
}

/// Single physics world shared by every entity
pub struct PhysicsWorld {
    /// Gravity direction (unit-ish vector in screen space)
    gravity: Vec2,
    /// Acceleration in px/s² for a unit gravity vector
    gravity_px: f32,
    pixels_per_meter: f32,
    enable_sleeping: bool,
    surface_friction: f32,

    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl PhysicsWorld {
    pub fn new(gravity_px: f32, pixels_per_meter: f32, enable_sleeping: bool) -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            gravity_px,
            pixels_per_meter: pixels_per_meter.max(f32::EPSILON),
            enable_sleeping,
            surface_friction: crate::consts::SURFACE_FRICTION,
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    /// Current gravity direction
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Overwrite the global gravity direction
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Number of bodies currently registered
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    fn to_world(&self, px: Vec2) -> Vector<Real> {
        vector![px.x / self.pixels_per_meter, px.y / self.pixels_per_meter]
    }

    /// Insert a rectangle body with its collider
    pub fn add_rectangle(&mut self, rect: RectBody) -> RigidBodyHandle {
        let builder = if rect.is_static {
            RigidBodyBuilder::fixed()
        } else {
            let damping = air_friction_to_damping(rect.friction_air);
            RigidBodyBuilder::dynamic()
                .linear_damping(damping)
                .angular_damping(damping)
                .can_sleep(self.enable_sleeping)
        };
        let body = builder.translation(self.to_world(rect.center)).build();
        let handle = self.bodies.insert(body);

        let half = rect.size / (2.0 * self.pixels_per_meter);
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .restitution(rect.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(self.surface_friction)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    /// Position (pixels) and rotation (radians) of a body
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec2, f32)> {
        self.bodies.get(handle).map(|body| {
            let t = body.translation();
            (
                Vec2::new(t.x, t.y) * self.pixels_per_meter,
                body.rotation().angle(),
            )
        })
    }

    /// Remove every body (and attached collider) from the world
    pub fn clear(&mut self) -> usize {
        let handles: Vec<RigidBodyHandle> = self.bodies.iter().map(|(h, _)| h).collect();
        for handle in &handles {
            self.bodies.remove(
                *handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        handles.len()
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.params.dt = dt;
        let g = self.gravity * (self.gravity_px / self.pixels_per_meter);
        let gravity = vector![g.x, g.y];

        self.pipeline.step(
            &gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(1000.0, 50.0, false)
    }

    #[test]
    fn test_add_and_read_pose() {
        let mut w = world();
        let h = w.add_rectangle(RectBody::fixed(Vec2::new(100.0, 200.0), Vec2::new(63.0, 63.0)));
        let (pos, angle) = w.body_pose(h).unwrap();
        assert!((pos - Vec2::new(100.0, 200.0)).length() < 1e-3);
        assert_eq!(angle, 0.0);
        assert_eq!(w.body_count(), 1);
    }

    #[test]
    fn test_dynamic_body_falls_with_gravity() {
        let mut w = world();
        let h = w.add_rectangle(RectBody::dynamic(
            Vec2::new(100.0, 100.0),
            Vec2::splat(20.0),
            0.021,
            0.5,
        ));
        for _ in 0..30 {
            w.step(1.0 / 60.0);
        }
        let (pos, _) = w.body_pose(h).unwrap();
        assert!(pos.y > 100.0, "box should fall toward +y, got {pos:?}");
    }

    #[test]
    fn test_gravity_direction_is_honoured() {
        let mut w = world();
        w.set_gravity(Vec2::new(-1.0, 0.0));
        let h = w.add_rectangle(RectBody::dynamic(Vec2::ZERO, Vec2::splat(20.0), 0.0, 0.0));
        for _ in 0..10 {
            w.step(1.0 / 60.0);
        }
        let (pos, _) = w.body_pose(h).unwrap();
        assert!(pos.x < 0.0);
        assert!(pos.y.abs() < 1e-3);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut w = world();
        let h = w.add_rectangle(RectBody::fixed(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));
        w.step(0.5);
        let (pos, _) = w.body_pose(h).unwrap();
        assert!((pos - Vec2::new(50.0, 50.0)).length() < 1e-4);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut w = world();
        for i in 0..4 {
            w.add_rectangle(RectBody::fixed(Vec2::splat(i as f32 * 30.0), Vec2::splat(10.0)));
        }
        assert_eq!(w.clear(), 4);
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut w = world();
        let h = w.add_rectangle(RectBody::dynamic(Vec2::ZERO, Vec2::splat(10.0), 0.0, 0.0));
        w.step(0.0);
        assert_eq!(w.body_pose(h).unwrap().0, Vec2::ZERO);
    }

    #[test]
    fn test_air_friction_conversion() {
        assert_eq!(air_friction_to_damping(0.0), 0.0);
        let d = air_friction_to_damping(0.021);
        assert!(d > 1.2 && d < 1.35, "got {d}");
    }
}
