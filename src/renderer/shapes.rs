//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::rotate;
use crate::sim::{RendererKind, Sandbox};

/// Generate vertices for a filled rectangle of `size` centred at `center`,
/// rotated by `angle` radians about its own centre.
pub fn rectangle(center: Vec2, size: Vec2, angle: f32, color: Option<[f32; 4]>) -> Vec<Vertex> {
    let color = color.unwrap_or(colors::DEFAULT_FILL);
    let half = size / 2.0;

    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|c| center + rotate(c, angle));

    // Two triangles
    [0, 1, 2, 0, 2, 3]
        .iter()
        .map(|&i| Vertex::new(corners[i].x, corners[i].y, color))
        .collect()
}

/// Vertices for every entity in the sandbox, in id order (screen pixels)
pub fn sandbox_vertices(sandbox: &Sandbox) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(sandbox.entity_count() * 6);
    for entity in sandbox.entities() {
        let Some((pos, angle)) = sandbox.pose(entity.id) else {
            continue;
        };
        match entity.renderer {
            RendererKind::Rectangle => {
                vertices.extend(rectangle(pos, entity.size, angle, entity.color));
            }
        }
    }
    vertices
}
