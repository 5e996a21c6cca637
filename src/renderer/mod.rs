//! WebGPU rendering module
//!
//! Every entity is drawn as a flat-coloured rotated rectangle.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, screen_to_ndc};
pub use shapes::{rectangle, sandbox_vertices};
pub use vertex::Vertex;
