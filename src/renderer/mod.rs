//! WebGPU rendering module
//!
//! Stars and trails are tessellated on the CPU into flat-colored triangles.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, canvas_to_ndc};
pub use shapes::scene;
pub use vertex::Vertex;
