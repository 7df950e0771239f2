//! GPU rendering subsystem.
//!
//! Owns the position/color pass-through shader and everything needed to
//! drive it:
//! - `vertex`: the vertex buffer format (location 0 position, location 1 color)
//! - `shader`: WGSL source and naga-based interface reflection
//! - `reference`: CPU mirror of both shader stages
//! - `mesh`: validated indexed geometry
//! - `renderer`: pipeline + buffers, one indexed draw per frame
//!
//! Positions are consumed as-is (no transform), so geometry is authored in
//! normalized device coordinates.

mod ctx;
pub mod mesh;
pub mod reference;
mod renderer;
pub mod shader;
pub mod vertex;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::Mesh;
pub use renderer::ColorRenderer;
pub use shader::ShaderInterface;
pub use vertex::{Pos, Rgb, Vertex};
