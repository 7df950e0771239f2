//! Chroma engine crate.
//!
//! Hosts a position/color pass-through shader on wgpu: the platform loop,
//! GPU device/surface, the shader with its reflected interface contract, and
//! a renderer that feeds it indexed geometry.

pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
