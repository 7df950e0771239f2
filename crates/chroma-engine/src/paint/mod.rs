//! Color types used by the host side (clear colors).

mod color;

pub use color::Color;
