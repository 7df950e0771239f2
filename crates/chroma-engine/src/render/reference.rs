//! CPU mirror of `shaders/color.wgsl`.
//!
//! Keeps the shader's behavior executable on the host so tests can state it
//! directly. Must stay in lockstep with the WGSL source.

use super::vertex::{Rgb, Vertex};

/// Interstage record written by `vs_main`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    /// Homogeneous clip-space position.
    pub clip_position: [f32; 4],
    pub color: Rgb,
}

/// Vertex stage: pass the color through, lift position to `w = 1`.
#[inline]
pub fn vs_main(input: Vertex) -> VertexOutput {
    VertexOutput {
        clip_position: input.pos.extend(1.0),
        color: input.color,
    }
}

/// Fragment stage: opaque output of the interpolated color.
#[inline]
pub fn fs_main(color: Rgb) -> [f32; 4] {
    color.extend(1.0)
}

/// Blends the color of three vertex outputs with barycentric weights.
///
/// Every clip position the vertex stage emits has `w = 1`, so
/// perspective-correct interpolation reduces to this linear blend.
pub fn interpolate(outputs: &[VertexOutput; 3], barycentric: [f32; 3]) -> Rgb {
    let [a, b, c] = outputs.map(|o| o.color);
    let [u, v, w] = barycentric;
    Rgb::new(
        a.r * u + b.r * v + c.r * w,
        a.g * u + b.g * v + c.g * w,
        a.b * u + b.b * v + c.b * w,
    )
}

/// Runs both stages for the point of `triangle` at `barycentric`.
pub fn shade(triangle: &[Vertex; 3], barycentric: [f32; 3]) -> [f32; 4] {
    let outputs = triangle.map(vs_main);
    fs_main(interpolate(&outputs, barycentric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vertex::Pos;

    fn tri() -> [Vertex; 3] {
        [
            Vertex::new(Pos::new(0.0, 0.5, 0.0), Rgb::RED),
            Vertex::new(Pos::new(-0.5, -0.5, 0.0), Rgb::GREEN),
            Vertex::new(Pos::new(0.5, -0.5, 0.0), Rgb::BLUE),
        ]
    }

    #[test]
    fn vertex_stage_appends_unit_w() {
        let out = vs_main(Vertex::new(Pos::new(0.25, -0.75, 0.5), Rgb::new(0.1, 0.2, 0.3)));
        assert_eq!(out.clip_position, [0.25, -0.75, 0.5, 1.0]);
        assert_eq!(out.color, Rgb::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn fragment_stage_is_opaque() {
        assert_eq!(fs_main(Rgb::new(0.4, 0.5, 0.6)), [0.4, 0.5, 0.6, 1.0]);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let out = vs_main(Vertex::new(Pos::new(3.0, -7.0, 2.0), Rgb::new(2.0, -1.0, 0.5)));
        assert_eq!(out.clip_position, [3.0, -7.0, 2.0, 1.0]);
        assert_eq!(fs_main(out.color), [2.0, -1.0, 0.5, 1.0]);
    }

    #[test]
    fn shading_at_a_corner_yields_that_corner_color() {
        let t = tri();
        assert_eq!(shade(&t, [1.0, 0.0, 0.0]), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(shade(&t, [0.0, 1.0, 0.0]), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(shade(&t, [0.0, 0.0, 1.0]), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn shading_at_centroid_blends_evenly() {
        let third = 1.0 / 3.0;
        let [r, g, b, a] = shade(&tri(), [third, third, third]);
        for c in [r, g, b] {
            assert!((c - third).abs() < 1e-6);
        }
        assert_eq!(a, 1.0);
    }
}
