use chroma_engine::render::reference::{fs_main, interpolate, shade, vs_main};
use chroma_engine::render::{Pos, Rgb, Vertex};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

fn pos() -> impl Strategy<Value = Pos> {
    (finite(), finite(), finite()).prop_map(|(x, y, z)| Pos::new(x, y, z))
}

fn rgb() -> impl Strategy<Value = Rgb> {
    (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn barycentric() -> impl Strategy<Value = [f32; 3]> {
    (0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(a, b)| {
        let (u, v) = if a + b > 1.0 { (1.0 - a, 1.0 - b) } else { (a, b) };
        [u, v, 1.0 - u - v]
    })
}

proptest! {
    #[test]
    fn clip_position_is_position_with_unit_w(p in pos(), c in rgb()) {
        let out = vs_main(Vertex::new(p, c));
        prop_assert_eq!(out.clip_position, [p.x, p.y, p.z, 1.0]);
    }

    #[test]
    fn vertex_stage_passes_color_through(p in pos(), c in rgb()) {
        prop_assert_eq!(vs_main(Vertex::new(p, c)).color, c);
    }

    #[test]
    fn fragment_color_is_input_with_unit_alpha(c in rgb()) {
        prop_assert_eq!(fs_main(c), [c.r, c.g, c.b, 1.0]);
    }

    #[test]
    fn stages_are_pure(p in pos(), c in rgb()) {
        let v = Vertex::new(p, c);
        prop_assert_eq!(vs_main(v), vs_main(v));
        prop_assert_eq!(fs_main(c), fs_main(c));
    }

    #[test]
    fn uniform_triangle_shades_to_its_color(
        a in pos(), b in pos(), c in pos(), color in rgb(), w in barycentric()
    ) {
        let tri = [Vertex::new(a, color), Vertex::new(b, color), Vertex::new(c, color)];
        let [r, g, bl, alpha] = shade(&tri, w);
        prop_assert!((r - color.r).abs() < 1e-5);
        prop_assert!((g - color.g).abs() < 1e-5);
        prop_assert!((bl - color.b).abs() < 1e-5);
        prop_assert_eq!(alpha, 1.0);
    }

    #[test]
    fn interpolated_color_stays_within_corner_range(
        colors in prop::array::uniform3(rgb()), w in barycentric()
    ) {
        let outputs = colors.map(|c| vs_main(Vertex::new(Pos::default(), c)));
        let out = interpolate(&outputs, w);
        let lo = colors.iter().fold(f32::INFINITY, |m, c| m.min(c.r));
        let hi = colors.iter().fold(f32::NEG_INFINITY, |m, c| m.max(c.r));
        prop_assert!(out.r >= lo - 1e-5 && out.r <= hi + 1e-5);
    }
}
