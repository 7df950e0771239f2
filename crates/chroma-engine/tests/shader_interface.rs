use chroma_engine::render::shader::{
    check_passthrough, parse_module, IoAttribute, IoSlot, ShaderInterface, FS_ENTRY, SOURCE, VS_ENTRY,
};
use chroma_engine::render::Vertex;

fn attr(slot: IoSlot, components: u32) -> IoAttribute {
    IoAttribute { slot, components }
}

#[test]
fn builtin_shader_parses_and_validates() {
    ShaderInterface::builtin().unwrap_or_else(|err| panic!("{err:#}"));
}

#[test]
fn entry_point_names_are_in_source() {
    assert!(SOURCE.contains(&format!("fn {VS_ENTRY}(")));
    assert!(SOURCE.contains(&format!("fn {FS_ENTRY}(")));
}

#[test]
fn vertex_stage_interface_is_exact() {
    let iface = ShaderInterface::builtin().unwrap();
    assert_eq!(
        iface.vertex.inputs,
        vec![attr(IoSlot::Location(0), 3), attr(IoSlot::Location(1), 3)]
    );
    assert_eq!(
        iface.vertex.outputs,
        vec![attr(IoSlot::Location(0), 3), attr(IoSlot::Position, 4)]
    );
}

#[test]
fn fragment_stage_interface_is_exact() {
    let iface = ShaderInterface::builtin().unwrap();
    assert_eq!(iface.fragment.input(IoSlot::Location(0)), Some(attr(IoSlot::Location(0), 3)));
    assert_eq!(iface.fragment.outputs, vec![attr(IoSlot::Location(0), 4)]);
}

#[test]
fn builtin_shader_matches_vertex_layout() {
    let iface = ShaderInterface::builtin().unwrap();
    iface.check_all(&Vertex::layout()).unwrap();
}

#[test]
fn layout_with_wrong_width_is_rejected() {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x3
    ];
    let layout = wgpu::VertexBufferLayout {
        array_stride: 20,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    };
    let err = ShaderInterface::builtin().unwrap().check_vertex_layout(&layout).unwrap_err();
    assert!(err.to_string().contains("@location(0)"), "{err:#}");
}

#[test]
fn layout_missing_color_is_rejected() {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    let layout = wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    };
    let err = ShaderInterface::builtin().unwrap().check_vertex_layout(&layout).unwrap_err();
    assert!(err.to_string().contains("@location(1)"), "{err:#}");
}

#[test]
fn integer_layout_is_rejected() {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Uint32x3
    ];
    let layout = wgpu::VertexBufferLayout {
        array_stride: 24,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    };
    assert!(ShaderInterface::builtin().unwrap().check_vertex_layout(&layout).is_err());
}

#[test]
fn rgb_only_fragment_output_is_rejected() {
    let src = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) p: vec3<f32>, @location(1) c: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.pos = vec4<f32>(p, 1.0);
    out.color = c;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec3<f32> {
    return in.color;
}
"#;
    let iface = ShaderInterface::reflect(src).unwrap();
    iface.check_stage_linkage().unwrap();
    assert!(iface.check_color_target().is_err());
}

#[test]
fn unlinked_fragment_input_is_rejected() {
    let src = r#"
@vertex
fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 1.0);
}

@fragment
fn fs_main(@location(0) c: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(c, 1.0);
}
"#;
    let iface = ShaderInterface::reflect(src).unwrap();
    let err = iface.check_stage_linkage().unwrap_err();
    assert!(err.to_string().contains("not written"), "{err:#}");
}

#[test]
fn missing_entry_point_is_reported() {
    let src = r#"
@vertex
fn main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 1.0);
}
"#;
    let err = ShaderInterface::reflect(src).unwrap_err();
    assert!(format!("{err:#}").contains(VS_ENTRY), "{err:#}");
}

#[test]
fn syntax_errors_are_reported() {
    let err = ShaderInterface::reflect("fn vs_main( {").unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse WGSL"), "{err:#}");
}

#[test]
fn overlapping_attributes_are_rejected() {
    let attrs = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 1,
        },
    ];
    let layout = wgpu::VertexBufferLayout {
        array_stride: 24,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attrs,
    };
    let err = ShaderInterface::builtin().unwrap().check_vertex_layout(&layout).unwrap_err();
    assert!(err.to_string().contains("overlap"), "{err:#}");
}

#[test]
fn short_stride_is_rejected() {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3
    ];
    let layout = wgpu::VertexBufferLayout {
        array_stride: 20,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    };
    let err = ShaderInterface::builtin().unwrap().check_vertex_layout(&layout).unwrap_err();
    assert!(err.to_string().contains("stride"), "{err:#}");
}

fn body_check(source: &str) -> anyhow::Result<()> {
    check_passthrough(&parse_module(source)?)
}

fn edited(from: &str, to: &str) -> String {
    assert!(SOURCE.contains(from), "shader no longer contains {from:?}");
    SOURCE.replace(from, to)
}

#[test]
fn builtin_shader_body_passes_values_through() {
    body_check(SOURCE).unwrap_or_else(|err| panic!("{err:#}"));
}

#[test]
fn swizzled_color_is_rejected() {
    let src = edited("out.color = model.color;", "out.color = model.color.bgr;");
    let err = body_check(&src).unwrap_err();
    assert!(err.to_string().contains("color unchanged"), "{err:#}");
}

#[test]
fn scaled_color_is_rejected() {
    let src = edited("out.color = model.color;", "out.color = model.color * 0.5;");
    assert!(body_check(&src).is_err());
}

#[test]
fn clip_w_other_than_one_is_rejected() {
    let src = edited(
        "vec4<f32>(model.position, 1.0)",
        "vec4<f32>(model.position, 0.5)",
    );
    let err = body_check(&src).unwrap_err();
    assert!(err.to_string().contains("clip position"), "{err:#}");
}

#[test]
fn clip_from_color_is_rejected() {
    let src = edited(
        "vec4<f32>(model.position, 1.0)",
        "vec4<f32>(model.color, 1.0)",
    );
    assert!(body_check(&src).is_err());
}

#[test]
fn fragment_alpha_other_than_one_is_rejected() {
    let src = edited("vec4<f32>(in.color, 1.0)", "vec4<f32>(in.color, 0.0)");
    let err = body_check(&src).unwrap_err();
    assert!(err.to_string().contains("fragment stage"), "{err:#}");
}

#[test]
fn struct_literal_output_is_followed() {
    let src = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) p: vec3<f32>, @location(1) c: vec3<f32>) -> VsOut {
    return VsOut(vec4<f32>(p, 1.0), c);
}

@fragment
fn fs_main(@location(0) c: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(c, 1.0);
}
"#;
    body_check(src).unwrap_or_else(|err| panic!("{err:#}"));
}
