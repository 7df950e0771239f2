//! The position/color pass-through shader and its interface contract.
//!
//! Contract (must hold bit-exact):
//! - vertex inputs: `@location(0)` vec3<f32> position, `@location(1)` vec3<f32> color
//! - vertex outputs: `@builtin(position)` vec4<f32>, `@location(0)` vec3<f32> color
//! - fragment output: `@location(0)` vec4<f32> (rgb from input, alpha = 1)

use anyhow::{anyhow, bail, ensure, Context, Result};

/// WGSL source of the shader.
pub const SOURCE: &str = include_str!("shaders/color.wgsl");

pub const VS_ENTRY: &str = "vs_main";
pub const FS_ENTRY: &str = "fs_main";

/// Descriptor for `wgpu::Device::create_shader_module`.
pub fn module_descriptor() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("chroma color shader"),
        source: wgpu::ShaderSource::Wgsl(SOURCE.into()),
    }
}

/// Parses and validates WGSL into a naga module.
///
/// Errors carry naga's source-annotated message.
pub fn parse_module(source: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| anyhow!(e.emit_to_string(source)))
        .context("failed to parse WGSL")?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| anyhow!(e.emit_to_string(source)))
    .context("WGSL module failed validation")?;

    Ok(module)
}

/// Checks what the entry points compute, not just their signatures:
///
/// - `vs_main` writes `vec4(position, 1.0)` to the clip position
/// - `vs_main` writes the color input, untouched, to `@location(0)`
/// - `fs_main` returns `vec4(color, 1.0)`
pub fn check_passthrough(module: &naga::Module) -> Result<()> {
    let vs = &find_entry(module, naga::ShaderStage::Vertex, VS_ENTRY)?.function;

    let clip = output_value(module, vs, IoSlot::Position)?;
    ensure!(
        is_lift(module, vs, clip, IoSlot::Location(0)),
        "vertex stage must write vec4(position, 1.0) to the clip position"
    );

    let color = output_value(module, vs, IoSlot::Location(0))?;
    ensure!(
        input_slot(module, vs, color) == Some(IoSlot::Location(1)),
        "vertex stage must forward the input color unchanged"
    );

    let fs = &find_entry(module, naga::ShaderStage::Fragment, FS_ENTRY)?.function;
    let rgba = output_value(module, fs, IoSlot::Location(0))?;
    ensure!(
        is_lift(module, fs, rgba, IoSlot::Location(0)),
        "fragment stage must return vec4(color, 1.0)"
    );

    Ok(())
}

/// Where a stage input/output is bound.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum IoSlot {
    Location(u32),
    /// `@builtin(position)`: clip position out of the vertex stage, fragment
    /// coordinate into the fragment stage.
    Position,
}

/// One flattened stage input or output.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IoAttribute {
    pub slot: IoSlot,
    /// Number of 32-bit float components (1 for scalars).
    pub components: u32,
}

/// Inputs and outputs of a single entry point, sorted by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageInterface {
    pub inputs: Vec<IoAttribute>,
    pub outputs: Vec<IoAttribute>,
}

impl StageInterface {
    pub fn input(&self, slot: IoSlot) -> Option<IoAttribute> {
        self.inputs.iter().copied().find(|a| a.slot == slot)
    }

    pub fn output(&self, slot: IoSlot) -> Option<IoAttribute> {
        self.outputs.iter().copied().find(|a| a.slot == slot)
    }
}

/// Reflected interface of the vertex + fragment entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderInterface {
    pub vertex: StageInterface,
    pub fragment: StageInterface,
}

impl ShaderInterface {
    /// Parses and validates `source`, then reflects `vs_main` and `fs_main`.
    pub fn reflect(source: &str) -> Result<Self> {
        Self::from_module(&parse_module(source)?)
    }

    /// Reflects `vs_main` and `fs_main` of an already validated module.
    pub fn from_module(module: &naga::Module) -> Result<Self> {
        Ok(Self {
            vertex: reflect_entry(module, naga::ShaderStage::Vertex, VS_ENTRY)?,
            fragment: reflect_entry(module, naga::ShaderStage::Fragment, FS_ENTRY)?,
        })
    }

    /// Reflects the built-in shader.
    pub fn builtin() -> Result<Self> {
        Self::reflect(SOURCE)
    }

    /// Checks that every vertex-stage input is fed by `layout` with a float
    /// format of the same width, and that the attributes fit the stride
    /// without overlapping.
    pub fn check_vertex_layout(&self, layout: &wgpu::VertexBufferLayout<'_>) -> Result<()> {
        for input in &self.vertex.inputs {
            let IoSlot::Location(loc) = input.slot else {
                continue;
            };
            let attr = layout
                .attributes
                .iter()
                .find(|a| a.shader_location == loc)
                .with_context(|| format!("vertex input @location({loc}) has no buffer attribute"))?;
            let provided = float_components(attr.format).with_context(|| {
                format!("vertex input @location({loc}) is fed by non-f32 format {:?}", attr.format)
            })?;
            ensure!(
                provided == input.components,
                "vertex input @location({loc}) expects {} components, buffer provides {:?}",
                input.components,
                attr.format
            );
        }

        for (i, a) in layout.attributes.iter().enumerate() {
            let end = a.offset + a.format.size();
            ensure!(
                end <= layout.array_stride,
                "attribute @location({}) ends at byte {end}, past the stride of {}",
                a.shader_location,
                layout.array_stride
            );
            for b in &layout.attributes[i + 1..] {
                ensure!(
                    end <= b.offset || b.offset + b.format.size() <= a.offset,
                    "attributes @location({}) and @location({}) overlap",
                    a.shader_location,
                    b.shader_location
                );
            }
        }
        Ok(())
    }

    /// Checks that the vertex stage writes the clip position and every
    /// user-defined fragment input.
    pub fn check_stage_linkage(&self) -> Result<()> {
        ensure!(
            self.vertex.output(IoSlot::Position).map(|a| a.components) == Some(4),
            "vertex stage does not write a vec4 clip position"
        );

        for input in &self.fragment.inputs {
            if input.slot == IoSlot::Position {
                continue;
            }
            let Some(out) = self.vertex.output(input.slot) else {
                bail!("fragment input {:?} is not written by the vertex stage", input.slot);
            };
            ensure!(
                out.components == input.components,
                "fragment input {:?} has {} components, vertex stage writes {}",
                input.slot,
                input.components,
                out.components
            );
        }
        Ok(())
    }

    /// Checks that the fragment stage writes an RGBA value to color target 0.
    pub fn check_color_target(&self) -> Result<()> {
        match self.fragment.output(IoSlot::Location(0)) {
            Some(out) if out.components == 4 => Ok(()),
            Some(out) => bail!(
                "fragment output @location(0) has {} components, expected 4",
                out.components
            ),
            None => bail!("fragment stage does not write @location(0)"),
        }
    }

    /// Runs every check against `layout`.
    pub fn check_all(&self, layout: &wgpu::VertexBufferLayout<'_>) -> Result<()> {
        self.check_vertex_layout(layout)?;
        self.check_stage_linkage()?;
        self.check_color_target()
    }
}

fn find_entry<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Result<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .with_context(|| format!("missing {stage:?} entry point `{name}`"))
}

fn reflect_entry(
    module: &naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Result<StageInterface> {
    let ep = find_entry(module, stage, name)?;

    let mut iface = StageInterface::default();

    for arg in &ep.function.arguments {
        collect(module, arg.ty, arg.binding.as_ref(), &mut iface.inputs)?;
    }
    if let Some(result) = &ep.function.result {
        collect(module, result.ty, result.binding.as_ref(), &mut iface.outputs)?;
    }

    iface.inputs.sort_by_key(|a| a.slot);
    iface.outputs.sort_by_key(|a| a.slot);
    Ok(iface)
}

fn collect(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<IoAttribute>,
) -> Result<()> {
    let inner = &module.types[ty].inner;

    let Some(binding) = binding else {
        // Unbound arguments/results must be structs whose members carry the bindings.
        let naga::TypeInner::Struct { members, .. } = inner else {
            bail!("unbound entry point value of non-struct type {inner:?}");
        };
        for member in members {
            collect(module, member.ty, member.binding.as_ref(), out)?;
        }
        return Ok(());
    };

    let Some(slot) = binding_slot(binding) else {
        return Ok(());
    };

    let components = match inner {
        naga::TypeInner::Scalar(s) if s.kind == naga::ScalarKind::Float && s.width == 4 => 1,
        naga::TypeInner::Vector { size, scalar }
            if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 =>
        {
            *size as u32
        }
        other => bail!("{slot:?} has unsupported type {other:?}"),
    };

    out.push(IoAttribute { slot, components });
    Ok(())
}

fn binding_slot(binding: &naga::Binding) -> Option<IoSlot> {
    match binding {
        naga::Binding::Location { location, .. } => Some(IoSlot::Location(*location)),
        naga::Binding::BuiltIn(naga::BuiltIn::Position { .. }) => Some(IoSlot::Position),
        // Other builtins (vertex_index, front_facing, ...) are not part of the contract.
        naga::Binding::BuiltIn(_) => None,
    }
}

/// Expression an entry point writes to output `slot`.
///
/// Follows a returned struct either built in place or assembled in a local
/// variable by member stores.
fn output_value(
    module: &naga::Module,
    func: &naga::Function,
    slot: IoSlot,
) -> Result<naga::Handle<naga::Expression>> {
    let result = func.result.as_ref().context("entry point returns nothing")?;
    let value = func
        .body
        .iter()
        .find_map(|stmt| match *stmt {
            naga::Statement::Return { value: Some(v) } => Some(v),
            _ => None,
        })
        .context("entry point has no top-level return value")?;

    if let Some(binding) = &result.binding {
        ensure!(binding_slot(binding) == Some(slot), "entry point does not write {slot:?}");
        return Ok(value);
    }

    let naga::TypeInner::Struct { members, .. } = &module.types[result.ty].inner else {
        bail!("unbound entry point result is not a struct");
    };
    let index = members
        .iter()
        .position(|m| m.binding.as_ref().and_then(binding_slot) == Some(slot))
        .with_context(|| format!("entry point does not write {slot:?}"))?;

    match func.expressions[value] {
        naga::Expression::Compose { ref components, .. } => components
            .get(index)
            .copied()
            .with_context(|| format!("{slot:?} missing from returned struct")),
        naga::Expression::Load { pointer } => {
            let local = local_variable(func, pointer)
                .context("returned struct is not a local variable")?;
            func.body
                .iter()
                .filter_map(|stmt| match *stmt {
                    naga::Statement::Store { pointer, value } => match func.expressions[pointer] {
                        naga::Expression::AccessIndex { base, index: i }
                            if i as usize == index && local_variable(func, base) == Some(local) =>
                        {
                            Some(value)
                        }
                        _ => None,
                    },
                    _ => None,
                })
                .last()
                .with_context(|| format!("{slot:?} is never written"))
        }
        ref other => bail!("unsupported returned expression {other:?}"),
    }
}

fn local_variable(
    func: &naga::Function,
    expr: naga::Handle<naga::Expression>,
) -> Option<naga::Handle<naga::LocalVariable>> {
    match func.expressions[expr] {
        naga::Expression::LocalVariable(lv) => Some(lv),
        _ => None,
    }
}

/// Slot of the entry point input `expr` reads directly, if it is one.
fn input_slot(
    module: &naga::Module,
    func: &naga::Function,
    expr: naga::Handle<naga::Expression>,
) -> Option<IoSlot> {
    match func.expressions[expr] {
        naga::Expression::FunctionArgument(a) => {
            func.arguments.get(a as usize)?.binding.as_ref().and_then(binding_slot)
        }
        naga::Expression::AccessIndex { base, index } => {
            let naga::Expression::FunctionArgument(a) = func.expressions[base] else {
                return None;
            };
            let arg = func.arguments.get(a as usize)?;
            let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner else {
                return None;
            };
            members.get(index as usize)?.binding.as_ref().and_then(binding_slot)
        }
        _ => None,
    }
}

/// `vec4(<input at from>, 1.0)`.
fn is_lift(
    module: &naga::Module,
    func: &naga::Function,
    expr: naga::Handle<naga::Expression>,
    from: IoSlot,
) -> bool {
    let naga::Expression::Compose { ref components, .. } = func.expressions[expr] else {
        return false;
    };
    match components.as_slice() {
        [v, one] => {
            input_slot(module, func, *v) == Some(from)
                && matches!(
                    func.expressions[*one],
                    naga::Expression::Literal(naga::Literal::F32(x)) if x == 1.0
                )
        }
        _ => false,
    }
}

fn float_components(format: wgpu::VertexFormat) -> Option<u32> {
    use wgpu::VertexFormat as F;
    match format {
        F::Float32 => Some(1),
        F::Float32x2 => Some(2),
        F::Float32x3 => Some(3),
        F::Float32x4 => Some(4),
        _ => None,
    }
}
