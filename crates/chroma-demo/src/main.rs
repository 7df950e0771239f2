use std::fmt::Write;

use anyhow::Result;
use chroma_engine::core::{App, AppControl, FrameCtx};
use chroma_engine::device::GpuInit;
use chroma_engine::logging::{init_logging, LoggingConfig};
use chroma_engine::paint::Color;
use chroma_engine::render::{ColorRenderer, Mesh};
use chroma_engine::time::FpsCounter;
use chroma_engine::window::{Runtime, RuntimeConfig};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

const CLEAR: Color = Color::opaque(0.1, 0.2, 0.3);

/// Draws one mesh per frame and keeps the window title on a smoothed FPS.
struct Demo {
    renderer: ColorRenderer,
    mesh: Mesh,
    fps: FpsCounter,
    title: String,
}

impl Demo {
    fn new(mesh: Mesh) -> Result<Self> {
        Ok(Self {
            renderer: ColorRenderer::new()?,
            mesh,
            fps: FpsCounter::new(),
            title: String::new(),
        })
    }
}

impl App for Demo {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("escape pressed; closing");
                AppControl::Exit
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(mesh) = mesh_for_key(code) {
                        self.mesh = mesh;
                    }
                }
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.fps.record(ctx.time.dt);
        if let Some(fps) = self.fps.report(ctx.time.now) {
            self.title.clear();
            write!(&mut self.title, "FPS: {fps:.1}").ok();
            ctx.window.set_title(&self.title);
        }

        let (renderer, mesh) = (&mut self.renderer, &self.mesh);
        ctx.render(CLEAR, |rctx, target| renderer.render(rctx, target, mesh))
    }
}

/// `1` shows the triangle, `2` the square.
fn mesh_for_key(code: KeyCode) -> Option<Mesh> {
    match code {
        KeyCode::Digit1 => Some(Mesh::triangle()),
        KeyCode::Digit2 => Some(Mesh::square()),
        _ => None,
    }
}

fn run() -> Result<()> {
    let demo = Demo::new(Mesh::square())?;
    Runtime::run(
        RuntimeConfig {
            title: "chroma".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        demo,
    )
}

fn main() {
    init_logging(
        LoggingConfig::default().with_default_filter("chroma_demo=info,chroma_engine=info,wgpu_core=warn"),
    );

    if let Err(err) = run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
