/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may use.
    ///
    /// `Default` honors `WGPU_BACKEND` (e.g. `vulkan`, `metal`, `dx12`, `gl`).
    pub backends: wgpu::Backends,

    /// Adapter preference. The pass-through shader is trivial, so low power
    /// is the default.
    pub power_preference: wgpu::PowerPreference,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; replaced by a supported mode if needed.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Backends selected by `WGPU_BACKEND`, or all of them.
    pub fn backends_from_env() -> wgpu::Backends {
        wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all())
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: Self::backends_from_env(),
            power_preference: wgpu::PowerPreference::LowPower,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            desired_maximum_frame_latency: 2,
        }
    }
}
