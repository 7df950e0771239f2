use super::SurfaceErrorAction;

/// Picks the surface format: sRGB 8-bit if preferred and offered, else the
/// surface's first (most preferred) format.
pub fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
        if let Some(f) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(f);
        }
        log::warn!("surface offers no sRGB format; colors may look washed out or too dark");
    }

    Some(first)
}

pub fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Maps a frame acquisition error to the action the caller should take.
///
/// `Reconfigured` means the caller must reconfigure the surface.
pub fn surface_error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as A, TextureFormat as F};

    fn caps(formats: &[F], alpha_modes: &[A]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha_modes.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn no_formats_yields_none() {
        assert_eq!(choose_surface_format(&caps(&[], &[]), true), None);
    }

    #[test]
    fn prefers_srgb_over_first_format() {
        let c = caps(&[F::Bgra8Unorm, F::Rgba8UnormSrgb], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Rgba8UnormSrgb));
    }

    #[test]
    fn bgra_srgb_wins_over_rgba_srgb() {
        let c = caps(&[F::Rgba8UnormSrgb, F::Bgra8UnormSrgb], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_first_format_without_srgb() {
        let c = caps(&[F::Rgba16Float, F::Bgra8Unorm], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Rgba16Float));
    }

    #[test]
    fn srgb_not_preferred_takes_first() {
        let c = caps(&[F::Bgra8Unorm, F::Bgra8UnormSrgb], &[]);
        assert_eq!(choose_surface_format(&c, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn alpha_mode_request_honored_when_supported() {
        let c = caps(&[], &[A::Opaque, A::PreMultiplied]);
        assert_eq!(choose_alpha_mode(&c, Some(A::PreMultiplied)), A::PreMultiplied);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_supported() {
        let c = caps(&[], &[A::Opaque]);
        assert_eq!(choose_alpha_mode(&c, Some(A::PostMultiplied)), A::Opaque);
        assert_eq!(choose_alpha_mode(&c, None), A::Opaque);
    }

    #[test]
    fn alpha_mode_defaults_to_auto() {
        assert_eq!(choose_alpha_mode(&caps(&[], &[]), None), A::Auto);
    }

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError as E;
        assert_eq!(surface_error_action(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&E::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&E::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
