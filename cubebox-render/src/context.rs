//! Device, queue and render target format handed to [`WgpuBackend`].
//!
//! Windows and devices belong to the host. It either wraps a device it
//! already created ([`GpuContext::from_device`]) or asks for an off-screen
//! one whose texture limit covers the largest texture it plans to create,
//! usually the glyph atlas page ([`GpuContext::new_headless`]). A surface
//! the host made for its window is attached with [`GpuContext::with_surface`]
//! before the backend is built, since the pipeline is compiled for the
//! target format.
//!
//! [`WgpuBackend`]: crate::WgpuBackend

use thiserror::Error;
use wgpu::{
    Device, DeviceDescriptor, Instance, InstanceDescriptor, Limits, Queue, RequestAdapterOptions,
    Surface, SurfaceConfiguration, TextureFormat,
};

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("adapter supports {supported}px textures, {requested}px requested")]
    TextureLimit { requested: u32, supported: u32 },
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Target format when no surface is attached.
pub const OFFSCREEN_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

struct Presentation {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    /// Format of every color target the quad pipeline draws into.
    pub target_format: TextureFormat,
    presentation: Option<Presentation>,
}

impl GpuContext {
    /// Wrap a device the host already owns.
    pub fn from_device(device: Device, queue: Queue, target_format: TextureFormat) -> Self {
        Self {
            device,
            queue,
            target_format,
            presentation: None,
        }
    }

    /// Request an off-screen device able to hold `min_texture_size`² textures.
    ///
    /// Limits start from the downlevel defaults so the device runs on the
    /// widest range of adapters; only the 2D texture dimension is raised.
    pub async fn new_headless(min_texture_size: u32) -> Result<Self, GpuError> {
        let instance = Instance::new(&InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&RequestAdapterOptions::default())
            .await
            .ok_or(GpuError::NoAdapter)?;

        let supported = adapter.limits().max_texture_dimension_2d;
        if min_texture_size > supported {
            return Err(GpuError::TextureLimit {
                requested: min_texture_size,
                supported,
            });
        }

        let defaults = Limits::downlevel_defaults();
        let texture_size = min_texture_size
            .max(defaults.max_texture_dimension_2d)
            .min(supported);
        let required_limits = Limits {
            max_texture_dimension_2d: texture_size,
            ..defaults
        };

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("cubebox"),
                    required_limits,
                    ..Default::default()
                },
                None,
            )
            .await?;

        log::info!(
            "off-screen device on {} ({}px textures)",
            adapter.get_info().name,
            texture_size
        );
        Ok(Self::from_device(device, queue, OFFSCREEN_FORMAT))
    }

    /// Configure a host-created surface and render into it from now on.
    pub fn with_surface(mut self, surface: Surface<'static>, config: SurfaceConfiguration) -> Self {
        surface.configure(&self.device, &config);
        self.target_format = config.format;
        self.presentation = Some(Presentation { surface, config });
        self
    }

    pub fn has_surface(&self) -> bool {
        self.presentation.is_some()
    }

    pub fn surface(&self) -> Option<&Surface<'static>> {
        self.presentation.as_ref().map(|p| &p.surface)
    }

    /// Reconfigure the surface for a new window size. Ignored when
    /// headless or when either side is zero (minimized window).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(p) = &mut self.presentation {
            p.config.width = width;
            p.config.height = height;
            p.surface.configure(&self.device, &p.config);
        }
    }

    /// Current surface dimensions, or `(0, 0)` if headless.
    pub fn surface_size(&self) -> (u32, u32) {
        self.presentation
            .as_ref()
            .map_or((0, 0), |p| (p.config.width, p.config.height))
    }

    /// Largest width/height the device accepts for a 2D texture.
    pub fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
