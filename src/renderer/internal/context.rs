use glam::UVec2;

use crate::renderer::error::RenderError;
use crate::renderer::internal::targets::OffscreenTargets;
use crate::renderer::internal::wgpu_backend::WgpuBackend;
use crate::renderer::texture::MAX_TEXTURES;

/// Features the tile renderer cannot run without.
pub const REQUIRED_FEATURES: [wgpu::Features; 3] = [
    wgpu::Features::INDIRECT_FIRST_INSTANCE,
    wgpu::Features::TEXTURE_BINDING_ARRAY,
    wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING,
];

/// Device, queue and offscreen targets for headless rendering.
pub struct RenderContext {
    pub backend: WgpuBackend,
    pub targets: OffscreenTargets,
    pub size: UVec2,
}

impl RenderContext {
    pub async fn new_headless(size: UVec2) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info());
        log::info!("Using backend: {:?}", adapter.get_info().backend);
        let adapter_features = adapter.features();
        log::debug!("Adapter features: {:?}", adapter_features);

        let mut required_features = wgpu::Features::empty();
        let mut missing = wgpu::Features::empty();
        for feature in REQUIRED_FEATURES {
            if adapter_features.contains(feature) {
                required_features |= feature;
            } else {
                missing |= feature;
            }
        }
        if !missing.is_empty() {
            log::warn!("Adapter lacks {:?}", missing);
            return Err(RenderError::MissingFeatures(missing));
        }

        if adapter_features.contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES) {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let adapter_limits = adapter.limits();
        let limits = wgpu::Limits {
            max_binding_array_elements_per_shader_stage: MAX_TEXTURES as u32,
            max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
            max_buffer_size: adapter_limits.max_buffer_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features,
                required_limits: limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = size.max(UVec2::ONE);
        let targets = OffscreenTargets::new(&device, size);

        Ok(Self {
            backend: WgpuBackend::new(device, queue),
            targets,
            size,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.backend.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.backend.queue
    }
}
