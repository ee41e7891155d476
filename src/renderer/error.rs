use std::fmt;
use std::path::PathBuf;

/// Failures from the environment: no usable device, or unreadable assets.
#[derive(Debug)]
pub enum RenderError {
    AdapterUnavailable(wgpu::RequestAdapterError),
    DeviceUnavailable(wgpu::RequestDeviceError),
    MissingFeatures(wgpu::Features),
    Image { path: PathBuf, source: image::ImageError },
    TextureTableFull(usize),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::AdapterUnavailable(err) => write!(f, "no graphics adapter: {}", err),
            RenderError::DeviceUnavailable(err) => write!(f, "device request failed: {}", err),
            RenderError::MissingFeatures(features) => {
                write!(f, "adapter lacks required features {:?}", features)
            }
            RenderError::Image { path, source } => {
                write!(f, "failed to load image {:?}: {}", path, source)
            }
            RenderError::TextureTableFull(capacity) => {
                write!(f, "texture table is full ({} slots)", capacity)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::AdapterUnavailable(err) => Some(err),
            RenderError::DeviceUnavailable(err) => Some(err),
            RenderError::Image { source, .. } => Some(source),
            RenderError::MissingFeatures(_) | RenderError::TextureTableFull(_) => None,
        }
    }
}

impl From<wgpu::RequestAdapterError> for RenderError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        RenderError::AdapterUnavailable(err)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        RenderError::DeviceUnavailable(err)
    }
}

