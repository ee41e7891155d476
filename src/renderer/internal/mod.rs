pub(crate) mod context;
pub(crate) mod targets;
pub(crate) mod wgpu_backend;

pub use context::{RenderContext, REQUIRED_FEATURES};
pub use targets::{OffscreenTargets, COLOR_FORMAT, DEPTH_FORMAT};
pub use wgpu_backend::WgpuBackend;
