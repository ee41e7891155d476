pub mod array_buffer;
pub mod backend;
pub mod bindings;
pub mod buffer;
pub mod debug_lines;
pub mod error;
pub mod indirect;
pub mod internal;
pub mod program;
pub mod recording;
pub mod renderer;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use array_buffer::ObjectArrayBuffer;
pub use backend::{BackendBuffer, BufferBinding, BufferTarget, GpuBackend, RenderRecorder};
pub use bindings::{BindingClass, BindingSlot};
pub use buffer::{GpuBuffer, ImmutableBuffer, MutableBuffer};
pub use debug_lines::DebugLines;
pub use error::RenderError;
pub use indirect::{DrawIndexedIndirectCommand, IndirectCommandBuffer};
pub use internal::{RenderContext, WgpuBackend};
pub use program::ProgramBuilder;
pub use recording::{RecordingBackend, RecordingPass, RecordingProgram};
pub use renderer::TileMapRenderer;
pub use texture::{TextureRef, TextureTable};
pub use uniforms::{DebugPerFrameData, PerFrameData};
pub use vertex::{DebugVertex, TileVertex};
