// src/renderer/program.rs
use std::fs;
use std::path::{Path, PathBuf};

/// Reads one shader stage's WGSL source. A missing or unreadable file is
/// logged and replaced by empty source; pipeline validation reports it later.
pub fn read_shader_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            log::warn!("Unable to open shader file {:?} ({})", path, err);
            String::new()
        }
    }
}

/// Paths of a program's two stages: `<dir>/<name>.vert.wgsl` and
/// `<dir>/<name>.frag.wgsl`.
pub fn stage_paths(shader_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        shader_dir.join(format!("{name}.frag.wgsl")),
        shader_dir.join(format!("{name}.vert.wgsl")),
    )
}

/// Builder for render programs whose stages live in separate source files.
///
/// Defaults: `vs_main`/`fs_main` entry points, triangle lists, no culling,
/// one color target without blending.
pub struct ProgramBuilder<'a> {
    device: &'a wgpu::Device,
    label: &'a str,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    color_format: wgpu::TextureFormat,
    depth_stencil: Option<wgpu::DepthStencilState>,
    primitive: wgpu::PrimitiveState,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(device: &'a wgpu::Device, label: &'a str, color_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            label,
            bind_group_layouts: Vec::new(),
            vertex_buffers: Vec::new(),
            color_format,
            depth_stencil: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
        }
    }

    /// Appends the layout for the next bind group index.
    pub fn with_bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    pub fn with_depth(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_stencil = Some(wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.primitive.topology = topology;
        self
    }

    /// Loads both stages from disk and builds the pipeline.
    pub fn build(self, fragment_path: &Path, vertex_path: &Path) -> wgpu::RenderPipeline {
        log::info!(
            "Building program '{}' from {:?} and {:?}",
            self.label,
            vertex_path,
            fragment_path
        );
        let vertex_source = read_shader_source(vertex_path);
        let fragment_source = read_shader_source(fragment_path);
        self.build_from_source(&fragment_source, &vertex_source)
    }

    pub fn build_from_source(self, fragment_source: &str, vertex_source: &str) -> wgpu::RenderPipeline {
        let vertex_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(self.label),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        let color_targets = [Some(wgpu::ColorTargetState {
            format: self.color_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &self.vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: Default::default(),
            }),
            primitive: self.primitive,
            depth_stencil: self.depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_shader_reads_as_empty_source() {
        let source = read_shader_source(Path::new("shaders/does_not_exist.vert.wgsl"));
        assert!(source.is_empty());
    }

    #[test]
    fn stage_paths_follow_the_naming_scheme() {
        let (fragment, vertex) = stage_paths(Path::new("shaders"), "tile");
        assert_eq!(fragment, Path::new("shaders/tile.frag.wgsl"));
        assert_eq!(vertex, Path::new("shaders/tile.vert.wgsl"));
    }

    #[test]
    fn tile_shaders_ship_with_the_crate() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        for name in ["tile", "debug"] {
            let (fragment, vertex) = stage_paths(&dir, name);
            assert!(read_shader_source(&fragment).contains("fs_main"));
            assert!(read_shader_source(&vertex).contains("vs_main"));
        }
    }
}
