// renderer/renderer.rs
use glam::{Mat4, Quat};

use crate::renderer::bindings::TEXTURE_GROUP;
use crate::renderer::debug_lines::DebugLines;
use crate::renderer::internal::{RenderContext, WgpuBackend, COLOR_FORMAT, DEPTH_FORMAT};
use crate::renderer::program::{stage_paths, ProgramBuilder};
use crate::renderer::texture::TextureTable;
use crate::renderer::uniforms::{DebugPerFrameData, PerFrameData};
use crate::renderer::vertex::{DebugVertex, TileVertex};
use crate::settings::RenderSettings;
use crate::tiles::{RandomSource, TileGeometry, TileRegistry};

/// Draws the tile map and the debug overlay into the context's offscreen
/// targets, one pass per frame.
pub struct TileMapRenderer {
    context: RenderContext,
    textures: TextureTable,
    tiles: TileRegistry<WgpuBackend>,
    debug: DebugLines<WgpuBackend>,
    tile_program: wgpu::RenderPipeline,
    debug_program: wgpu::RenderPipeline,
    settings: RenderSettings,
}

impl TileMapRenderer {
    pub fn new(
        context: RenderContext,
        textures: TextureTable,
        geometry: &TileGeometry,
        settings: RenderSettings,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let backend = &context.backend;
        let tiles = TileRegistry::new(backend, geometry, random);
        let debug = DebugLines::new(backend);

        let (fragment, vertex) = stage_paths(&settings.shader_dir, "tile");
        let tile_program = ProgramBuilder::new(&backend.device, "Tile Program", COLOR_FORMAT)
            .with_bind_group_layout(tiles.frame_layout())
            .with_bind_group_layout(textures.layout())
            .with_vertex_buffer(TileVertex::layout())
            .with_depth(DEPTH_FORMAT)
            .build(&fragment, &vertex);

        let (fragment, vertex) = stage_paths(&settings.shader_dir, "debug");
        let debug_program = ProgramBuilder::new(&backend.device, "Debug Program", COLOR_FORMAT)
            .with_bind_group_layout(debug.layout())
            .with_vertex_buffer(DebugVertex::layout())
            .with_depth(DEPTH_FORMAT)
            .with_topology(wgpu::PrimitiveTopology::LineList)
            .build(&fragment, &vertex);

        Self {
            context,
            textures,
            tiles,
            debug,
            tile_program,
            debug_program,
            settings,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn tiles(&self) -> &TileRegistry<WgpuBackend> {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut TileRegistry<WgpuBackend> {
        &mut self.tiles
    }

    pub fn debug_mut(&mut self) -> &mut DebugLines<WgpuBackend> {
        &mut self.debug
    }

    /// Uploads tiles placed since the last flush.
    pub fn flush(&mut self) {
        self.tiles.flush(&self.context.backend);
    }

    /// Renders one frame. `time` is in seconds; it drives tile animation and
    /// rotates the light about Z.
    pub fn render_frame(&mut self, view: Mat4, projection: Mat4, time: f32) {
        let backend = &self.context.backend;

        let light = Quat::from_rotation_z(time) * self.settings.light();
        let tile_frame = PerFrameData::new(view, projection)
            .with_colors(self.settings.grass(), self.settings.dirt())
            .with_light_direction(light)
            .with_time(time);
        self.tiles.set_per_frame_data(backend, &tile_frame);
        self.debug
            .set_per_frame_data(backend, &DebugPerFrameData::new(view, projection));

        let mut encoder = backend
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("TilePass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.context.targets.color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.settings.clear()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.context.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(TEXTURE_GROUP, self.textures.bind_group(), &[]);
            self.tiles.render(&mut pass, &self.tile_program);
            self.debug.draw(backend, &mut pass, &self.debug_program);
        }

        backend.queue.submit(Some(encoder.finish()));
    }
}
