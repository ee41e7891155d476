// tiles/registry.rs
use glam::Vec3;

use crate::asset::{Handle, SlotTable};
use crate::renderer::array_buffer::ObjectArrayBuffer;
use crate::renderer::backend::{BufferTarget, GpuBackend, RenderRecorder};
use crate::renderer::bindings::{FRAME_GROUP, PER_FRAME, TILES, TILE_FRAME_SLOTS, TILE_TEMPLATES};
use crate::renderer::buffer::{GpuBuffer, MutableBuffer};
use crate::renderer::indirect::IndirectCommandBuffer;
use crate::renderer::uniforms::PerFrameData;
use crate::tiles::geometry::{TileGeometry, TileMesh, TILE_INDEX_COUNT};
use crate::tiles::random::RandomSource;
use crate::tiles::records::{TileData, TileTemplateData};
use crate::tiles::template::TileTemplate;

pub const MAX_TILES: usize = 1024 * 1024;
pub const MAX_TILE_TEMPLATES: usize = 256;

/// Tile and template tables plus the indirect batch that draws them.
///
/// Every placed tile gets one entry in the tile table and one indirect
/// command whose `first_instance` is that entry's index, so the two lists
/// always have the same length and order. Templates are registered before
/// the tiles that use them; [`TileRegistry::flush`] uploads all three lists
/// and [`TileRegistry::render`] issues the whole map as one multi-draw.
pub struct TileRegistry<B: GpuBackend> {
    templates: SlotTable<TileTemplate>,
    template_table: ObjectArrayBuffer<B, TileTemplateData, MAX_TILE_TEMPLATES>,
    tiles: ObjectArrayBuffer<B, TileData, MAX_TILES>,
    commands: IndirectCommandBuffer<B, MAX_TILES>,
    per_frame: MutableBuffer<B, PerFrameData>,
    mesh: TileMesh<B>,
    layout: B::BindGroupLayout,
    bind_group: B::BindGroup,
    random: Box<dyn RandomSource>,
}

impl<B: GpuBackend> TileRegistry<B> {
    pub fn new(backend: &B, geometry: &TileGeometry, random: Box<dyn RandomSource>) -> Self {
        let template_table =
            ObjectArrayBuffer::new(backend, "Tile Templates", BufferTarget::Storage);
        let tiles = ObjectArrayBuffer::new(backend, "Tiles", BufferTarget::Storage);
        let commands = IndirectCommandBuffer::new(backend, "Tile Draw Commands");
        let per_frame = MutableBuffer::with_record(
            backend,
            "Tile Per-Frame Data",
            BufferTarget::Uniform,
            &PerFrameData::default(),
        );
        let mesh = TileMesh::new(backend, geometry);

        let layout = backend.create_bind_group_layout("Tile Frame Layout", &TILE_FRAME_SLOTS);
        let bind_group = backend.create_bind_group(
            "Tile Frame Bind Group",
            &layout,
            &[
                per_frame.bind(PER_FRAME),
                tiles.buffer().bind(TILES),
                template_table.buffer().bind(TILE_TEMPLATES),
            ],
        );

        Self {
            templates: SlotTable::new("Tile Template Entries", MAX_TILE_TEMPLATES),
            template_table,
            tiles,
            commands,
            per_frame,
            mesh,
            layout,
            bind_group,
            random,
        }
    }

    /// Registers a template and returns the dense index tiles refer to it by.
    pub fn register_template(&mut self, template: TileTemplate) -> Handle<TileTemplate> {
        self.template_table.add(template.gpu_record());
        let handle = self.templates.insert(template);
        log::debug!("Registered tile template {}", handle.index());
        handle
    }

    /// Places one tile and returns its index in the tile table.
    pub fn place_tile(&mut self, position: Vec3, template: Handle<TileTemplate>) -> u32 {
        let registered = self.templates.len();
        let Some(entry) = self.templates.get(template) else {
            panic!(
                "tile template {} is not registered ({} registered)",
                template.index(),
                registered
            );
        };
        let variant = entry.random_variant(self.random.as_mut());
        let base_instance = self.tiles.len() as u32;

        self.tiles
            .add(TileData::new(position, template.index() as u32, variant));
        self.commands
            .add_command(TILE_INDEX_COUNT, 1, 0, 0, base_instance);
        base_instance
    }

    /// Uploads the tile, template and command lists.
    pub fn flush(&mut self, backend: &B) {
        log::info!(
            "Uploading {} tiles, {} templates",
            self.tiles.len(),
            self.template_table.len()
        );
        self.tiles.upload(backend);
        self.template_table.upload(backend);
        self.commands.upload(backend);
    }

    pub fn set_per_frame_data(&self, backend: &B, data: &PerFrameData) {
        self.per_frame.update(backend, data);
    }

    /// Binds the frame group and mesh, then draws every tile in one call.
    pub fn render<R: RenderRecorder<B>>(&self, pass: &mut R, program: &B::Program) {
        assert!(
            self.tiles.is_synced() && self.template_table.is_synced(),
            "tile registry rendered with {} tiles and {} templates pending upload",
            self.tiles.len(),
            self.template_table.len()
        );
        pass.set_program(program);
        pass.set_bind_group(FRAME_GROUP, &self.bind_group);
        self.mesh.bind(pass);
        self.commands.draw(pass);
    }

    /// Drops every placed tile. Templates stay registered.
    pub fn clear_tiles(&mut self) {
        self.tiles.clear();
        self.commands.clear();
    }

    /// Drops every tile and template.
    pub fn clear(&mut self) {
        self.clear_tiles();
        self.templates.clear();
        self.template_table.clear();
    }

    /// Layout of the frame group; tile programs are built against it.
    pub fn frame_layout(&self) -> &B::BindGroupLayout {
        &self.layout
    }

    pub fn template(&self, handle: Handle<TileTemplate>) -> Option<&TileTemplate> {
        self.templates.get(handle)
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[TileData] {
        self.tiles.as_slice()
    }

    pub fn tile_buffer(&self) -> &GpuBuffer<B> {
        self.tiles.buffer()
    }

    pub fn template_buffer(&self) -> &GpuBuffer<B> {
        self.template_table.buffer()
    }

    pub fn per_frame_buffer(&self) -> &GpuBuffer<B> {
        self.per_frame.buffer()
    }

    pub fn commands(&self) -> &IndirectCommandBuffer<B, MAX_TILES> {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{RecordingBackend, RecordingPass, RecordingProgram};
    use crate::renderer::TextureRef;
    use crate::tiles::random::SequenceRandom;
    use glam::UVec2;

    fn texture() -> TextureRef {
        TextureRef {
            slot: 0,
            size: UVec2::new(40, 160),
        }
    }

    fn registry(backend: &RecordingBackend, draws: &[f32]) -> TileRegistry<RecordingBackend> {
        let geometry = TileGeometry::from_sprite(UVec2::new(40, 40), 1, 1);
        TileRegistry::new(backend, &geometry, Box::new(SequenceRandom::new(draws)))
    }

    #[test]
    fn variants_follow_the_weighted_draws() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0, 0.25, 0.5, 0.75]);
        let grass = registry.register_template(TileTemplate::new(texture(), &[2.0, 1.0, 1.0], 0.0, 1));
        for x in 0..4 {
            registry.place_tile(Vec3::new(x as f32, 0.0, 0.0), grass);
        }
        let variants: Vec<u32> = registry.tiles().iter().map(|tile| tile.variant_index).collect();
        assert_eq!(variants, vec![0, 0, 1, 2]);
    }

    #[test]
    fn place_tile_returns_consecutive_instances() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        let grass = registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        let dirt = registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        assert_eq!(registry.place_tile(Vec3::ZERO, dirt), 0);
        assert_eq!(registry.place_tile(Vec3::X, grass), 1);
        assert_eq!(registry.tiles()[0].template_index, 1);
        assert_eq!(registry.tiles()[1].template_index, 0);
        assert_eq!(registry.commands().as_slice()[1].first_instance, 1);
    }

    #[test]
    fn template_table_accepts_exactly_its_capacity() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        for _ in 0..MAX_TILE_TEMPLATES {
            registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        }
        assert_eq!(registry.template_count(), MAX_TILE_TEMPLATES);
    }

    #[test]
    #[should_panic(expected = "'Tile Templates' is full: 256 of 256 records")]
    fn template_past_capacity_fails() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        for _ in 0..=MAX_TILE_TEMPLATES {
            registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        }
    }

    #[test]
    #[should_panic(expected = "tile template 2 is not registered (2 registered)")]
    fn unregistered_template_is_rejected() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        registry.place_tile(Vec3::ZERO, Handle::new(2));
    }

    #[test]
    #[should_panic(expected = "pending upload")]
    fn rendering_before_flush_fails() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        let grass = registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        registry.place_tile(Vec3::ZERO, grass);

        let mut pass = RecordingPass::new();
        registry.render(&mut pass, &RecordingProgram::new("Tiles"));
    }

    #[test]
    fn flush_with_nothing_placed_is_a_no_op() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        registry.flush(&backend);
        registry.flush(&backend);
        assert!(backend.writes().is_empty());

        let mut pass = RecordingPass::new();
        registry.render(&mut pass, &RecordingProgram::new("Tiles"));
        assert_eq!(pass.multi_draw_calls(), 0);
    }

    #[test]
    fn per_frame_data_lands_in_the_uniform_buffer() {
        let backend = RecordingBackend::new();
        let registry = registry(&backend, &[0.0]);
        let data = PerFrameData::default().with_time(2.5);
        registry.set_per_frame_data(&backend, &data);
        assert_eq!(registry.per_frame_buffer().raw().read::<PerFrameData>(1), vec![data]);
    }

    #[test]
    fn clear_tiles_keeps_templates() {
        let backend = RecordingBackend::new();
        let mut registry = registry(&backend, &[0.0]);
        let grass = registry.register_template(TileTemplate::new(texture(), &[1.0], 0.0, 1));
        registry.place_tile(Vec3::ZERO, grass);
        registry.clear_tiles();
        assert_eq!(registry.tile_count(), 0);
        assert!(registry.commands().is_empty());
        assert_eq!(registry.template_count(), 1);
        assert_eq!(registry.place_tile(Vec3::ONE, grass), 0);
    }
}
