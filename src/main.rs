use glam::{Mat4, UVec2, Vec3, Vec4};
use instant::Instant;

use isotile::tiles::{RngSource, AXES};
use isotile::{
    RenderContext, RenderError, RenderSettings, TextureTable, TileGeometry, TileMapRenderer,
    TileTemplate,
};

const FRAMES: u32 = 3;
const SPRITE_WIDTH: u32 = 40;
const SPRITE_CELL_HEIGHT: u32 = 40;
const GRASS_VARIANT_WEIGHTS: [f32; 3] = [6.0, 3.0, 1.0];

/// A grass sprite sheet with one row per variant: green top, brown sides.
fn grass_sprite(variants: u32) -> (UVec2, Vec<u8>) {
    let size = UVec2::new(SPRITE_WIDTH, SPRITE_CELL_HEIGHT * variants);
    let mut pixels = Vec::with_capacity((size.x * size.y * 4) as usize);
    for y in 0..size.y {
        let variant = y / SPRITE_CELL_HEIGHT;
        let row = y % SPRITE_CELL_HEIGHT;
        for x in 0..size.x {
            let speckle = ((x * 7 + y * 13 + variant * 5) % 11 == 0) as u8 * 24;
            let texel = if row < SPRITE_CELL_HEIGHT / 2 {
                [96 + speckle, 168 - variant as u8 * 20, 72, 255]
            } else {
                [130 + speckle, 100, 70, 255]
            };
            pixels.extend_from_slice(&texel);
        }
    }
    (size, pixels)
}

fn wavy_height(x: f32, y: f32) -> f32 {
    ((x * x + y * y).sqrt() * 0.5).cos() * 0.3 - x.abs().max(y.abs()).min(10.0) * 0.8
}

fn isometric_view() -> Mat4 {
    Mat4::from_cols(
        AXES[0].extend(0.0),
        AXES[1].extend(0.0),
        AXES[2].extend(0.0),
        Vec4::W,
    )
}

async fn run() -> Result<(), RenderError> {
    let settings = RenderSettings::load();
    let size = UVec2::new(settings.resolution.width, settings.resolution.height);

    let context = RenderContext::new_headless(size).await?;
    let mut textures = TextureTable::new(context.device());
    let (sprite_size, pixels) = grass_sprite(GRASS_VARIANT_WEIGHTS.len() as u32);
    let grass_texture = textures.register_rgba8(
        context.device(),
        context.queue(),
        "Grass",
        sprite_size,
        &pixels,
    )?;

    let grass = TileTemplate::new(grass_texture, &GRASS_VARIANT_WEIGHTS, 0.0, 1);
    let geometry = TileGeometry::for_template(&grass);
    let mut renderer = TileMapRenderer::new(
        context,
        textures,
        &geometry,
        settings.clone(),
        Box::new(RngSource::from_entropy()),
    );

    let start = Instant::now();
    let tiles = renderer.tiles_mut();
    let grass = tiles.register_template(grass);
    let half = settings.map_half_size;
    for x in -half..=half {
        for y in -half..=half {
            let (fx, fy) = (x as f32, y as f32);
            tiles.place_tile(Vec3::new(fx, fy, wavy_height(fx, fy)), grass);
        }
    }
    renderer.flush();
    log::info!(
        "Built {} tiles in {:.2?}",
        renderer.tiles().tile_count(),
        start.elapsed()
    );

    let view = isometric_view();
    let projection = Mat4::orthographic_rh(
        size.x as f32 * -0.5,
        size.x as f32 * 0.5,
        size.y as f32 * -0.5,
        size.y as f32 * 0.5,
        -1.0,
        1.0,
    );

    let clock = Instant::now();
    for frame in 0..FRAMES {
        let frame_start = Instant::now();
        renderer.debug_mut().add_axes(Vec3::ZERO);
        renderer.render_frame(view, projection, clock.elapsed().as_secs_f32());
        log::info!("Frame {} submitted in {:.2?}", frame, frame_start.elapsed());
    }

    Ok(())
}

fn main() {
    isotile::init_logging();
    log::info!("Starting isometric tile demo (headless)");

    if let Err(err) = pollster::block_on(run()) {
        log::error!("Application error: {}", err);
        std::process::exit(1);
    }

    log::info!("Application shutdown complete");
}
