pub mod asset;
pub mod renderer;
pub mod settings;
pub mod tiles;

pub use renderer::{RenderContext, RenderError, TextureRef, TextureTable, TileMapRenderer};
pub use settings::RenderSettings;
pub use tiles::{TileGeometry, TileRegistry, TileTemplate};

/// Installs the `env_logger` backend at `Info`, overridable through `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
