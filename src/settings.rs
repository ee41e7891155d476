use std::path::PathBuf;

use glam::{Vec3, Vec4};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::uniforms::{DEFAULT_DIRT_COLOR, DEFAULT_GRASS_COLOR};
use crate::tiles::MAX_TILES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "RenderSettings::default_shader_dir")]
    pub shader_dir: PathBuf,
    #[serde(default = "RenderSettings::default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default = "RenderSettings::default_grass_color")]
    pub grass_color: [f32; 4],
    #[serde(default = "RenderSettings::default_dirt_color")]
    pub dirt_color: [f32; 4],
    #[serde(default = "RenderSettings::default_light_direction")]
    pub light_direction: [f32; 3],
    #[serde(default = "RenderSettings::default_map_half_size")]
    pub map_half_size: i32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            shader_dir: Self::default_shader_dir(),
            clear_color: Self::default_clear_color(),
            grass_color: Self::default_grass_color(),
            dirt_color: Self::default_dirt_color(),
            light_direction: Self::default_light_direction(),
            map_half_size: Self::default_map_half_size(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if self.shader_dir.as_os_str().is_empty() {
            warn!("Shader directory is empty. Using default directory.");
            self.shader_dir = Self::default_shader_dir();
        }

        let light = Vec3::from_array(self.light_direction);
        if !light.is_finite() || light.length_squared() == 0.0 {
            warn!("Light direction must be a non-zero vector. Using default direction.");
            self.light_direction = Self::default_light_direction();
        }

        if self.map_half_size < 0 {
            warn!("Map half size must not be negative. Using default value.");
            self.map_half_size = Self::default_map_half_size();
        } else if self.map_tile_count() > MAX_TILES as u64 {
            warn!(
                "Map half size {} needs {} tiles, more than the {} the tile table holds. Using default value.",
                self.map_half_size,
                self.map_tile_count(),
                MAX_TILES
            );
            self.map_half_size = Self::default_map_half_size();
        }

        self
    }

    /// Tiles in the demo map: a square of side `2 * map_half_size + 1`.
    pub fn map_tile_count(&self) -> u64 {
        let side = 2 * u64::from(self.map_half_size.unsigned_abs()) + 1;
        side * side
    }

    pub fn grass(&self) -> Vec4 {
        Vec4::from_array(self.grass_color)
    }

    pub fn dirt(&self) -> Vec4 {
        Vec4::from_array(self.dirt_color)
    }

    pub fn light(&self) -> Vec3 {
        Vec3::from_array(self.light_direction).normalize()
    }

    pub fn clear(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    fn default_shader_dir() -> PathBuf {
        PathBuf::from("shaders")
    }

    const fn default_clear_color() -> [f32; 4] {
        [0.5, 0.3, 0.2, 1.0]
    }

    const fn default_grass_color() -> [f32; 4] {
        DEFAULT_GRASS_COLOR
    }

    const fn default_dirt_color() -> [f32; 4] {
        DEFAULT_DIRT_COLOR
    }

    const fn default_light_direction() -> [f32; 3] {
        [-1.0, -1.0, -1.0]
    }

    const fn default_map_half_size() -> i32 {
        200
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            shader_dir: PathBuf::new(),
            light_direction: [0.0, 0.0, 0.0],
            map_half_size: -3,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();
        let defaults = RenderSettings::default();

        assert_eq!(validated.resolution.width, defaults.resolution.width);
        assert_eq!(validated.resolution.height, defaults.resolution.height);
        assert_eq!(validated.shader_dir, defaults.shader_dir);
        assert_eq!(validated.light_direction, defaults.light_direction);
        assert_eq!(validated.map_half_size, defaults.map_half_size);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            map_half_size: 16,
            light_direction: [0.0, 1.0, -1.0],
            ..RenderSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.resolution.width, 1920);
        assert_eq!(validated.map_half_size, 16);
        assert_eq!(validated.light_direction, valid.light_direction);
    }

    #[test]
    fn missing_fields_take_their_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{ "map_half_size": 8 }"#).expect("valid json");
        assert_eq!(settings.map_half_size, 8);
        assert_eq!(settings.shader_dir, PathBuf::from("shaders"));
        assert_eq!(settings.grass_color, [0.53, 0.8, 0.31, 1.0]);
    }

    #[test]
    fn map_larger_than_the_tile_table_is_replaced() {
        let oversized = RenderSettings {
            map_half_size: 600,
            ..RenderSettings::default()
        };
        assert!(oversized.map_tile_count() > MAX_TILES as u64);

        let validated = oversized.validate();
        assert_eq!(validated.map_half_size, 200);
        assert!(validated.map_tile_count() <= MAX_TILES as u64);
    }

    #[test]
    fn largest_map_that_fits_is_kept() {
        // 1023 * 1023 <= 1024 * 1024 < 1025 * 1025
        let largest = RenderSettings {
            map_half_size: 511,
            ..RenderSettings::default()
        };
        assert_eq!(largest.validate().map_half_size, 511);

        let one_more = RenderSettings {
            map_half_size: 512,
            ..RenderSettings::default()
        };
        assert_eq!(one_more.validate().map_half_size, 200);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "isotile-malformed-settings-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "map_half_size": "#).expect("write temp settings");

        let settings = RenderSettings::load_from_path(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(settings.map_half_size, 200);
        assert_eq!(settings.shader_dir, PathBuf::from("shaders"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = RenderSettings::load_from_path("does/not/exist/settings.json");
        assert_eq!(settings.map_half_size, 200);
    }

    #[test]
    fn clear_color_widens_to_wgpu() {
        let color = RenderSettings::default().clear();
        assert_eq!(color.r, 0.5f32 as f64);
        assert_eq!(color.a, 1.0);
    }
}
