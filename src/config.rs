use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    log,
    city::Climate,
    utils::{Color, Size, coords::PixelPoint},
};

// ----------------------------------------------
// Configs
// ----------------------------------------------

pub const CONFIGS_DIR_PATH: &str = "assets/configs";

pub trait Configs: Sized + Default + Serialize + DeserializeOwned {
    fn post_load(&mut self) {
    }

    // Saves current configs to `<dir>/<name>.json`.
    fn save_file(&self, configs_dir: &Path, config_file_name: &str) -> bool {
        debug_assert!(!config_file_name.is_empty());

        let config_json_path = configs_dir
            .join(config_file_name)
            .with_extension("json");

        // Ignore errors: fails when any element of the path already exists.
        let _ = std::fs::create_dir_all(configs_dir);

        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to serialize config file {config_json_path:?}: {err}");
                return false;
            }
        };

        if let Err(err) = std::fs::write(&config_json_path, json) {
            log::error!(log::channel!("config"), "Failed to write config file {config_json_path:?}: {err}");
            return false;
        }

        true
    }

    // Either succeeds loading the config file or returns a default config.
    fn load_file(configs_dir: &Path, config_file_name: &str) -> Self {
        debug_assert!(!config_file_name.is_empty());

        let config_json_path = configs_dir
            .join(config_file_name)
            .with_extension("json");

        let mut configs = match Self::read_json(&config_json_path) {
            Ok(configs) => configs,
            Err(err) => {
                log::error!(log::channel!("config"), "{err}");
                Self::default()
            }
        };

        configs.post_load();
        configs
    }

    fn read_json(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config file from path {path:?}: {err}"))?;

        serde_json::from_str::<Self>(&json)
            .map_err(|err| format!("Failed to deserialize config file from path {path:?}: {err}"))
    }
}

// ----------------------------------------------
// MinimapConfigs
// ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // Missing fields in the config file get defaults from MinimapConfigs::default().
pub struct MinimapConfigs {
    // Figure markers:
    pub soldier_color: Color,
    pub enemy_color_central: Color,
    pub enemy_color_northern: Color,
    pub enemy_color_desert: Color,
    pub wild_animal_color: Color,

    // Main viewport outline:
    pub viewport_indicator_color: Color,

    // Extra view tiles visited around the visible window so that
    // diagonal edges don't pop in while scrolling.
    pub tile_padding: i32,
}

impl MinimapConfigs {
    pub fn enemy_color(&self, climate: Climate) -> Color {
        match climate {
            Climate::Central  => self.enemy_color_central,
            Climate::Northern => self.enemy_color_northern,
            Climate::Desert   => self.enemy_color_desert,
        }
    }
}

impl Default for MinimapConfigs {
    fn default() -> Self {
        Self {
            soldier_color: Color::from_rgb(0x000080),
            enemy_color_central: Color::from_rgb(0x7f0000),
            enemy_color_northern: Color::from_rgb(0x1800ff),
            enemy_color_desert: Color::from_rgb(0x004980),
            wild_animal_color: Color::black(),
            viewport_indicator_color: Color::yellow(),
            tile_padding: 4,
        }
    }
}

impl Configs for MinimapConfigs {
    fn post_load(&mut self) {
        if self.tile_padding < 0 {
            log::warn!(log::channel!("config"), "Negative minimap tile padding ({}), using 0.", self.tile_padding);
            self.tile_padding = 0;
        }
    }
}

// ----------------------------------------------
// DemoConfigs
// ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfigs {
    pub log: log::LogConfigs,
    pub seed: u64,
    pub climate: Climate,
    pub map_size: Size,
    pub city_view_extent: Size,
    pub minimap_position: PixelPoint,
    pub minimap_size_in_tiles: Size,
    pub output_image_path: String,
    pub minimap: MinimapConfigs,
}

impl Default for DemoConfigs {
    fn default() -> Self {
        Self {
            log: log::LogConfigs::default(),
            seed: 0x5eed,
            climate: Climate::Central,
            map_size: Size::new(100, 100),
            city_view_extent: Size::new(40, 60),
            minimap_position: PixelPoint::new(8, 8),
            minimap_size_in_tiles: Size::new(73, 111),
            output_image_path: "minimap.png".into(),
            minimap: MinimapConfigs::default(),
        }
    }
}

impl Configs for DemoConfigs {
    fn post_load(&mut self) {
        self.minimap.post_load();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let configs: MinimapConfigs = serde_json::from_str(r#"{ "tile_padding": 2 }"#).unwrap();
        assert_eq!(configs.tile_padding, 2);
        assert_eq!(configs.viewport_indicator_color, Color::yellow());
        assert_eq!(configs.enemy_color(Climate::Northern), Color::from_rgb(0x1800ff));
    }

    #[test]
    fn test_log_configs_from_json() {
        let configs: DemoConfigs = serde_json::from_str(
            r#"{ "log": { "level": "Warn", "tty_colors": false }, "seed": 7 }"#
        ).unwrap();
        assert_eq!(configs.log, log::LogConfigs { level: log::Level::Warn, source_location: false, tty_colors: false });
        assert_eq!(configs.seed, 7);
        assert_eq!(configs.minimap, MinimapConfigs::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("city_minimap_configs_{}", std::process::id()));

        let mut configs = DemoConfigs::default();
        configs.seed = 42;
        configs.minimap.tile_padding = 6;
        assert!(configs.save_file(&dir, "demo"));

        let loaded = DemoConfigs::load_file(&dir, "demo");
        assert_eq!(loaded, configs);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_failure_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("city_minimap_configs_missing");
        let loaded = MinimapConfigs::load_file(&dir, "does_not_exist");
        assert_eq!(loaded, MinimapConfigs::default());
    }

    #[test]
    fn test_negative_padding_is_clamped() {
        let mut configs = MinimapConfigs { tile_padding: -3, ..Default::default() };
        configs.post_load();
        assert_eq!(configs.tile_padding, 0);
    }
}
