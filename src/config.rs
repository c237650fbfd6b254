use std::{fs, path::Path};

use blockworld_world::WorldConfig;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/world.toml";

/// Load world configuration from an explicit path, falling back to defaults on errors.
pub fn load_world_config(path: &Path) -> WorldConfig {
    match fs::read_to_string(path) {
        Ok(contents) => parse_world_config(&contents).unwrap_or_else(|err| {
            warn!("Failed to parse {}: {err}. Using defaults", path.display());
            WorldConfig::default()
        }),
        Err(err) => {
            if path != Path::new(DEFAULT_CONFIG_PATH) || err.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
            } else {
                warn!("World config not found at {}. Using defaults", path.display());
            }
            WorldConfig::default()
        }
    }
}

pub fn parse_world_config(contents: &str) -> Result<WorldConfig, toml::de::Error> {
    toml::from_str(contents)
}
