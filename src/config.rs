//! Viewer configuration
//!
//! Loaded from an optional RON file, with built-in defaults for anything
//! missing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::{IconPaths, RenderMode};

/// Config file name looked up in the working directory, then the platform
/// config directory
pub const CONFIG_FILE: &str = "itemdex.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Item dataset (JSON array)
    pub dataset_path: PathBuf,
    /// Directory holding `{itemID}.{icon_extension}` images
    pub icons_dir: PathBuf,
    pub icon_extension: String,
    /// Shared fallback for any icon that fails to load
    pub placeholder_path: PathBuf,
    /// Force a render mode instead of detecting one
    pub render_mode: Option<RenderMode>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let icons = IconPaths::default();
        Self {
            dataset_path: PathBuf::from("itemData.json"),
            icons_dir: icons.dir,
            icon_extension: icons.extension,
            placeholder_path: icons.placeholder,
            render_mode: None,
        }
    }
}

impl CatalogConfig {
    /// Load from the first config file found, falling back to defaults
    pub fn load() -> Self {
        for path in candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring config {}: {}. Using defaults.", path.display(), e);
                    return Self::default();
                }
            }
        }
        log::info!("No config file found, using defaults");
        Self::default()
    }

    /// Parse a RON config file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|e| format!("Failed to parse: {}", e))
    }

    /// Icon locations derived from this config
    pub fn icon_paths(&self) -> IconPaths {
        IconPaths {
            dir: self.icons_dir.clone(),
            extension: self.icon_extension.clone(),
            placeholder: self.placeholder_path.clone(),
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    use directories::ProjectDirs;

    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(proj_dirs) = ProjectDirs::from("com", "itemdex", "Itemdex") {
        paths.push(proj_dirs.config_dir().join(CONFIG_FILE));
    }
    paths
}
