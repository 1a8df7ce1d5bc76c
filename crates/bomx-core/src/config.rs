use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full run configuration. Every section falls back to its defaults, so an
/// empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub items: ItemConfig,
    #[serde(default)]
    pub cycles: CycleConfig,
}

/// Column names of the edge table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_parent_column")]
    pub parent: String,
    #[serde(default = "default_child_column")]
    pub child: String,
    #[serde(default = "default_quantity_column")]
    pub quantity: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            parent: default_parent_column(),
            child: default_child_column(),
            quantity: default_quantity_column(),
        }
    }
}

impl ColumnConfig {
    /// The three required columns, in `(parent, child, quantity)` order.
    #[must_use]
    pub fn required(&self) -> [&str; 3] {
        [&self.parent, &self.child, &self.quantity]
    }
}

/// Item master columns and the marker that flags explosion roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfig {
    #[serde(default = "default_item_id_column")]
    pub id: String,
    #[serde(default = "default_item_flag_column")]
    pub flag: String,
    /// Substring that marks an item as a top-level output.
    #[serde(default = "default_root_marker")]
    pub root_marker: String,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            id: default_item_id_column(),
            flag: default_item_flag_column(),
            root_marker: default_root_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_true")]
    pub tolerate: bool,
    /// Optional cap on detect/sever passes. Unset, the resolver runs until
    /// the graph is acyclic; every pass removes at least one edge.
    #[serde(default)]
    pub max_passes: Option<usize>,
    /// Where removed edges are written. `None` keeps them in memory only.
    #[serde(default)]
    pub audit_path: Option<PathBuf>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tolerate: default_true(),
            max_passes: None,
            audit_path: None,
        }
    }
}

/// Load `.bomx/config.toml` under `project_root`, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<BomConfig>> {
    let path = project_root.join(".bomx/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Load `<config_dir>/bomx/config.toml`, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<BomConfig>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };

    let path = config_dir.join("bomx/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Parse one TOML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`BomConfig`].
pub fn load_config_file(path: &Path) -> Result<BomConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<BomConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the effective configuration.
///
/// Precedence: explicit path, then the project file, then the user file,
/// then built-in defaults. Files are not merged; the first one found wins.
///
/// # Errors
///
/// Returns an error if the selected file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>, project_root: &Path) -> Result<BomConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    if let Some(config) = load_project_config(project_root)? {
        tracing::debug!("using project config under {}", project_root.display());
        return Ok(config);
    }

    Ok(load_user_config()?.unwrap_or_default())
}

const fn default_true() -> bool {
    true
}

fn default_parent_column() -> String {
    "production_bom_no".to_string()
}

fn default_child_column() -> String {
    "component_no".to_string()
}

fn default_quantity_column() -> String {
    "total".to_string()
}

fn default_item_id_column() -> String {
    "item_no".to_string()
}

fn default_item_flag_column() -> String {
    "purchase_output".to_string()
}

fn default_root_marker() -> String {
    "Output".to_string()
}
