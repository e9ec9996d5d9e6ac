use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf}
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Settings the engine applies to a flow before running it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Turns on the `debug` option of the root actor
    pub debug:     bool,
    /// Number of times the root is executed per run, 0 only sets the flow up and tears it down
    pub cycles:    u32,
    /// Variables seeded into the root variable store
    pub variables: BTreeMap<String, String>,
    /// Source the flow was loaded from, injected as `flow_path`/`flow_dir`
    pub flow_path: Option<PathBuf>
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { debug: false, cycles: 1, variables: BTreeMap::new(), flow_path: None }
    }
}

/// Get the project directories for cross-platform config path resolution
pub fn get_project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "actorflow").context("Failed to determine project directories")
}

/// Get the configuration directory path
pub fn get_config_dir() -> Result<PathBuf> {
    let project_dirs = get_project_dirs()?;
    Ok(project_dirs.config_dir().to_path_buf())
}

/// Get the settings file path
pub fn get_settings_file_path() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join("settings.yaml"))
}

/// Load settings from the default location or create the default file if it doesn't exist
pub fn load_settings() -> Result<EngineSettings> {
    let settings_path = get_settings_file_path()?;

    if settings_path.exists() {
        load_settings_from(&settings_path)
    } else {
        let settings = EngineSettings::default();
        save_settings(&settings)?;
        Ok(settings)
    }
}

/// Load settings from a specific file
pub fn load_settings_from(path: &Path) -> Result<EngineSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

/// Save settings to the default location
pub fn save_settings(settings: &EngineSettings) -> Result<()> {
    let settings_path = get_settings_file_path()?;
    save_settings_to(settings, &settings_path)
}

/// Save settings to a specific file, creating parent directories
pub fn save_settings_to(settings: &EngineSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
    }

    let content = serde_yaml::to_string(settings).context("Failed to serialize settings")?;

    fs::write(path, content).with_context(|| format!("Failed to write settings file: {}", path.display()))?;

    Ok(())
}
