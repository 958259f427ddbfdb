use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path();

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load configuration, falling back to defaults when no file exists.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path();
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| eyre!("Invalid config file {}: {}", config_path.display(), e))?;
        Ok(config)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows shown in the data preview pane
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Clear the column selection when switching operation groups
    pub clear_selection_on_group_switch: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File stem for exported datasets
    pub stem: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { preview_rows: 15 }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            clear_selection_on_group_switch: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            stem: "processed_dataset".to_string(),
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tabclean configuration

[display]
# Rows shown in the data preview pane
preview_rows = 15

[behavior]
# Clear the column selection when switching operation groups
clear_selection_on_group_switch = true

[export]
# File stem for exported datasets
stem = "processed_dataset"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(parsed.display.preview_rows, defaults.display.preview_rows);
        assert_eq!(
            parsed.behavior.clear_selection_on_group_switch,
            defaults.behavior.clear_selection_on_group_switch
        );
        assert_eq!(parsed.export.stem, defaults.export.stem);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[display]\npreview_rows = 5\n").unwrap();
        assert_eq!(parsed.display.preview_rows, 5);
        assert!(parsed.behavior.clear_selection_on_group_switch);
    }
}
