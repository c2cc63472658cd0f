//! Store connection settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings identifying the backing store deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Cloud project hosting the store instance.
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Store instance to connect to.
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
}

fn default_project_id() -> String {
    "local-project".to_string()
}

fn default_instance_id() -> String {
    "local".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            instance_id: default_instance_id(),
        }
    }
}

impl StoreSettings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read store settings: {}", e))?;

        let mut settings: StoreSettings = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse store settings: {}", e))?;

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Apply environment variable overrides:
    /// - `LEDGERDB_PROJECT_ID`: overrides project_id
    /// - `LEDGERDB_INSTANCE_ID`: overrides instance_id
    fn apply_env_overrides(&mut self) {
        if let Ok(project_id) = std::env::var("LEDGERDB_PROJECT_ID") {
            self.project_id = project_id;
        }
        if let Ok(instance_id) = std::env::var("LEDGERDB_INSTANCE_ID") {
            self.instance_id = instance_id;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.project_id.is_empty() {
            anyhow::bail!("project_id must not be empty");
        }
        if self.instance_id.is_empty() {
            anyhow::bail!("instance_id must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.project_id, "local-project");
        assert_eq!(settings.instance_id, "local");
    }

    #[test]
    fn test_parse_with_partial_fields() {
        let settings: StoreSettings = toml::from_str("instance_id = \"prod-eu\"").unwrap();
        assert_eq!(settings.project_id, "local-project");
        assert_eq!(settings.instance_id, "prod-eu");
    }
}
