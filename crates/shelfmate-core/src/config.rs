use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfmateError};

/// Root application configuration, loaded from `~/.config/shelfmate/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub pool: PoolSettings,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub data_path: String,
}

/// Tuning for the interest pool and the recommendation sampler.
///
/// Built once at startup and shared read-only by the maintainer and the
/// allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Saturation at which personalization reaches full strength; also the
    /// value saturation is reset to after a decay pass.
    pub saturation_limit: u32,
    /// Upper bound of any single category weight.
    pub weight_limit: u32,
    /// Weight added to a category per engagement.
    pub add_amount: u32,
    /// Weight removed from every category per decay pass.
    pub decay_amount: u32,
    /// Engagements between decay passes once saturated.
    pub decay_interval: u32,
    /// Books per recommendation batch.
    pub sample_size: usize,
    /// Ceiling on the personalized share of a batch, in (0, 1].
    pub max_portion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("shelfmate");

        Self {
            data_path: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            saturation_limit: 50,
            weight_limit: 100,
            add_amount: 5,
            decay_amount: 1,
            decay_interval: 2,
            sample_size: 10,
            max_portion: 0.8,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl PoolSettings {
    /// Saturation value at which a decay pass runs.
    pub fn decay_threshold(&self) -> u32 {
        self.saturation_limit.saturating_add(self.decay_interval)
    }

    pub fn validate(&self) -> Result<()> {
        if self.saturation_limit == 0 {
            return Err(ShelfmateError::ConfigError(
                "pool.saturation_limit must be greater than 0".to_string(),
            ));
        }
        if self.weight_limit == 0 {
            return Err(ShelfmateError::ConfigError(
                "pool.weight_limit must be greater than 0".to_string(),
            ));
        }
        if self.sample_size == 0 {
            return Err(ShelfmateError::ConfigError(
                "pool.sample_size must be greater than 0".to_string(),
            ));
        }
        if !(self.max_portion > 0.0 && self.max_portion <= 1.0) {
            return Err(ShelfmateError::ConfigError(format!(
                "pool.max_portion must be in (0, 1], got {}",
                self.max_portion
            )));
        }
        Ok(())
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/shelfmate/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SHELFMATE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("shelfmate")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.pool.validate()
    }

    pub fn set_data_path(&mut self, path: PathBuf) {
        self.core.data_path = path.to_string_lossy().to_string();
    }

    /// Path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.core.data_path).join("shelfmate.db")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
