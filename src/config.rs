//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.wanderlore/config.toml` (user)
//! 3. `/etc/wanderlore/config.toml` (system)
//!
//! Every section has defaults, so an absent file is not an error for
//! [`Config::load_or_default`].
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.wanderlore/secrets.toml` (user, must be 0600)
//! 2. `/etc/wanderlore/secrets.toml` (system, must be 0600)
//!
//! ```toml
//! [cache]
//! memory_ttl_secs = 600
//! refresh_interval_hours = 24
//!
//! [budget]
//! daily_limit = 10
//! utc_offset = "+02:00"
//!
//! [generation]
//! model = "gemini-1.5-flash"
//! timeout_secs = 60
//!
//! [remote]
//! base_url = "https://docs.example.com/v1"
//! user_id = "traveller-42"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::budget::{BudgetConfig, DEFAULT_DAILY_LIMIT};
use crate::cache::MemoryConfig;
use crate::generation::RetryConfig;
use crate::generation::http::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::{Result, WanderloreError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub budget: BudgetSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub remote: RemoteSection,
}

/// Cache tier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Memory tier time-to-live in seconds (default: 600).
    #[serde(default = "default_memory_ttl")]
    pub memory_ttl_secs: u64,
    /// Memory tier capacity (default: 1000).
    #[serde(default = "default_memory_entries")]
    pub memory_max_entries: u64,
    /// Remote freshness window in hours (default: 24).
    #[serde(default = "default_refresh_hours")]
    pub refresh_interval_hours: u64,
    /// Directory of the local tier (default: platform data dir).
    #[serde(default)]
    pub local_dir: Option<PathBuf>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            memory_ttl_secs: default_memory_ttl(),
            memory_max_entries: default_memory_entries(),
            refresh_interval_hours: default_refresh_hours(),
            local_dir: None,
        }
    }
}

impl CacheSection {
    pub fn memory_config(&self) -> MemoryConfig {
        MemoryConfig::new()
            .max_entries(self.memory_max_entries)
            .ttl(Duration::from_secs(self.memory_ttl_secs))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours * 3600)
    }
}

fn default_memory_ttl() -> u64 {
    600
}

fn default_memory_entries() -> u64 {
    1_000
}

fn default_refresh_hours() -> u64 {
    24
}

/// Daily request budget settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSection {
    /// Generation calls per calendar day (default: 10).
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// Offset defining calendar days, e.g. `"+02:00"` (default: system local).
    #[serde(default)]
    pub utc_offset: Option<String>,
}

impl Default for BudgetSection {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            utc_offset: None,
        }
    }
}

impl BudgetSection {
    pub fn budget_config(&self) -> Result<BudgetConfig> {
        let mut config = BudgetConfig::new().daily_limit(self.daily_limit);
        if let Some(offset) = &self.utc_offset {
            let offset: FixedOffset = offset.parse().map_err(|e| {
                WanderloreError::Configuration(format!("Invalid budget.utc_offset {offset:?}: {e}"))
            })?;
            config = config.utc_offset(offset);
        }
        Ok(config)
    }
}

fn default_daily_limit() -> u32 {
    DEFAULT_DAILY_LIMIT
}

/// Generation backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSection {
    /// API base URL (default: the public Generative Language endpoint).
    #[serde(default = "default_generation_url")]
    pub base_url: String,
    /// Model name (default: gemini-1.5-flash).
    #[serde(default = "default_model")]
    pub model: String,
    /// Timeout for one generation, retries included (default: 60).
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub retry: RetrySection,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            model: default_model(),
            timeout_secs: default_generation_timeout(),
            temperature: None,
            retry: RetrySection::default(),
        }
    }
}

fn default_generation_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

/// Retry settings for the generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 3). 1 disables retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySection {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// Remote document store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    /// Document store base URL. Without one, remote state stays in memory.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-call timeout in seconds (default: 10).
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
    /// User whose documents and budget are used.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_remote_timeout(),
            user_id: None,
        }
    }
}

fn default_remote_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.wanderlore/config.toml`
    /// 3. `/etc/wanderlore/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?.ok_or_else(|| {
            WanderloreError::Configuration(
                "No config file found. Create ~/.wanderlore/config.toml or /etc/wanderlore/config.toml"
                    .to_string(),
            )
        })?;
        Self::load_from_file(&path)
    }

    /// Like [`load`](Self::load), but falls back to defaults when no file
    /// exists. An explicit path that does not exist is still an error.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            WanderloreError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            WanderloreError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(WanderloreError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".wanderlore").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/wanderlore/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

/// Secrets (API key and document store token).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
    #[serde(default)]
    pub remote: Option<TokenSecret>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecret {
    pub token: String,
}

const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const REMOTE_TOKEN_ENV: &str = "WANDERLORE_REMOTE_TOKEN";

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (env vars may still apply).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".wanderlore").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/wanderlore/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file. Permissions are checked first.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            WanderloreError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            WanderloreError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Reject secrets files readable by group or others.
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            WanderloreError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(WanderloreError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Generation API key, falling back to `GEMINI_API_KEY`.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(GEMINI_API_KEY_ENV).ok())
    }

    /// Document store token, falling back to `WANDERLORE_REMOTE_TOKEN`.
    pub fn remote_token(&self) -> Option<String> {
        self.remote
            .as_ref()
            .map(|s| s.token.clone())
            .or_else(|| std::env::var(REMOTE_TOKEN_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.cache.memory_ttl_secs, 600);
        assert_eq!(config.cache.refresh_interval(), Duration::from_secs(86_400));
        assert_eq!(config.budget.daily_limit, DEFAULT_DAILY_LIMIT);
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(config.remote.base_url.is_none());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [budget]
            daily_limit = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.budget.daily_limit, 5);
        // Defaults preserved
        assert_eq!(config.cache.memory_max_entries, 1_000);
        assert_eq!(config.generation.model, DEFAULT_MODEL);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [cache]
            memory_ttl_secs = 60
            memory_max_entries = 50
            refresh_interval_hours = 6
            local_dir = "/var/lib/wanderlore"

            [budget]
            daily_limit = 20
            utc_offset = "+09:00"

            [generation]
            base_url = "http://localhost:8080"
            model = "gemini-test"
            timeout_secs = 5
            temperature = 0.4

            [generation.retry]
            max_attempts = 1

            [remote]
            base_url = "http://localhost:9000/v1"
            timeout_secs = 3
            user_id = "u-1"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.memory_config().ttl, Duration::from_secs(60));
        assert_eq!(
            config.cache.local_dir,
            Some(PathBuf::from("/var/lib/wanderlore"))
        );
        let budget = config.budget.budget_config().unwrap();
        assert_eq!(budget.daily_limit, 20);
        assert_eq!(budget.utc_offset.local_minus_utc(), 9 * 3600);
        assert_eq!(config.generation.retry.retry_config().max_attempts, 1);
        assert_eq!(config.generation.temperature, Some(0.4));
        assert_eq!(config.remote.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn invalid_offset_is_rejected() {
        let section = BudgetSection {
            daily_limit: 3,
            utc_offset: Some("tomorrow".into()),
        };
        assert!(section.budget_config().is_err());
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [gemini]
            api_key = "g-test-key"

            [remote]
            token = "r-token"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("g-test-key".to_string()));
        assert_eq!(secrets.remote_token(), Some("r-token".to_string()));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[cfg(unix)]
    #[test]
    fn world_readable_secrets_are_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[gemini]\napi_key = \"k\"\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(Secrets::load_from_file(&path).is_err());

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "k");
    }
}
