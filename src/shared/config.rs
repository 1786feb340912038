use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RESOURCE_TIMEOUT_SECS: u64 = 20;

const DEFAULT_EVENTS_PATH: &str = "/api/events";
const DEFAULT_PAYLOAD_FILE: &str = "events_cache.json";
const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";
const CACHE_DIR_NAME: &str = "sports-events";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub events_path: String,
    pub request_timeout_secs: u64,
    pub resource_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub cache_dir: PathBuf,
    pub payload_file: String,
    pub preferences_file: String,
    pub freshness_window_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            events_path: DEFAULT_EVENTS_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            resource_timeout_secs: DEFAULT_RESOURCE_TIMEOUT_SECS,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            payload_file: DEFAULT_PAYLOAD_FILE.to_string(),
            preferences_file: DEFAULT_PREFERENCES_FILE.to_string(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_timeout_secs)
    }
}

impl CacheConfig {
    /// 指定ディレクトリを使う既定設定
    pub fn in_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn payload_path(&self) -> PathBuf {
        self.cache_dir.join(&self.payload_file)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.cache_dir.join(&self.preferences_file)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SPORTS_EVENTS_API_BASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("SPORTS_EVENTS_API_PATH") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.api.events_path = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("SPORTS_EVENTS_REQUEST_TIMEOUT_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.api.request_timeout_secs = value;
        }
        if let Ok(v) = std::env::var("SPORTS_EVENTS_RESOURCE_TIMEOUT_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.api.resource_timeout_secs = value;
        }
        if let Ok(v) = std::env::var("SPORTS_EVENTS_CACHE_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.cache.cache_dir = PathBuf::from(trimmed);
            }
        }
        if let Ok(v) = std::env::var("SPORTS_EVENTS_FRESHNESS_WINDOW_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.cache.freshness_window_secs = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if self.api.request_timeout_secs == 0 {
            return Err("API request_timeout_secs must be greater than 0".to_string());
        }
        if self.api.resource_timeout_secs == 0 {
            return Err("API resource_timeout_secs must be greater than 0".to_string());
        }
        if self.api.request_timeout_secs > self.api.resource_timeout_secs {
            return Err(
                "API request_timeout_secs must not exceed resource_timeout_secs".to_string(),
            );
        }
        if self.cache.freshness_window_secs == 0 {
            return Err("Cache freshness_window_secs must be greater than 0".to_string());
        }
        if self.cache.payload_file.trim().is_empty() {
            return Err("Cache payload_file must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|base| base.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./cache"))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.cache.freshness_window(), Duration::from_secs(3600));
        assert_eq!(cfg.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.api.resource_timeout(), Duration::from_secs(20));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_request_timeout_above_resource_timeout() {
        let mut cfg = AppConfig::default();
        cfg.api.request_timeout_secs = 30;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_freshness_window() {
        let mut cfg = AppConfig::default();
        cfg.cache.freshness_window_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_cache_paths_are_joined_under_cache_dir() {
        let cfg = CacheConfig::in_dir("/tmp/sports");
        assert_eq!(cfg.payload_path(), PathBuf::from("/tmp/sports/events_cache.json"));
        assert_eq!(
            cfg.preferences_path(),
            PathBuf::from("/tmp/sports/preferences.json")
        );
    }

    #[test]
    fn test_parse_u64_ignores_garbage() {
        assert_eq!(parse_u64(" 42 "), Some(42));
        assert_eq!(parse_u64("forty"), None);
    }
}
