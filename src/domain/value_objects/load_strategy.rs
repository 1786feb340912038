use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1回の読み込みでキャッシュとリモートをどう使うか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LoadStrategy {
    /// キャッシュを即返し、古ければ裏で更新
    #[default]
    CacheFirst,
    /// リモート優先、失敗時はキャッシュにフォールバック
    ApiFirst,
    /// オフライン用。リモートには触れない
    CacheOnly,
    /// キャッシュを読まずにリモートから取得（書き込みはする）
    ApiOnly,
}

impl LoadStrategy {
    pub const ALL: [LoadStrategy; 4] = [
        LoadStrategy::CacheFirst,
        LoadStrategy::ApiFirst,
        LoadStrategy::CacheOnly,
        LoadStrategy::ApiOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::CacheFirst => "cache-first",
            LoadStrategy::ApiFirst => "api-first",
            LoadStrategy::CacheOnly => "cache-only",
            LoadStrategy::ApiOnly => "api-only",
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        LoadStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| format!("Unknown load strategy: {value}"))
    }
}
