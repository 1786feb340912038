use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// エンドポイントURLが組み立てられない
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// 通信エラー・タイムアウト
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
    /// 2xx 以外のステータス
    #[error("Remote rejected the request with HTTP {status}")]
    RemoteRejected { status: u16 },
    /// レスポンスがスキーマに一致しない
    #[error("Failed to decode remote payload: {0}")]
    DecodeFailed(String),
    /// api-first でリモートもキャッシュも使えなかった
    #[error("No data available from remote or cache")]
    NoDataAvailable,
    /// cache-only でキャッシュが空
    #[error("No cached data available")]
    NoCacheAvailable,
    /// ディスクキャッシュの読み書き失敗（常に回復可能）
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    /// プレゼンテーション層向けの安定したエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::RemoteUnavailable(_) => "remote_unavailable",
            AppError::RemoteRejected { .. } => "remote_rejected",
            AppError::DecodeFailed(_) => "decode_failed",
            AppError::NoDataAvailable => "no_data_available",
            AppError::NoCacheAvailable => "no_cache_available",
            AppError::Persistence(_) => "persistence",
            AppError::ConfigurationError(_) => "configuration",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
