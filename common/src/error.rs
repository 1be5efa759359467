//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! # 致命的エラーと回復可能エラー
//!
//! `ExporterError::is_fatal()` が `true` を返すエラーはプロセスを終了させる。
//! それ以外はログ出力のうえ次のサイクルで再開する。

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Exporter error type
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// HTTP client error (クライアント構築失敗など)
    #[error("HTTP client error: {0}")]
    Http(String),

    /// API request retries exhausted
    #[error("API request to {url} failed after {attempts} attempts")]
    RetriesExhausted {
        /// 要求先URL
        url: String,
        /// 実施した試行回数
        attempts: u32,
    },

    /// Response body is not valid JSON
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// check-host API quota exhausted (`limit_exceeded`)
    #[error("check-host API rate limit exceeded")]
    RateLimited,

    /// Expected key missing from an API response
    #[error("Malformed check result: {0}")]
    MalformedResult(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Metrics endpoint server error
    #[error("Server error: {0}")]
    Server(String),

    /// Check result did not complete within the poll ceiling
    #[error("Check result still incomplete after {attempts} polls")]
    Timeout {
        /// 実施したポーリング回数
        attempts: u32,
    },
}

impl ExporterError {
    /// プロセスを終了すべきエラーかどうか
    ///
    /// リトライ枯渇・デコード失敗・初期化失敗が該当する。
    pub fn is_fatal(&self) -> bool {
        match self {
            ExporterError::Common(_)
            | ExporterError::Http(_)
            | ExporterError::Metrics(_)
            | ExporterError::Server(_)
            | ExporterError::RetriesExhausted { .. }
            | ExporterError::Decode(_) => true,
            ExporterError::RateLimited
            | ExporterError::MalformedResult(_)
            | ExporterError::Timeout { .. } => false,
        }
    }

    /// レート制限と同じバックオフで回復するエラーかどうか
    pub fn requires_backoff(&self) -> bool {
        matches!(
            self,
            ExporterError::RateLimited | ExporterError::MalformedResult(_)
        )
    }
}

/// Exporter result alias
pub type ExporterResult<T> = Result<T, ExporterError>;
