use crate::config::LogSettings;
use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人間向けの整形出力
    Pretty,
    /// JSON Lines（CI収集用）
    Json,
}

/// ログ設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル (trace, debug, info, warn, error) または EnvFilter ディレクティブ
    pub level: String,
    /// 出力形式
    pub format: LogFormat,
    /// テストハーネスのキャプチャ対象に書き出す
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// 設定ファイルの値からログ設定を作成
    pub fn from_settings(settings: &LogSettings) -> Self {
        Self {
            level: settings.level.clone(),
            format: if settings.json {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            test_writer: false,
        }
    }

    /// ログレベル設定
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 出力形式設定
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// テスト出力制御
    pub fn with_test_writer(mut self, enabled: bool) -> Self {
        self.test_writer = enabled;
        self
    }

    /// EnvFilterを作成（`RUST_LOG` が優先）
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// ログシステムを初期化
///
/// グローバルサブスクライバが既に設定済みの場合はエラーを返す
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let builder = fmt().with_env_filter(config.env_filter()).with_target(true);

    let result = match (config.format, config.test_writer) {
        (LogFormat::Pretty, false) => builder.try_init(),
        (LogFormat::Pretty, true) => builder.with_test_writer().try_init(),
        (LogFormat::Json, false) => builder.json().try_init(),
        (LogFormat::Json, true) => builder.json().with_test_writer().try_init(),
    };
    result.map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    Ok(())
}

/// テスト用ログ初期化
///
/// 何度呼んでもよい。二回目以降は何もしない。
pub fn init_test_logging() {
    let config = LogConfig::default()
        .with_level("dbmock_rs=debug")
        .with_test_writer(true);
    let _ = init_logging(&config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LogSettings {
            level: "debug".to_string(),
            json: true,
        };
        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("still fine");
    }
}
