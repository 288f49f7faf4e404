//! デバッグとログ機能
//!
//! コンソール出力と日次ローテーションの JSON ログファイルを提供

use std::fs;
use std::path::PathBuf;
use tracing::{Level, debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// ログファイル名（日付サフィックス付きでローテーション）
pub const LOG_FILE_NAME: &str = "volcano-deploy.log";

/// デバッグ設定
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// ログレベル
    pub log_level: Level,
    /// ファイルログを有効にするか
    pub enable_file_logging: bool,
    /// ログファイルのディレクトリ
    pub log_directory: PathBuf,
    /// コンソールログを有効にするか
    pub enable_console_logging: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            enable_file_logging: true,
            log_directory: PathBuf::from("logs"),
            enable_console_logging: true,
        }
    }
}

impl DebugConfig {
    /// 開発環境用の設定
    pub fn development() -> Self {
        Self {
            log_level: Level::DEBUG,
            ..Self::default()
        }
    }

    /// 本番環境用の設定（プロジェクトの logs/ に書き出す）
    pub fn production(log_directory: impl Into<PathBuf>) -> Self {
        Self {
            log_directory: log_directory.into(),
            ..Self::default()
        }
    }

    /// テスト環境用の設定
    pub fn test() -> Self {
        Self {
            log_level: Level::WARN,
            enable_file_logging: false,
            log_directory: PathBuf::from("test_logs"),
            enable_console_logging: true,
        }
    }
}

/// ログシステムを初期化
pub fn init_logging(config: &DebugConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 環境変数 RUST_LOG が優先
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("volcano_deploy={}", config.log_level)))?;

    let file_layer = if config.enable_file_logging {
        fs::create_dir_all(&config.log_directory)?;
        // 作成できない場合はパニックせずエラーを返す
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_NAME)
            .build(&config.log_directory)?;
        Some(fmt::layer().json().with_writer(file_appender))
    } else {
        None
    };

    let console_layer = config.enable_console_logging.then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    info!("ログシステムが初期化されました");
    debug!("デバッグ設定: {:?}", config);

    Ok(())
}

/// パフォーマンス測定用のマクロ
#[macro_export]
macro_rules! measure_time {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration = start.elapsed();
        tracing::info!(
            operation = $name,
            duration_ms = duration.as_millis(),
            "操作完了"
        );
        result
    }};
}

/// デバッグ用のヘルパー関数
pub mod debug_helpers {
    use tracing::{debug, error, info};

    /// 実行環境の情報をログに出力
    pub fn log_system_info() {
        info!("=== システム情報 ===");
        info!("OS: {}", std::env::consts::OS);
        info!("アーキテクチャ: {}", std::env::consts::ARCH);
        info!("プロジェクトバージョン: {}", env!("CARGO_PKG_VERSION"));
        info!("ビルド日時: {}", env!("BUILD_TIMESTAMP"));
    }

    /// エラーの詳細情報をログに出力
    pub fn log_error_details(error: &dyn std::error::Error, context: &str) {
        error!(
            context = context,
            error = %error,
            "エラーが発生しました"
        );

        // エラーチェーンをログに出力
        let mut source = error.source();
        let mut level = 1;
        while let Some(err) = source {
            error!(
                context = context,
                level = level,
                source_error = %err,
                "エラーの原因"
            );
            source = err.source();
            level += 1;
        }
    }

    /// デバッグ用の状態ダンプ
    pub fn dump_state<T: std::fmt::Debug>(name: &str, state: &T) {
        debug!(
            component = name,
            state = ?state,
            "状態ダンプ"
        );
    }
}
