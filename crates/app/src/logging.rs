//! 日志初始化：标准输出 + 按天滚动的文件日志。

use optagent_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "optagent.log";

/// # Summary
/// 安装全局 tracing 订阅者。
///
/// # Logic
/// 1. 过滤级别来自 `RUST_LOG`，缺省为 `info`。
/// 2. 标准输出层使用紧凑格式。
/// 3. 文件层写入 `{dir}/optagent.log.YYYY-MM-DD`，经非阻塞写入器输出。
///
/// # Returns
/// 文件写入器的 guard，必须持有到进程结束，否则尾部日志可能丢失。
pub fn init(config: &LogConfig) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
