use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// 所有外部请求共用的超时
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// # Summary
/// 构建带超时的 HTTP 客户端。
///
/// # Logic
/// 1. 安装进程级 rustls 加密提供者 (ring)，已安装时忽略。
/// 2. 配置 10 秒超时并构建客户端。
pub fn build_client() -> Result<Client, reqwest::Error> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    Client::builder().timeout(REQUEST_TIMEOUT).build()
}
