use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理配置、网络、解析等问题。
///
/// # Invariants
/// - "当日无数据" 不是错误，由端口返回 `None` 或空列表表达。
#[derive(Error, Debug)]
pub enum MarketError {
    // 配置错误，例如缺失 API Key
    #[error("Configuration error: {0}")]
    Config(String),
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
}
