use thiserror::Error;

/// # Summary
/// 报价域错误枚举。
///
/// # Invariants
/// - 缺少报价数据不属于错误，应以 `Quote::unavailable` 返回。
/// - `Config` 是致命错误（未知提供者、缺少凭证），调用方不得吞掉。
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Quote provider configuration error: {0}")]
    Config(String),
    #[error("Quote network error: {0}")]
    Network(String),
    #[error("Quote parse error: {0}")]
    Parse(String),
}

impl QuoteError {
    /// 是否为配置类错误
    pub fn is_config(&self) -> bool {
        matches!(self, QuoteError::Config(_))
    }
}
