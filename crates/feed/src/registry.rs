use crate::stub::StubQuoteProvider;
use crate::tradier::TradierProvider;
use optagent_core::config::QuoteConfig;
use optagent_core::quote::error::QuoteError;
use optagent_core::quote::port::QuoteProvider;
use std::sync::Arc;
use tracing::info;

/// 已注册的报价提供者名称
pub const PROVIDERS: &[&str] = &["stub", "tradier"];

/// # Summary
/// 按配置名称解析报价提供者，启动时调用一次。
///
/// # Logic
/// 1. 名称去空白并转小写。
/// 2. 匹配已注册实现并构造；未知名称返回配置错误。
///
/// # Returns
/// * `Ok(Arc<dyn QuoteProvider>)` - 解析成功。
/// * `Err(QuoteError::Config)` - 名称未知或凭证缺失。
pub fn resolve_quote_provider(config: &QuoteConfig) -> Result<Arc<dyn QuoteProvider>, QuoteError> {
    let name = config.provider.trim().to_lowercase();
    let provider: Arc<dyn QuoteProvider> = match name.as_str() {
        "stub" => Arc::new(StubQuoteProvider::from_config(config)),
        "tradier" => Arc::new(TradierProvider::new(config)?),
        other => {
            return Err(QuoteError::Config(format!(
                "Unknown quote provider '{}' (expected one of: {})",
                other,
                PROVIDERS.join(", ")
            )));
        }
    };
    info!(provider = provider.name(), "Quote provider resolved");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_stub_by_default() {
        let provider = resolve_quote_provider(&QuoteConfig::default()).unwrap();
        assert_eq!(provider.name(), "stub");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = QuoteConfig {
            provider: "ibkr".to_string(),
            ..QuoteConfig::default()
        };
        let err = resolve_quote_provider(&config).err().unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("ibkr"));
    }

    #[test]
    fn test_tradier_requires_token() {
        let config = QuoteConfig {
            provider: " Tradier ".to_string(),
            ..QuoteConfig::default()
        };
        let err = resolve_quote_provider(&config).err().unwrap();
        assert!(err.is_config());
    }
}
