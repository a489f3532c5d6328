use crate::quote::entity::{CallQuoteRequest, Quote, SpreadQuoteRequest};
use crate::quote::error::QuoteError;
use async_trait::async_trait;

/// # Summary
/// 期权报价能力接口 (Port)。
/// 具体实现（stub、tradier）在启动时按名称解析一次，之后通过 `Arc<dyn QuoteProvider>` 注入。
///
/// # Invariants
/// - 实现类必须保证线程安全 (`Send` + `Sync`)。
/// - "无数据" 必须返回 `Ok(Quote { value: None, .. })`，不得返回错误。
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 提供者名称，写入运行记录的 meta
    fn name(&self) -> &str;

    /// # Summary
    /// 获取牛市看跌价差的净收入（每股）。
    ///
    /// # Logic
    /// 保守成交假设：卖出腿取 bid，买入腿取 ask。
    ///
    /// # Arguments
    /// * `req`: 价差报价请求。
    ///
    /// # Returns
    /// * `Ok(Quote)` - 有无报价均以 Quote 表达。
    /// * `Err(QuoteError)` - 配置或传输失败。
    async fn fetch_spread_credit(&self, req: &SpreadQuoteRequest) -> Result<Quote, QuoteError>;

    /// # Summary
    /// 获取单腿看涨期权的权利金（每张合约）。
    ///
    /// # Arguments
    /// * `req`: 看涨期权报价请求。
    ///
    /// # Returns
    /// * `Ok(Quote)` - 有无报价均以 Quote 表达。
    /// * `Err(QuoteError)` - 配置或传输失败。
    async fn fetch_call_premium(&self, req: &CallQuoteRequest) -> Result<Quote, QuoteError>;
}
