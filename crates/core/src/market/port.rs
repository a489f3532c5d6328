use crate::common::Ticker;
use crate::market::entity::Candle;
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// # Summary
/// 市场行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 返回的 K 线必须按时间升序排列。
/// - "无数据"（节假日、停牌）以空列表或 `None` 表达，而非错误。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取特定证券截至 `end`（含）的日线数据。
    ///
    /// # Logic
    /// 1. 由 `lookback_days` 推算起始日（实现者需为周末预留缓冲）。
    /// 2. 执行网络请求并解析响应数据。
    ///
    /// # Arguments
    /// * `ticker`: 证券代码。
    /// * `lookback_days`: 需要覆盖的交易日数量。
    /// * `end`: 截止日期。
    ///
    /// # Returns
    /// 成功返回升序 K 线列表。
    async fn fetch_daily_candles(
        &self,
        ticker: &Ticker,
        lookback_days: u32,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, MarketError>;

    /// # Summary
    /// 获取证券在指定交易日的收盘价。
    ///
    /// # Arguments
    /// * `ticker`: 证券代码。
    /// * `date`: 目标交易日。
    ///
    /// # Returns
    /// 有数据返回 `Some(close)`，节假日或数据缺口返回 `None`。
    async fn fetch_close_on(
        &self,
        ticker: &Ticker,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, MarketError>;
}
