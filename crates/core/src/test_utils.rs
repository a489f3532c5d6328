//! 测试替身：内存行情源与固定报价提供者。

use crate::common::Ticker;
use crate::market::entity::Candle;
use crate::market::error::MarketError;
use crate::market::port::MarketDataProvider;
use crate::quote::entity::{CallQuoteRequest, LegQuote, Quote, SpreadQuoteRequest};
use crate::quote::error::QuoteError;
use crate::quote::port::QuoteProvider;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// 构造某个 UTC 交易日的 K 线
pub fn candle(date: NaiveDate, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
    let time = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
    Candle {
        time,
        open,
        high,
        low,
        close,
    }
}

/// # Summary
/// 内存行情源，按代码返回预置 K 线与收盘价。
#[derive(Default)]
pub struct StaticMarketData {
    candles: RwLock<HashMap<String, Vec<Candle>>>,
    closes: RwLock<HashMap<(String, NaiveDate), Decimal>>,
    failing: RwLock<Option<MarketError>>,
    close_calls: AtomicUsize,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_candles(&self, ticker: &str, candles: Vec<Candle>) {
        self.candles.write().await.insert(ticker.to_string(), candles);
    }

    pub async fn set_close(&self, ticker: &str, date: NaiveDate, close: Decimal) {
        self.closes
            .write()
            .await
            .insert((ticker.to_string(), date), close);
    }

    /// 让后续所有调用返回网络错误
    pub async fn set_failing(&self, message: Option<&str>) {
        *self.failing.write().await = message.map(|m| MarketError::Network(m.to_string()));
    }

    /// 让后续所有调用返回配置错误（例如缺少 API Key）
    pub async fn set_misconfigured(&self, message: &str) {
        *self.failing.write().await = Some(MarketError::Config(message.to_string()));
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    async fn check_failing(&self) -> Result<(), MarketError> {
        match self.failing.read().await.as_ref() {
            Some(MarketError::Config(msg)) => Err(MarketError::Config(msg.clone())),
            Some(MarketError::Parse(msg)) => Err(MarketError::Parse(msg.clone())),
            Some(MarketError::Network(msg)) => Err(MarketError::Network(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn fetch_daily_candles(
        &self,
        ticker: &Ticker,
        _lookback_days: u32,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, MarketError> {
        self.check_failing().await?;
        let candles = self.candles.read().await;
        Ok(candles
            .get(ticker.as_str())
            .map(|list| list.iter().filter(|c| c.date() <= end).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_close_on(
        &self,
        ticker: &Ticker,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, MarketError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing().await?;
        let closes = self.closes.read().await;
        Ok(closes.get(&(ticker.as_str().to_string(), date)).copied())
    }
}

#[derive(Debug, Clone)]
enum FixedMode {
    Priced(Decimal),
    Unavailable(String),
    NetworkError(String),
    ConfigError(String),
}

/// # Summary
/// 返回固定结果的报价提供者，价差与看涨共用同一结果。
pub struct FixedQuoteProvider {
    mode: FixedMode,
    legs: Vec<LegQuote>,
    calls: AtomicUsize,
}

impl FixedQuoteProvider {
    fn with_mode(mode: FixedMode) -> Self {
        Self {
            mode,
            legs: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// 报价结果附带的盘口快照
    pub fn with_legs(mut self, legs: Vec<LegQuote>) -> Self {
        self.legs = legs;
        self
    }

    pub fn priced(value: Decimal) -> Self {
        Self::with_mode(FixedMode::Priced(value))
    }

    pub fn unavailable(reason: &str) -> Self {
        Self::with_mode(FixedMode::Unavailable(reason.to_string()))
    }

    pub fn network_error(message: &str) -> Self {
        Self::with_mode(FixedMode::NetworkError(message.to_string()))
    }

    pub fn config_error(message: &str) -> Self {
        Self::with_mode(FixedMode::ConfigError(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<Quote, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            FixedMode::Priced(v) => Ok(Quote::priced(*v, self.legs.clone())),
            FixedMode::Unavailable(reason) => Ok(Quote::unavailable(reason.clone(), self.legs.clone())),
            FixedMode::NetworkError(msg) => Err(QuoteError::Network(msg.clone())),
            FixedMode::ConfigError(msg) => Err(QuoteError::Config(msg.clone())),
        }
    }
}

#[async_trait]
impl QuoteProvider for FixedQuoteProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_spread_credit(&self, _req: &SpreadQuoteRequest) -> Result<Quote, QuoteError> {
        self.answer()
    }

    async fn fetch_call_premium(&self, _req: &CallQuoteRequest) -> Result<Quote, QuoteError> {
        self.answer()
    }
}
