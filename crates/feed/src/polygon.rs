use crate::http::build_client;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use optagent_core::common::Ticker;
use optagent_core::config::MarketConfig;
use optagent_core::market::entity::Candle;
use optagent_core::market::error::MarketError;
use optagent_core::market::port::MarketDataProvider;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// # Summary
/// Polygon.io 日线行情提供者。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端，超时 10 秒。
/// - API Key 缺失时每次调用返回 `MarketError::Config`，而非在构造时失败。
#[derive(Clone)]
pub struct PolygonProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PolygonProvider {
    /// # Summary
    /// 由行情配置创建提供者。
    ///
    /// # Arguments
    /// * `config`: 包含 API Key 与基础地址的行情配置。
    ///
    /// # Returns
    /// HTTP 客户端构建失败时返回 `MarketError::Config`。
    pub fn new(config: &MarketConfig) -> Result<Self, MarketError> {
        let client = build_client().map_err(|e| MarketError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.polygon_base_url.trim_end_matches('/').to_string(),
            api_key: config.polygon_api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    /// # Summary
    /// 拉取 `[from, to]` 区间内的日线聚合数据。
    ///
    /// # Logic
    /// 1. 拼接 `/v2/aggs/ticker/{T}/range/1/day/{from}/{to}`，附带复权、升序与 API Key 参数。
    /// 2. 非 2xx 响应视为网络错误并带上响应体。
    /// 3. 缺失 `results` 字段视为无数据，返回空列表。
    async fn fetch_range(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, MarketError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketError::Config("Missing POLYGON_API_KEY".to_string()))?;

        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            ticker,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        debug!(%ticker, %from, %to, "Fetching Polygon daily aggregates");

        let resp = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("sort", "asc"), ("apiKey", api_key)])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MarketError::Network(format!("HTTP {}: {}", status, body)));
        }

        let json: PolygonAggsResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        json.results
            .unwrap_or_default()
            .into_iter()
            .map(PolygonBar::into_candle)
            .collect()
    }
}

/// # Summary
/// Polygon 聚合接口响应。
#[derive(Deserialize, Debug)]
struct PolygonAggsResponse {
    // 无数据时该字段缺失
    results: Option<Vec<PolygonBar>>,
}

/// # Summary
/// 单根日线聚合：`t` 为毫秒时间戳。
#[derive(Deserialize, Debug)]
struct PolygonBar {
    t: i64,
    o: Decimal,
    h: Decimal,
    l: Decimal,
    c: Decimal,
}

impl PolygonBar {
    fn into_candle(self) -> Result<Candle, MarketError> {
        let time = Utc
            .timestamp_millis_opt(self.t)
            .single()
            .ok_or_else(|| MarketError::Parse(format!("Invalid timestamp: {}", self.t)))?;
        Ok(Candle {
            time,
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
        })
    }
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    /// # Summary
    /// 获取截至 `end` 的日线。
    ///
    /// # Logic
    /// 起始日 = `end - lookback_days * 1.5` 天，为周末与节假日预留缓冲。
    async fn fetch_daily_candles(
        &self,
        ticker: &Ticker,
        lookback_days: u32,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, MarketError> {
        let calendar_days = i64::from(lookback_days) * 3 / 2;
        let from = end - Duration::days(calendar_days);
        self.fetch_range(ticker, from, end).await
    }

    async fn fetch_close_on(
        &self,
        ticker: &Ticker,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, MarketError> {
        let candles = self.fetch_range(ticker, date, date).await?;
        Ok(candles.first().map(|c| c.close))
    }
}
