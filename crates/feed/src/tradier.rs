use crate::http::build_client;
use async_trait::async_trait;
use chrono::NaiveDate;
use optagent_core::common::Ticker;
use optagent_core::config::QuoteConfig;
use optagent_core::quote::entity::{CallQuoteRequest, LegQuote, Quote, SpreadQuoteRequest};
use optagent_core::quote::error::QuoteError;
use optagent_core::quote::port::QuoteProvider;
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::{debug, warn};

const LIVE_BASE_URL: &str = "https://api.tradier.com/v1";
const SANDBOX_BASE_URL: &str = "https://sandbox.tradier.com/v1";

/// # Summary
/// Tradier 期权链报价提供者（只读行情）。
///
/// # Invariants
/// - 构造时必须持有 API Token，否则为配置错误。
/// - 成交假设保守：卖出腿按 bid，买入腿按 ask。
pub struct TradierProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl TradierProvider {
    /// # Summary
    /// 由报价配置创建 Tradier 提供者。
    ///
    /// # Logic
    /// 1. 校验 Token 存在。
    /// 2. 基础地址优先取 `tradier_base_url`，否则 `live` 环境用正式地址，其余用沙箱地址。
    ///
    /// # Returns
    /// 缺少 Token 时返回 `QuoteError::Config`。
    pub fn new(config: &QuoteConfig) -> Result<Self, QuoteError> {
        let token = config
            .tradier_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| QuoteError::Config("Missing TRADIER_TOKEN".to_string()))?;

        let base_url = match config.tradier_base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ if config.tradier_env.eq_ignore_ascii_case("live") => LIVE_BASE_URL.to_string(),
            _ => SANDBOX_BASE_URL.to_string(),
        };

        let client = build_client().map_err(|e| QuoteError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Summary
    /// 拉取标的在某个到期日的完整期权链。
    ///
    /// # Logic
    /// 1. GET `/markets/options/chains?symbol&expiration&greeks=false`，Bearer 鉴权。
    /// 2. 非 2xx 返回 `QuoteError::Network` 并附带响应体。
    /// 3. `options.option` 可能缺失、为单个对象或数组，统一展开为列表。
    async fn option_chain(
        &self,
        symbol: &Ticker,
        expiration: NaiveDate,
    ) -> Result<Vec<TradierOption>, QuoteError> {
        let url = format!("{}/markets/options/chains", self.base_url);
        let expiration = expiration.format("%Y-%m-%d").to_string();
        debug!(%symbol, %expiration, "Fetching Tradier option chain");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("symbol", symbol.as_str()),
                ("expiration", expiration.as_str()),
                ("greeks", "false"),
            ])
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuoteError::Network(format!(
                "Tradier error {}: {}",
                status.as_u16(),
                body
            )));
        }

        let json: ChainResponse = resp
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        Ok(json
            .options
            .and_then(|o| o.option)
            .map(OneOrMany::into_vec)
            .unwrap_or_default())
    }
}

/// # Summary
/// 期权链响应。无合约时 Tradier 返回 `"options": null`。
#[derive(Deserialize, Debug)]
struct ChainResponse {
    options: Option<ChainOptions>,
}

#[derive(Deserialize, Debug)]
struct ChainOptions {
    option: Option<OneOrMany<TradierOption>>,
}

/// Tradier 只有一个合约时返回对象而不是数组
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

/// # Summary
/// 期权链中的单个合约。
#[derive(Deserialize, Debug, Clone)]
struct TradierOption {
    symbol: Option<String>,
    // put | call
    option_type: String,
    strike: Decimal,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
}

impl TradierOption {
    fn leg(&self) -> LegQuote {
        LegQuote {
            symbol: self.symbol.clone(),
            strike: self.strike,
            bid: self.bid,
            ask: self.ask,
        }
    }
}

fn find_leg<'a>(chain: &'a [TradierOption], option_type: &str, strike: Decimal) -> Option<&'a TradierOption> {
    chain
        .iter()
        .find(|o| o.option_type.eq_ignore_ascii_case(option_type) && o.strike == strike)
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[async_trait]
impl QuoteProvider for TradierProvider {
    fn name(&self) -> &str {
        "tradier"
    }

    /// # Summary
    /// 每股净收入 = 卖出腿 bid - 买入腿 ask，保留两位小数。
    async fn fetch_spread_credit(&self, req: &SpreadQuoteRequest) -> Result<Quote, QuoteError> {
        let chain = self.option_chain(&req.underlying, req.exp).await?;

        let (Some(short), Some(long)) = (
            find_leg(&chain, "put", req.sell_strike),
            find_leg(&chain, "put", req.buy_strike),
        ) else {
            warn!(underlying = %req.underlying, exp = %req.exp, "Selected strikes not found in chain");
            return Ok(Quote::unavailable("Selected strikes not found in chain", Vec::new()));
        };

        let legs = vec![short.leg(), long.leg()];
        match (short.bid, long.ask) {
            (Some(bid), Some(ask)) => Ok(Quote::priced(round2(bid - ask), legs)),
            _ => Ok(Quote::unavailable("Missing bid/ask", legs)),
        }
    }

    /// # Summary
    /// 每张合约权利金 = 看涨 ask × 100。
    async fn fetch_call_premium(&self, req: &CallQuoteRequest) -> Result<Quote, QuoteError> {
        let chain = self.option_chain(&req.underlying, req.exp).await?;

        let Some(call) = find_leg(&chain, "call", req.call_strike) else {
            return Ok(Quote::unavailable("Selected strike not found in chain", Vec::new()));
        };

        match call.ask {
            Some(ask) => Ok(Quote::priced(round2(ask * Decimal::ONE_HUNDRED), vec![call.leg()])),
            None => Ok(Quote::unavailable("Missing ask", vec![call.leg()])),
        }
    }
}
