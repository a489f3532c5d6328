use async_trait::async_trait;
use optagent_core::config::QuoteConfig;
use optagent_core::quote::entity::{CallQuoteRequest, LegQuote, Quote, SpreadQuoteRequest};
use optagent_core::quote::error::QuoteError;
use optagent_core::quote::port::QuoteProvider;
use rust_decimal::Decimal;

/// # Summary
/// 固定报价提供者，用于本地开发与测试，不发起任何网络请求。
#[derive(Debug, Clone)]
pub struct StubQuoteProvider {
    // 价差每股净收入
    credit: Decimal,
    // 看涨每张合约权利金
    premium: Decimal,
}

impl StubQuoteProvider {
    pub fn new(credit: Decimal, premium: Decimal) -> Self {
        Self { credit, premium }
    }

    pub fn from_config(config: &QuoteConfig) -> Self {
        Self::new(config.stub_credit, config.stub_premium)
    }
}

fn stub_leg(strike: Decimal) -> LegQuote {
    LegQuote {
        symbol: None,
        strike,
        bid: None,
        ask: None,
    }
}

#[async_trait]
impl QuoteProvider for StubQuoteProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_spread_credit(&self, req: &SpreadQuoteRequest) -> Result<Quote, QuoteError> {
        Ok(Quote::priced(
            self.credit,
            vec![stub_leg(req.sell_strike), stub_leg(req.buy_strike)],
        ))
    }

    async fn fetch_call_premium(&self, req: &CallQuoteRequest) -> Result<Quote, QuoteError> {
        Ok(Quote::priced(self.premium, vec![stub_leg(req.call_strike)]))
    }
}
