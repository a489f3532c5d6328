use crate::common::Ticker;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 牛市看跌价差 (bull put spread) 报价请求。
///
/// # Invariants
/// - `sell_strike > buy_strike`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadQuoteRequest {
    pub underlying: Ticker,
    pub exp: NaiveDate,
    pub sell_strike: Decimal,
    pub buy_strike: Decimal,
}

/// # Summary
/// 单腿看涨期权报价请求。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallQuoteRequest {
    pub underlying: Ticker,
    pub exp: NaiveDate,
    pub call_strike: Decimal,
}

/// # Summary
/// 单条期权腿的盘口快照，用于排查"为什么没有报价"。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegQuote {
    // OCC 期权代码
    pub symbol: Option<String>,
    pub strike: Decimal,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
}

/// # Summary
/// 报价结果。
///
/// # Invariants
/// - `value` 为 `None` 时 `reason` 必须给出原因（缺盘口、行权价不存在等）。
/// - 价差的 `value` 为每股净收入（美元），单腿看涨的 `value` 为每张合约权利金（美元）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub value: Option<Decimal>,
    pub reason: Option<String>,
    pub legs: Vec<LegQuote>,
}

impl Quote {
    /// 构造一个有效报价
    pub fn priced(value: Decimal, legs: Vec<LegQuote>) -> Self {
        Self {
            value: Some(value),
            reason: None,
            legs,
        }
    }

    /// 构造一个"无数据"报价
    pub fn unavailable(reason: impl Into<String>, legs: Vec<LegQuote>) -> Self {
        Self {
            value: None,
            reason: Some(reason.into()),
            legs,
        }
    }
}
