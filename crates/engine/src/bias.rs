use crate::indicator::ema;
use optagent_core::decision::entity::TrendBias;
use optagent_core::market::entity::Candle;
use rust_decimal::Decimal;

/// 趋势判断所需的指标快照
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSnapshot {
    pub close: Decimal,
    pub ema20: Decimal,
    pub ema50: Decimal,
    pub bias: TrendBias,
}

/// # Summary
/// 按收盘价与两条均线的相对位置分类趋势。
///
/// # Logic
/// 严格高于两者为 Bullish，严格低于两者为 Bearish，其余（含相等）为 No Trade。
pub fn classify(close: Decimal, ema20: Decimal, ema50: Decimal) -> TrendBias {
    if close > ema20 && close > ema50 {
        TrendBias::Bullish
    } else if close < ema20 && close < ema50 {
        TrendBias::Bearish
    } else {
        TrendBias::NoTrade
    }
}

/// # Summary
/// 由 K 线序列计算 EMA20 / EMA50 与趋势偏向。
///
/// # Returns
/// 空序列返回 `None`。
pub fn trend_snapshot(candles: &[Candle]) -> Option<TrendSnapshot> {
    let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
    let close = *closes.last()?;
    let ema20 = ema(&closes, 20)?;
    let ema50 = ema(&closes, 50)?;
    Some(TrendSnapshot {
        close,
        ema20,
        ema50,
        bias: classify(close, ema20, ema50),
    })
}
