//! 支撑位检测：回看窗口内最近的摆动低点及其被测试（拒绝）的次数。

use crate::indicator::round_half_up;
use optagent_core::decision::entity::SupportInfo;
use optagent_core::market::entity::Candle;
use rust_decimal::Decimal;

/// # Summary
/// 检测最近 `lookback` 根 K 线内的支撑位。
///
/// # Logic
/// 1. 窗口取最后 `lookback` 根 K 线。
/// 2. 从倒数第二根向前扫描到第二根，第一个低点严格低于左右两侧的即为摆动低点。
/// 3. 找不到时取窗口内最低的低点（并列取最早）。
/// 4. 容差 `tol = low * tolerance_pct`；最低价 `<= support + tol` 且收盘价 `> support` 计为一次拒绝。
///
/// # Returns
/// 空输入返回 `None`。
pub fn detect_support(candles: &[Candle], lookback: usize, tolerance_pct: Decimal) -> Option<SupportInfo> {
    let start = candles.len().saturating_sub(lookback.max(1));
    let window = &candles[start..];
    if window.is_empty() {
        return None;
    }

    let swing = swing_low_index(window).or_else(|| lowest_low_index(window))?;
    let swing_candle = &window[swing];
    let support = swing_candle.low;
    let tol = support * tolerance_pct;

    let rejection_dates: Vec<_> = window
        .iter()
        .filter(|c| c.low <= support + tol && c.close > support)
        .map(Candle::date)
        .collect();

    Some(SupportInfo {
        support: round_half_up(support, 2),
        swing_date: swing_candle.date(),
        rejection_count: u32::try_from(rejection_dates.len()).unwrap_or(u32::MAX),
        rejection_dates,
    })
}

fn swing_low_index(window: &[Candle]) -> Option<usize> {
    if window.len() < 3 {
        return None;
    }
    (1..window.len() - 1)
        .rev()
        .find(|&i| window[i].low < window[i - 1].low && window[i].low < window[i + 1].low)
}

fn lowest_low_index(window: &[Candle]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in window.iter().enumerate() {
        match best {
            Some(b) if window[b].low <= c.low => {}
            _ => best = Some(i),
        }
    }
    best
}
