//! 到期结算：由到期日标的收盘价计算牛市看跌价差的实际盈亏（单位：每张合约美元）。

use crate::indicator::round_half_up;
use chrono::NaiveDate;
use optagent_core::common::Ticker;
use optagent_core::decision::entity::{TradePlan, TradeProposal};
use optagent_core::run::entity::{Outcome, RunRecord, Settlement};
use rust_decimal::Decimal;

const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// # Summary
/// 可结算的价差头寸。
///
/// # Invariants
/// - `credit` 为每张合约美元（每股净收入 × 100）。
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadPosition {
    pub ticker: Ticker,
    pub exp: NaiveDate,
    pub sell_strike: Decimal,
    pub buy_strike: Decimal,
    pub credit: Decimal,
}

impl SpreadPosition {
    /// # Summary
    /// 从运行记录中提取可结算的价差头寸。
    ///
    /// # Returns
    /// 非价差或缺少净收入的记录返回 `None`（跳过，不视为错误）。
    pub fn from_record(record: &RunRecord) -> Option<Self> {
        let TradeProposal::Trade(TradePlan::BullPutSpread(plan)) = &record.analysis.trade else {
            return None;
        };
        let credit = plan.credit?;
        Some(Self {
            ticker: record.analysis.ticker.clone(),
            exp: plan.exp,
            sell_strike: plan.sell_strike,
            buy_strike: plan.buy_strike,
            credit: credit * CONTRACT_MULTIPLIER,
        })
    }

    /// 到期日已到（含当天）才允许结算
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.exp <= today
    }
}

/// # Summary
/// 计算价差到期结果。
///
/// # Logic
/// 1. `max_loss = width * 100 - credit`。
/// 2. 收盘价 >= 卖出行权价：WIN，利润 = credit。
/// 3. 收盘价 <= 买入行权价：LOSS，利润 = -max_loss。
/// 4. 其余：利润 = credit - (sell - close) * 100，钳制在 `[-max_loss, credit]`，非负为 WIN，否则 PARTIAL。
/// 5. 利润与最大亏损取整到美元。
///
/// # Arguments
/// * `position`: 价差头寸。
/// * `close`: 到期日标的收盘价，缺失时结果为 UNKNOWN。
pub fn settle_spread(position: &SpreadPosition, close: Option<Decimal>) -> Outcome {
    let Some(close) = close else {
        return Outcome::Unknown {
            exp: position.exp,
            reason: format!("No close available for {} on {}", position.ticker, position.exp),
        };
    };

    let width = position.sell_strike - position.buy_strike;
    let credit = position.credit;
    let max_loss = width * CONTRACT_MULTIPLIER - credit;

    let settled = |profit: Decimal| Settlement {
        exp: position.exp,
        underlying_close_at_exp: close,
        profit: round_half_up(profit, 0),
        credit,
        max_loss: round_half_up(max_loss, 0),
    };

    if close >= position.sell_strike {
        return Outcome::Win(settled(credit));
    }
    if close <= position.buy_strike {
        return Outcome::Loss(settled(-max_loss));
    }

    let intrinsic_loss = (position.sell_strike - close) * CONTRACT_MULTIPLIER;
    let profit = (credit - intrinsic_loss).max(-max_loss).min(credit);
    if profit >= Decimal::ZERO {
        Outcome::Win(settled(profit))
    } else {
        Outcome::Partial(settled(profit))
    }
}
