//! 交易建议：趋势 + 支撑 + 报价 + 风控上限 -> 交易方案或拒绝原因。

use crate::expiry::select_expiry;
use crate::indicator::{dollars, round_half_up};
use chrono::NaiveDate;
use optagent_core::config::RiskConfig;
use optagent_core::decision::entity::{
    ExitPlan, LongCallPlan, Rejection, SpreadPlan, StrategyKind, TradePlan, TradeProposal,
    TrendBias,
};
use optagent_core::quote::entity::LegQuote;
use rust_decimal::Decimal;

const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// 决策输入
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInput {
    pub bias: TrendBias,
    // 已四舍五入到两位小数的支撑位
    pub support: Decimal,
    pub rejection_count: u32,
    // 本次决策使用的拒绝次数阈值
    pub min_rejections: u32,
    // 最新收盘价，用于看涨期权选择平值行权价
    pub close: Option<Decimal>,
}

/// # Summary
/// 交易建议引擎（纯函数，无 I/O）。
///
/// # Logic
/// 依次短路判断：
/// 1. 偏向不是 Bullish -> 拒绝。
/// 2. 拒绝次数不足阈值 -> 拒绝。
/// 3. 选择到期日与行权价。
/// 4. 未提供报价 -> 返回未定价草稿。
/// 5. 提供报价 -> 按风控上限给出最终方案或带 `proposed` 的拒绝。
///
/// # Arguments
/// * `input`: 趋势与支撑信息。
/// * `risk`: 风控配置，其中 `strategy` 决定交易结构。
/// * `today`: 当前日期，用于计算到期日。
/// * `quote`: 价差为每股净收入，看涨为每张合约权利金。
pub fn recommend(
    input: &DecisionInput,
    risk: &RiskConfig,
    today: NaiveDate,
    quote: Option<Decimal>,
) -> TradeProposal {
    if input.bias != TrendBias::Bullish {
        return TradeProposal::no_trade(format!("Bias is {}", input.bias));
    }

    if input.rejection_count < input.min_rejections {
        return TradeProposal::no_trade(format!(
            "Support not confirmed (need >= {} rejections)",
            input.min_rejections
        ));
    }

    let exp = select_expiry(risk.expiry_policy, today, risk.min_dte, risk.max_dte);

    match risk.strategy {
        StrategyKind::BullPutSpread => recommend_spread(input, risk, exp, quote),
        StrategyKind::LongCall => recommend_long_call(input, risk, exp, quote),
    }
}

fn recommend_spread(
    input: &DecisionInput,
    risk: &RiskConfig,
    exp: NaiveDate,
    credit: Option<Decimal>,
) -> TradeProposal {
    let sell_strike = input.support.floor();
    let buy_strike = sell_strike - risk.spread_width;

    let Some(credit) = credit else {
        return TradeProposal::Trade(TradePlan::BullPutSpread(SpreadPlan {
            sell_strike,
            buy_strike,
            exp,
            credit: None,
            max_loss: None,
            exit: ExitPlan::HoldToExpiration,
            note: Some("Credit/maxLoss pending live options data".to_string()),
        }));
    };

    // 先取整净收入，保证保存的 max_loss = (width - credit) * 100 且与上限比较的是同一个值
    let credit = round_half_up(credit, 2);
    let max_loss = round_half_up((risk.spread_width - credit) * CONTRACT_MULTIPLIER, 0);
    let plan = TradePlan::BullPutSpread(SpreadPlan {
        sell_strike,
        buy_strike,
        exp,
        credit: Some(credit),
        max_loss: Some(max_loss),
        exit: ExitPlan::HoldToExpiration,
        note: None,
    });

    if max_loss > risk.max_loss_cap {
        return TradeProposal::NoTrade(Rejection {
            reason: format!(
                "Max loss ${} exceeds cap ${}",
                dollars(max_loss),
                risk.max_loss_cap.normalize()
            ),
            proposed: Some(plan),
            legs: Vec::new(),
        });
    }

    TradeProposal::Trade(plan)
}

fn recommend_long_call(
    input: &DecisionInput,
    risk: &RiskConfig,
    exp: NaiveDate,
    premium: Option<Decimal>,
) -> TradeProposal {
    let reference = input.close.unwrap_or(input.support);
    let call_strike = round_half_up(reference, 0);

    let Some(premium) = premium else {
        return TradeProposal::Trade(TradePlan::LongCall(LongCallPlan {
            call_strike,
            exp,
            premium: None,
            max_loss: None,
            exit: ExitPlan::PctOfEntry {
                take_profit_pct: risk.take_profit_pct,
                stop_loss_pct: risk.stop_loss_pct,
                take_profit_at: None,
                stop_loss_at: None,
            },
            note: Some("Premium/maxLoss pending live options data".to_string()),
        }));
    };

    if premium <= Decimal::ZERO {
        return TradeProposal::no_trade("Invalid premium returned");
    }

    if premium > risk.max_premium_cap {
        return TradeProposal::NoTrade(Rejection {
            reason: format!(
                "Premium ${} exceeds cap ${}",
                dollars(premium),
                risk.max_premium_cap.normalize()
            ),
            proposed: Some(TradePlan::LongCall(LongCallPlan {
                call_strike,
                exp,
                premium: Some(premium),
                max_loss: Some(premium),
                exit: ExitPlan::PctOfEntry {
                    take_profit_pct: risk.take_profit_pct,
                    stop_loss_pct: risk.stop_loss_pct,
                    take_profit_at: None,
                    stop_loss_at: None,
                },
                note: None,
            })),
            legs: Vec::new(),
        });
    }

    let take_profit_at = round_half_up(premium * (Decimal::ONE + risk.take_profit_pct), 0);
    let stop_loss_at = round_half_up(premium * (Decimal::ONE - risk.stop_loss_pct), 0);
    let rounded = round_half_up(premium, 0);

    TradeProposal::Trade(TradePlan::LongCall(LongCallPlan {
        call_strike,
        exp,
        premium: Some(rounded),
        max_loss: Some(rounded),
        exit: ExitPlan::PctOfEntry {
            take_profit_pct: risk.take_profit_pct,
            stop_loss_pct: risk.stop_loss_pct,
            take_profit_at: Some(take_profit_at),
            stop_loss_at: Some(stop_loss_at),
        },
        note: None,
    }))
}

/// # Summary
/// 把无法定价的草稿降级为拒绝，保证未定价草稿不会作为终态保存。
///
/// # Arguments
/// * `draft`: `recommend` 在无报价时的输出。
/// * `reason`: 报价不可用的原因。
/// * `legs`: 报价提供者返回的盘口快照，随拒绝一起保存。
pub fn reject_unpriced(draft: TradeProposal, reason: &str, legs: Vec<LegQuote>) -> TradeProposal {
    match draft {
        TradeProposal::Trade(plan) if !plan.is_priced() => TradeProposal::NoTrade(Rejection {
            reason: format!("Live quote unavailable: {reason}"),
            proposed: Some(plan),
            legs,
        }),
        other => other,
    }
}
