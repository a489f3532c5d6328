use crate::quote::entity::LegQuote;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 趋势偏向，收盘价相对 EMA20 / EMA50 的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendBias {
    // 收盘价高于两条均线
    Bullish,
    // 收盘价低于两条均线
    Bearish,
    // 均线之间或相等
    #[serde(rename = "No Trade")]
    NoTrade,
}

impl std::fmt::Display for TrendBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendBias::Bullish => write!(f, "Bullish"),
            TrendBias::Bearish => write!(f, "Bearish"),
            TrendBias::NoTrade => write!(f, "No Trade"),
        }
    }
}

/// # Summary
/// 支撑位检测结果。
///
/// # Invariants
/// - `support` 等于回看窗口内某一根 K 线的最低价（保留两位小数）。
/// - `rejection_dates` 是窗口日期的子集，按窗口顺序排列，长度等于 `rejection_count`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportInfo {
    pub support: Decimal,
    pub swing_date: NaiveDate,
    pub rejection_count: u32,
    pub rejection_dates: Vec<NaiveDate>,
}

/// # Summary
/// 交易结构变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    // 牛市看跌信用价差
    #[default]
    BullPutSpread,
    // 买入看涨
    LongCall,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::BullPutSpread => write!(f, "bull_put_spread"),
            StrategyKind::LongCall => write!(f, "long_call"),
        }
    }
}

/// # Summary
/// 到期日选择策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    // 今天（含）之后的第一个周五
    NextFriday,
    // today + min_dte（含）之后的第一个周五
    #[default]
    Range,
}

/// # Summary
/// 离场计划。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitPlan {
    // 信用价差持有到期，由结算流程计算结果
    HoldToExpiration,
    // 按入场权利金百分比止盈止损
    PctOfEntry {
        take_profit_pct: Decimal,
        stop_loss_pct: Decimal,
        take_profit_at: Option<Decimal>,
        stop_loss_at: Option<Decimal>,
    },
}

/// # Summary
/// 牛市看跌价差方案。
///
/// # Invariants
/// - `sell_strike > buy_strike`，两者之差等于配置的价差宽度。
/// - `credit` 为每股净收入；`max_loss = (width - credit) * 100`，均在报价到位后才有值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadPlan {
    pub sell_strike: Decimal,
    pub buy_strike: Decimal,
    pub exp: NaiveDate,
    pub credit: Option<Decimal>,
    pub max_loss: Option<Decimal>,
    pub exit: ExitPlan,
    pub note: Option<String>,
}

impl SpreadPlan {
    pub fn width(&self) -> Decimal {
        self.sell_strike - self.buy_strike
    }
}

/// # Summary
/// 买入看涨方案。
///
/// # Invariants
/// - `premium` 为每张合约权利金（美元），`max_loss == premium`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongCallPlan {
    pub call_strike: Decimal,
    pub exp: NaiveDate,
    pub premium: Option<Decimal>,
    pub max_loss: Option<Decimal>,
    pub exit: ExitPlan,
    pub note: Option<String>,
}

/// # Summary
/// 具体交易方案，按 `strategy` 字段区分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradePlan {
    BullPutSpread(SpreadPlan),
    LongCall(LongCallPlan),
}

impl TradePlan {
    pub fn kind(&self) -> StrategyKind {
        match self {
            TradePlan::BullPutSpread(_) => StrategyKind::BullPutSpread,
            TradePlan::LongCall(_) => StrategyKind::LongCall,
        }
    }

    pub fn exp(&self) -> NaiveDate {
        match self {
            TradePlan::BullPutSpread(p) => p.exp,
            TradePlan::LongCall(p) => p.exp,
        }
    }

    /// 方案是否已经带上实时报价
    pub fn is_priced(&self) -> bool {
        match self {
            TradePlan::BullPutSpread(p) => p.credit.is_some(),
            TradePlan::LongCall(p) => p.premium.is_some(),
        }
    }
}

/// # Summary
/// 拒绝交易的原因；因风控上限被拒时附带被否决的方案数字。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub proposed: Option<TradePlan>,
    // 报价不可用时的盘口快照
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<LegQuote>,
}

/// # Summary
/// 交易建议，决策引擎的唯一输出。
///
/// # Invariants
/// - `Trade` 且未定价的方案只是草稿，不能作为终态持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeProposal {
    Trade(TradePlan),
    NoTrade(Rejection),
}

impl TradeProposal {
    /// 构造一个不附带方案的拒绝
    pub fn no_trade(reason: impl Into<String>) -> Self {
        TradeProposal::NoTrade(Rejection {
            reason: reason.into(),
            proposed: None,
            legs: Vec::new(),
        })
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TradeProposal::Trade(_))
    }

    /// 是否为可持久化的终态（拒绝，或已定价的交易）
    pub fn is_final(&self) -> bool {
        match self {
            TradeProposal::Trade(plan) => plan.is_priced(),
            TradeProposal::NoTrade(_) => true,
        }
    }

    pub fn plan(&self) -> Option<&TradePlan> {
        match self {
            TradeProposal::Trade(plan) => Some(plan),
            TradeProposal::NoTrade(_) => None,
        }
    }
}
