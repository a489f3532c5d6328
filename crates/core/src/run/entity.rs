use crate::common::Ticker;
use crate::decision::entity::{StrategyKind, TradeProposal, TrendBias};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 运行记录的唯一标识。
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunId(pub String);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// # Summary
/// 运行记录的生命周期状态。
///
/// # Invariants
/// - 只允许一次迁移：`Open -> Closed`，由结算流程完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Open,
    NoTrade,
    Closed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Open => "OPEN",
            RunStatus::NoTrade => "NO_TRADE",
            RunStatus::Closed => "CLOSED",
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(RunStatus::Open),
            "NO_TRADE" => Ok(RunStatus::NoTrade),
            "CLOSED" => Ok(RunStatus::Closed),
            _ => Err(format!("Unknown RunStatus: {}", s)),
        }
    }
}

/// # Summary
/// 运行记录的触发来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSource {
    Http,
    Scheduled,
}

/// # Summary
/// 一次分析的完整快照：指标、支撑位与交易建议。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub ticker: Ticker,
    pub close: Decimal,
    pub ema20: Decimal,
    pub ema50: Decimal,
    pub bias: TrendBias,
    pub support: Decimal,
    pub support_swing_date: NaiveDate,
    pub support_rejections: u32,
    pub support_rejection_dates: Vec<NaiveDate>,
    pub trade: TradeProposal,
}

/// # Summary
/// 运行时元数据，便于事后追溯报价来源。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub quote_provider: String,
    pub strategy: StrategyKind,
    pub tradier_env: Option<String>,
    pub source: RunSource,
}

/// # Summary
/// 到期结算的数值结果（单位：每张合约美元）。
///
/// # Invariants
/// - `-max_loss <= profit <= credit`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub exp: NaiveDate,
    pub underlying_close_at_exp: Decimal,
    pub profit: Decimal,
    pub credit: Decimal,
    pub max_loss: Decimal,
}

/// # Summary
/// 交易结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    // 已开仓，等待到期
    Pending,
    Win(Settlement),
    Loss(Settlement),
    Partial(Settlement),
    // 到期日收盘价不可得（节假日/数据缺口）
    Unknown { exp: NaiveDate, reason: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "PENDING",
            Outcome::Win(_) => "WIN",
            Outcome::Loss(_) => "LOSS",
            Outcome::Partial(_) => "PARTIAL",
            Outcome::Unknown { .. } => "UNKNOWN",
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match self {
            Outcome::Win(s) | Outcome::Loss(s) | Outcome::Partial(s) => Some(s),
            Outcome::Pending | Outcome::Unknown { .. } => None,
        }
    }
}

/// # Summary
/// 待追加的运行记录（id 与创建时间由存储层分配）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRun {
    pub analysis: AnalysisSnapshot,
    pub status: RunStatus,
    pub outcome: Option<Outcome>,
    pub meta: RunMeta,
}

impl NewRun {
    /// # Summary
    /// 由分析快照推导初始状态。
    ///
    /// # Logic
    /// 1. 交易建议为 `Trade` 时状态为 `Open`，结果为 `Pending`。
    /// 2. 否则状态为 `NoTrade`，结果为空。
    pub fn from_analysis(analysis: AnalysisSnapshot, meta: RunMeta) -> Self {
        let (status, outcome) = if analysis.trade.is_trade() {
            (RunStatus::Open, Some(Outcome::Pending))
        } else {
            (RunStatus::NoTrade, None)
        };
        Self {
            analysis,
            status,
            outcome,
            meta,
        }
    }
}

/// # Summary
/// 持久化的运行记录聚合根。
///
/// # Invariants
/// - 由编排器创建一次；结算流程最多修改一次（`OPEN -> CLOSED`）；核心从不删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub analysis: AnalysisSnapshot,
    pub status: RunStatus,
    pub outcome: Option<Outcome>,
    pub meta: RunMeta,
    pub settled_at: Option<DateTime<Utc>>,
}
