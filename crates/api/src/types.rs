//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use chrono::{DateTime, Utc};
use optagent_core::run::entity::{AnalysisSnapshot, Outcome, RunMeta, RunRecord};
use optagent_manager::settlement::SettlementSummary;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================
//  查询参数
// ============================================================

/// `GET /api/v1/analyze` 查询参数。
///
/// 数值参数按字符串接收：无法解析的覆盖值被忽略，而不是拒绝请求。
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyzeQuery {
    /// 证券代码，缺省为配置的默认标的
    pub ticker: Option<String>,
    /// 覆盖支撑拒绝次数阈值
    pub min_rejections: Option<String>,
}

impl AnalyzeQuery {
    pub fn min_rejections(&self) -> Option<u32> {
        self.min_rejections
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
    }
}

/// `GET /api/v1/runs` 查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RunsQuery {
    /// 返回条数，默认 50，范围 1..=200
    pub limit: Option<String>,
}

pub const DEFAULT_RUNS_LIMIT: u32 = 50;
pub const MAX_RUNS_LIMIT: u32 = 200;

impl RunsQuery {
    /// 非数字回退到默认值，数字钳制到 `[1, 200]`
    pub fn limit(&self) -> u32 {
        match self.limit.as_deref().map(|v| v.trim().parse::<i64>()) {
            Some(Ok(n)) => u32::try_from(n.clamp(1, i64::from(MAX_RUNS_LIMIT))).unwrap_or(DEFAULT_RUNS_LIMIT),
            _ => DEFAULT_RUNS_LIMIT,
        }
    }
}

// ============================================================
//  运行记录 DTO
// ============================================================

/// 运行记录 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunResponse {
    /// 记录 ID
    #[schema(example = "6f1c2a9e-3a53-4f55-9a59-2b7b1f1d8c10")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// 创建时间 (毫秒级时间戳)
    #[schema(example = 1792339200000_i64)]
    pub created_at_ms: i64,
    #[schema(example = "SPY")]
    pub ticker: String,
    /// OPEN / NO_TRADE / CLOSED
    #[schema(example = "OPEN")]
    pub status: String,
    /// 分析快照：行情指标、支撑位与交易建议
    #[schema(value_type = Object)]
    pub analysis: AnalysisSnapshot,
    /// 结算结果，NO_TRADE 记录为 null
    #[schema(value_type = Option<Object>)]
    pub outcome: Option<Outcome>,
    #[schema(value_type = Object)]
    pub meta: RunMeta,
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<RunRecord> for RunResponse {
    fn from(record: RunRecord) -> Self {
        Self {
            id: record.id.0,
            created_at: record.created_at,
            created_at_ms: record.created_at.timestamp_millis(),
            ticker: record.analysis.ticker.to_string(),
            status: record.status.as_str().to_string(),
            analysis: record.analysis,
            outcome: record.outcome,
            meta: record.meta,
            settled_at: record.settled_at,
        }
    }
}

/// 历史记录列表
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunListResponse {
    pub runs: Vec<RunResponse>,
}

/// 结算批次统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettleResponse {
    /// 本次检查的 OPEN 记录数
    #[schema(example = 3)]
    pub checked: usize,
    /// 本次完成结算的记录数
    #[schema(example = 1)]
    pub settled: usize,
}

impl From<SettlementSummary> for SettleResponse {
    fn from(summary: SettlementSummary) -> Self {
        Self {
            checked: summary.checked,
            settled: summary.settled,
        }
    }
}

// ============================================================
//  通用响应包装
// ============================================================

/// 通用 API 响应包装
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷
    pub data: T,
}

impl<T: ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// 失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub message: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: msg.into(),
        }
    }
}
