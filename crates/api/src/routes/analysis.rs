//! # 分析路由控制器
//!
//! 实现 `/api/v1/analyze`：对一个标的执行完整分析并持久化运行记录。

use axum::Json;
use axum::extract::{Query, State};
use optagent_manager::analysis::AnalyzeRequest;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{AnalyzeQuery, ApiErrorResponse, ApiResponse, RunResponse};

/// 分析一个标的
///
/// 拉取日线、计算趋势与支撑、获取实时报价并给出最终决策。
/// 每次调用都会追加一条运行记录。
#[utoipa::path(
    get,
    path = "/api/v1/analyze",
    tag = "分析 (Analysis)",
    params(AnalyzeQuery),
    responses(
        (status = 200, description = "分析完成并已保存", body = ApiResponse<RunResponse>),
        (status = 404, description = "标的没有日线数据", body = ApiErrorResponse),
        (status = 502, description = "行情服务失败", body = ApiErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<ApiResponse<RunResponse>>, ApiError> {
    let min_rejections = query.min_rejections();
    let record = state
        .analysis
        .analyze(AnalyzeRequest::http(query.ticker, min_rejections))
        .await?;
    Ok(Json(ApiResponse::ok(RunResponse::from(record))))
}
