//! # 运行历史路由控制器

use axum::Json;
use axum::extract::{Query, State};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, RunListResponse, RunResponse, RunsQuery};

/// 列出最近的运行记录
///
/// 按创建时间倒序返回，最多 200 条。
#[utoipa::path(
    get,
    path = "/api/v1/runs",
    tag = "历史 (Runs)",
    params(RunsQuery),
    responses(
        (status = 200, description = "运行记录获取成功", body = ApiResponse<RunListResponse>)
    )
)]
pub async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<ApiResponse<RunListResponse>>, ApiError> {
    let records = state.analysis.recent_runs(query.limit()).await?;
    let runs = records.into_iter().map(RunResponse::from).collect();
    Ok(Json(ApiResponse::ok(RunListResponse { runs })))
}
