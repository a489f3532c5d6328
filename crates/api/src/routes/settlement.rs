//! # 结算路由控制器

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ApiResponse, SettleResponse};

/// 立即执行一次到期结算
///
/// 已到期的 OPEN 价差按到期日收盘价结算；可重复调用。
#[utoipa::path(
    post,
    path = "/api/v1/settle",
    tag = "结算 (Settlement)",
    responses(
        (status = 200, description = "结算批次完成", body = ApiResponse<SettleResponse>),
        (status = 500, description = "行情配置错误或存储失败", body = ApiErrorResponse)
    )
)]
pub async fn settle(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SettleResponse>>, ApiError> {
    let summary = state.settlement.settle_open_trades().await?;
    Ok(Json(ApiResponse::ok(SettleResponse::from(summary))))
}
