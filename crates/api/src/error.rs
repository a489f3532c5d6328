//! # API 统一错误处理
//!
//! 将下层服务的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use optagent_core::market::error::MarketError;
use optagent_manager::analysis::AnalysisError;
use optagent_manager::settlement::SettlementError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 标的没有可用数据 (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 上游行情或报价服务失败 (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 下层业务错误 (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream failure");
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!(error = %msg, "Internal service error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse::from_msg(message))).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InsufficientData(ticker) => {
                ApiError::NotFound(format!("No candle data for {ticker}"))
            }
            AnalysisError::Market(e @ (MarketError::Network(_) | MarketError::Parse(_))) => {
                ApiError::Upstream(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::Market(e @ (MarketError::Network(_) | MarketError::Parse(_))) => {
                ApiError::Upstream(e.to_string())
            }
            // 行情配置错误（缺少 API Key 等）属于部署问题，按内部错误处理
            other => ApiError::Internal(other.to_string()),
        }
    }
}
