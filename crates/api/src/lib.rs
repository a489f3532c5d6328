//! # `optagent-api` - HTTP API 网关
//!
//! 期权信号代理的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收分析、历史查询与结算触发请求
//! - 调用下层 `AnalysisService` 与 `SettlementService`
//! - 将领域模型转换为 DTO 返回给前端

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
