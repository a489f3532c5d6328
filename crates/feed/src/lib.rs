//! # `optagent-feed` - 外部数据适配器
//!
//! - `polygon`: Polygon.io 日线行情，实现 `MarketDataProvider`
//! - `tradier`: Tradier 期权链报价，实现 `QuoteProvider`
//! - `stub`: 固定报价，用于开发与测试
//! - `registry`: 按名称解析报价提供者

pub mod http;
pub mod polygon;
pub mod registry;
pub mod stub;
pub mod tradier;
