//! # `optagent-core` - 领域核心
//!
//! 期权交易代理的实体、错误类型、端口 (Port) 与配置。
//! 本 crate 不包含任何 I/O 实现，行情、报价与存储适配器由下游 crate 提供。
//!
//! ## 模块划分
//! - `market`: 日线 K 线与行情数据端口
//! - `quote`: 期权报价请求/结果与报价端口
//! - `decision`: 趋势偏向、支撑位与交易建议
//! - `run`: 运行记录及结算结果
//! - `store`: 运行记录存储端口

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod quote {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod decision {
    pub mod entity;
}

pub mod run {
    pub mod entity;
}

pub mod store {
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod test_utils;
