//! # `optagent-store` - 运行记录存储适配器
//!
//! - `sqlite`: 基于 `sqlx` 的 SQLite 持久化实现
//! - `memory`: 进程内实现，用于测试与无盘运行

pub mod memory;
pub mod sqlite;
