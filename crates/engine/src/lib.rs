//! # `optagent-engine` - 信号与交易决策引擎
//!
//! 纯计算层：趋势偏向、支撑位检测、到期日选择、交易建议与到期结算。
//! 所有函数均无 I/O，报价与行情由 `optagent-manager` 编排后传入。

pub mod bias;
pub mod expiry;
pub mod indicator;
pub mod recommend;
pub mod settlement;
pub mod support;
