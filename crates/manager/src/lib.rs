//! # `optagent-manager` - 应用服务层
//!
//! 只依赖 `optagent-core` 中的端口抽象，具体实现通过构造函数注入。
//! - `analysis`: 单个标的的分析编排，产出一条运行记录
//! - `settlement`: 到期交易的批量结算

pub mod analysis;
pub mod settlement;
