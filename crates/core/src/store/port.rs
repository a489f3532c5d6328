use super::error::StoreError;
use crate::run::entity::{NewRun, Outcome, RunId, RunRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// # Summary
/// 运行记录存储接口。核心只依赖该能力抽象，不耦合具体数据库。
///
/// # Invariants
/// - 追加写：记录一旦创建不会被删除。
/// - `close_run` 必须是以当前状态为条件的原子更新，竞争的两次结算不能重复计入。
#[async_trait]
pub trait RunStore: Send + Sync {
    /// # Summary
    /// 追加一条运行记录。
    ///
    /// # Logic
    /// 1. 分配唯一 ID 与创建时间。
    /// 2. 写入存储。
    ///
    /// # Arguments
    /// * `run`: 待追加的记录。
    ///
    /// # Returns
    /// 成功返回带 ID 的完整记录。
    async fn append(&self, run: NewRun) -> Result<RunRecord, StoreError>;

    /// # Summary
    /// 查询所有状态为 `OPEN` 的记录。
    ///
    /// # Returns
    /// 按创建时间升序的记录列表。
    async fn list_open(&self) -> Result<Vec<RunRecord>, StoreError>;

    /// # Summary
    /// 以 `status = OPEN` 为条件，将记录迁移为 `CLOSED` 并写入结果。
    ///
    /// # Arguments
    /// * `id`: 记录 ID。
    /// * `outcome`: 结算结果。
    /// * `settled_at`: 结算时间。
    ///
    /// # Returns
    /// * `Ok(true)` - 本次调用完成了迁移。
    /// * `Ok(false)` - 记录不存在或已不是 `OPEN`（被并发结算抢先）。
    async fn close_run(
        &self,
        id: &RunId,
        outcome: Outcome,
        settled_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// # Summary
    /// 按创建时间倒序获取最近 `limit` 条记录，用于历史展示。
    async fn latest(&self, limit: u32) -> Result<Vec<RunRecord>, StoreError>;
}
