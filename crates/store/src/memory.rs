use async_trait::async_trait;
use chrono::{DateTime, Utc};
use optagent_core::run::entity::{NewRun, Outcome, RunId, RunRecord, RunStatus};
use optagent_core::store::error::StoreError;
use optagent_core::store::port::RunStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// # Summary
/// 基于内存的运行记录仓储，按追加顺序保存。
///
/// 写锁内完成状态检查与修改，`close_run` 与 SQLite 实现具有相同的条件语义。
pub struct MemoryRunStore {
    runs: Arc<RwLock<Vec<RunRecord>>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn append(&self, run: NewRun) -> Result<RunRecord, StoreError> {
        let record = RunRecord {
            id: RunId(Uuid::new_v4().to_string()),
            created_at: Utc::now(),
            analysis: run.analysis,
            status: run.status,
            outcome: run.outcome,
            meta: run.meta,
            settled_at: None,
        };
        self.runs.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_open(&self) -> Result<Vec<RunRecord>, StoreError> {
        let guard = self.runs.read().await;
        Ok(guard
            .iter()
            .filter(|r| r.status == RunStatus::Open)
            .cloned()
            .collect())
    }

    async fn close_run(
        &self,
        id: &RunId,
        outcome: Outcome,
        settled_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut guard = self.runs.write().await;
        match guard
            .iter_mut()
            .find(|r| r.id == *id && r.status == RunStatus::Open)
        {
            Some(run) => {
                run.status = RunStatus::Closed;
                run.outcome = Some(outcome);
                run.settled_at = Some(settled_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn latest(&self, limit: u32) -> Result<Vec<RunRecord>, StoreError> {
        let guard = self.runs.read().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}
