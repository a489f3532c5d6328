use async_trait::async_trait;
use chrono::{DateTime, Utc};
use optagent_core::run::entity::{NewRun, Outcome, RunId, RunRecord, RunStatus};
use optagent_core::store::error::StoreError;
use optagent_core::store::port::RunStore;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

const DB_FILE: &str = "agent_runs.db";

/// # Summary
/// RunStore 的 SQLite 实现。
///
/// # Invariants
/// * 数据库文件位于 `<data_dir>/agent_runs.db`。
/// * 快照、结果与元数据以 JSON 文本存储；`seq` 自增列保证创建顺序。
/// * 关闭操作带 `status = 'OPEN'` 条件，重复或并发结算只有一次生效。
pub struct SqliteRunStore {
    pool: SqlitePool,
}

type RunRow = (
    String,
    DateTime<Utc>,
    String,
    String,
    Option<String>,
    String,
    Option<DateTime<Utc>>,
);

const SELECT_COLUMNS: &str =
    "SELECT id, created_at, status, analysis, outcome, meta, settled_at FROM agent_runs";

impl SqliteRunStore {
    /// # Summary
    /// 打开（或创建）数据目录下的运行记录库。
    ///
    /// # Logic
    /// 1. 确保数据目录存在。
    /// 2. 以 WAL 模式建立连接池。
    /// 3. 建表与索引（幂等）。
    ///
    /// # Arguments
    /// * `data_dir`: 数据根目录。
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir).map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        let db_path = data_dir.join(DB_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agent_runs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                created_at DATETIME NOT NULL,
                ticker TEXT NOT NULL,
                status TEXT NOT NULL,
                analysis TEXT NOT NULL,
                outcome TEXT,
                meta TEXT NOT NULL,
                settled_at DATETIME
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_agent_runs_status ON agent_runs (status)")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!(path = %db_path.display(), "Run store opened");
        Ok(Self { pool })
    }
}

fn row_to_record(row: RunRow) -> Result<RunRecord, StoreError> {
    let (id, created_at, status, analysis, outcome, meta, settled_at) = row;
    Ok(RunRecord {
        id: RunId(id),
        created_at,
        analysis: serde_json::from_str(&analysis)?,
        status: RunStatus::from_str(&status).map_err(StoreError::Serialization)?,
        outcome: outcome.as_deref().map(serde_json::from_str).transpose()?,
        meta: serde_json::from_str(&meta)?,
        settled_at,
    })
}

#[async_trait]
impl RunStore for SqliteRunStore {
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

        let outcome = record.outcome.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO agent_runs (id, created_at, ticker, status, analysis, outcome, meta, settled_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&record.id.0)
        .bind(record.created_at)
        .bind(record.analysis.ticker.as_str())
        .bind(record.status.as_str())
        .bind(serde_json::to_string(&record.analysis)?)
        .bind(outcome)
        .bind(serde_json::to_string(&record.meta)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(record)
    }

    async fn list_open(&self) -> Result<Vec<RunRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RunRow>(&format!(
            "{SELECT_COLUMNS} WHERE status = 'OPEN' ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn close_run(
        &self,
        id: &RunId,
        outcome: Outcome,
        settled_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE agent_runs SET status = 'CLOSED', outcome = ?, settled_at = ? WHERE id = ? AND status = 'OPEN'",
        )
        .bind(serde_json::to_string(&outcome)?)
        .bind(settled_at)
        .bind(&id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn latest(&self, limit: u32) -> Result<Vec<RunRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RunRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY seq DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_record).collect()
    }
}
