use futures::stream::{self, StreamExt, TryStreamExt};
use optagent_core::common::time::TimeProvider;
use optagent_core::market::error::MarketError;
use optagent_core::market::port::MarketDataProvider;
use optagent_core::run::entity::RunRecord;
use optagent_core::store::error::StoreError;
use optagent_core::store::port::RunStore;
use optagent_engine::settlement::{SpreadPosition, settle_spread};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// # Summary
/// 结算批次的错误类型。单条记录的临时失败不会出现在这里，配置错误会终止整个批次。
#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Market data error: {0}")]
    Market(#[from] MarketError),
}

/// 一次结算批次的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SettlementSummary {
    // 本次读到的 OPEN 记录数
    pub checked: usize,
    // 本次完成 OPEN -> CLOSED 的记录数
    pub settled: usize,
}

/// # Summary
/// 到期结算服务。
///
/// # Invariants
/// - 可重复执行：已关闭的记录不会再次结算（存储层条件更新保证）。
/// - 单条记录的临时失败（网络/解析错误、存储错误）只记录日志，不中断批次。
/// - 行情配置错误会终止批次并返回 `SettlementError::Market`。
pub struct SettlementService {
    market: Arc<dyn MarketDataProvider>,
    store: Arc<dyn RunStore>,
    clock: Arc<dyn TimeProvider>,
    // 并发结算的记录数上限
    concurrency: usize,
}

impl SettlementService {
    /// # Summary
    /// 创建 SettlementService 实例。
    ///
    /// # Arguments
    /// * `market` - 行情数据端口，用于查询到期日收盘价。
    /// * `store` - 运行记录存储。
    /// * `clock` - 时间源。
    /// * `concurrency` - 并发上限，0 按 1 处理。
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        store: Arc<dyn RunStore>,
        clock: Arc<dyn TimeProvider>,
        concurrency: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            market,
            store,
            clock,
            concurrency: concurrency.max(1),
        })
    }

    /// # Summary
    /// 结算所有已到期的 OPEN 交易。
    ///
    /// # Logic
    /// 1. 读取全部 OPEN 记录。
    /// 2. 有界并发地逐条结算。
    /// 3. 汇总 `{checked, settled}`。
    ///
    /// # Returns
    /// 无法读取 OPEN 列表或行情配置错误（如缺少 API Key）时返回错误。
    pub async fn settle_open_trades(&self) -> Result<SettlementSummary, SettlementError> {
        let open = self.store.list_open().await?;
        let checked = open.len();

        let settled = stream::iter(open)
            .map(|record| self.settle_one(record))
            .buffer_unordered(self.concurrency)
            .try_fold(0usize, |acc, done| async move { Ok(acc + usize::from(done)) })
            .await?;

        info!(checked, settled, "Settlement pass finished");
        Ok(SettlementSummary { checked, settled })
    }

    /// # Summary
    /// 结算单条记录。
    ///
    /// # Logic
    /// 1. 非价差或缺少净收入的记录跳过。
    /// 2. 未到期跳过。
    /// 3. 查询到期日收盘价；网络或解析错误保持 OPEN，留给下一轮；配置错误向上返回。
    /// 4. 计算结果并以 OPEN 为条件关闭。
    ///
    /// # Returns
    /// 本次调用是否完成了 OPEN -> CLOSED。
    async fn settle_one(&self, record: RunRecord) -> Result<bool, MarketError> {
        let Some(position) = SpreadPosition::from_record(&record) else {
            debug!(run_id = %record.id, "Skipping record without a priced spread");
            return Ok(false);
        };

        if !position.is_due(self.clock.today()) {
            return Ok(false);
        }

        let close = match self.market.fetch_close_on(&position.ticker, position.exp).await {
            Ok(close) => close,
            Err(e @ MarketError::Config(_)) => {
                error!(run_id = %record.id, error = %e, "Market data misconfigured, aborting settlement");
                return Err(e);
            }
            Err(e) => {
                warn!(run_id = %record.id, ticker = %position.ticker, error = %e, "Close lookup failed, record stays OPEN");
                return Ok(false);
            }
        };

        let outcome = settle_spread(&position, close);
        let label = outcome.label();

        match self.store.close_run(&record.id, outcome, self.clock.now()).await {
            Ok(true) => {
                info!(run_id = %record.id, ticker = %position.ticker, outcome = label, "Trade settled");
                Ok(true)
            }
            Ok(false) => {
                debug!(run_id = %record.id, "Record already settled by another pass");
                Ok(false)
            }
            Err(e) => {
                error!(run_id = %record.id, error = %e, "Failed to persist settlement");
                Ok(false)
            }
        }
    }
}
