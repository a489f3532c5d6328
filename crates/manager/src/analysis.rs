use optagent_core::common::Ticker;
use optagent_core::common::time::TimeProvider;
use optagent_core::config::AgentConfig;
use optagent_core::decision::entity::TradePlan;
use optagent_core::market::error::MarketError;
use optagent_core::market::port::MarketDataProvider;
use optagent_core::quote::entity::{CallQuoteRequest, Quote, SpreadQuoteRequest};
use optagent_core::quote::error::QuoteError;
use optagent_core::quote::port::QuoteProvider;
use optagent_core::run::entity::{AnalysisSnapshot, NewRun, RunMeta, RunRecord, RunSource};
use optagent_core::store::error::StoreError;
use optagent_core::store::port::RunStore;
use optagent_engine::bias::trend_snapshot;
use optagent_engine::recommend::{DecisionInput, recommend, reject_unpriced};
use optagent_engine::support::detect_support;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// # Summary
/// 分析编排的错误类型。
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Market data error: {0}")]
    Market(#[from] MarketError),
    #[error("Quote provider error: {0}")]
    Quote(#[from] QuoteError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Insufficient data for {0}")]
    InsufficientData(String),
}

/// # Summary
/// 分析请求，字段均来自调用方，未经校验。
///
/// `min_rejections` 替换的是决策所需的拒绝次数阈值，观测到的拒绝次数始终来自 K 线。
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    // 证券代码，缺失或空白时使用默认标的
    pub ticker: Option<String>,
    // 覆盖本次决策的拒绝次数阈值（不是观测值）
    pub min_rejections: Option<u32>,
    pub source: RunSource,
}

impl AnalyzeRequest {
    pub fn http(ticker: Option<String>, min_rejections: Option<u32>) -> Self {
        Self {
            ticker,
            min_rejections,
            source: RunSource::Http,
        }
    }

    pub fn scheduled(ticker: &str) -> Self {
        Self {
            ticker: Some(ticker.to_string()),
            min_rejections: None,
            source: RunSource::Scheduled,
        }
    }
}

/// # Summary
/// 分析编排器：K 线 -> 趋势与支撑 -> 草稿 -> 实时报价 -> 最终决策 -> 持久化。
///
/// # Invariants
/// - 每次调用追加一条记录（计算幂等，持久化不幂等）。
/// - 持久化的交易建议一定是终态，未定价草稿会被降级为拒绝。
pub struct AnalysisService {
    config: Arc<AgentConfig>,
    market: Arc<dyn MarketDataProvider>,
    quotes: Arc<dyn QuoteProvider>,
    store: Arc<dyn RunStore>,
    clock: Arc<dyn TimeProvider>,
}

impl AnalysisService {
    /// # Summary
    /// 创建 AnalysisService 实例。
    ///
    /// # Arguments
    /// * `config` - 全局不可变配置。
    /// * `market` - 行情数据端口。
    /// * `quotes` - 启动时解析好的报价提供者。
    /// * `store` - 运行记录存储。
    /// * `clock` - 时间源。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的服务实例。
    pub fn new(
        config: Arc<AgentConfig>,
        market: Arc<dyn MarketDataProvider>,
        quotes: Arc<dyn QuoteProvider>,
        store: Arc<dyn RunStore>,
        clock: Arc<dyn TimeProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            market,
            quotes,
            store,
            clock,
        })
    }

    /// # Summary
    /// 分析一个标的并保存运行记录。
    ///
    /// # Logic
    /// 1. 规范化代码，拉取截至今天的日线。
    /// 2. 计算 EMA20/EMA50、趋势偏向与支撑位。
    /// 3. 以覆盖值或配置值作为拒绝次数阈值，生成草稿。
    /// 4. 草稿为 TRADE 时获取实时报价并重新决策；报价不可用则降级为拒绝。
    /// 5. 追加运行记录。
    ///
    /// # Returns
    /// * `Ok(RunRecord)` - 已持久化的记录。
    /// * `Err(AnalysisError)` - 行情失败、数据不足、报价配置错误或存储失败。
    pub async fn analyze(&self, req: AnalyzeRequest) -> Result<RunRecord, AnalysisError> {
        let signal = &self.config.signal;
        let risk = &self.config.risk;

        let ticker = Ticker::sanitize(req.ticker.as_deref(), &signal.default_ticker);
        let today = self.clock.today();

        let candles = self
            .market
            .fetch_daily_candles(&ticker, signal.candle_lookback_days, today)
            .await?;

        let trend = trend_snapshot(&candles)
            .ok_or_else(|| AnalysisError::InsufficientData(ticker.to_string()))?;
        let support = detect_support(&candles, signal.support_lookback, signal.support_tolerance_pct)
            .ok_or_else(|| AnalysisError::InsufficientData(ticker.to_string()))?;

        let input = DecisionInput {
            bias: trend.bias,
            support: support.support,
            rejection_count: support.rejection_count,
            min_rejections: req.min_rejections.unwrap_or(risk.min_support_rejections),
            close: Some(trend.close),
        };

        let draft = recommend(&input, risk, today, None);
        let quote = match draft.plan() {
            Some(plan) => Some(self.fetch_quote(&ticker, plan).await?),
            None => None,
        };
        let trade = match quote {
            None => draft,
            Some(Quote {
                value: Some(value), ..
            }) => recommend(&input, risk, today, Some(value)),
            Some(Quote { reason, legs, .. }) => {
                let reason = reason.unwrap_or_else(|| "no quote returned".to_string());
                warn!(%ticker, %reason, legs = legs.len(), "Live quote unavailable");
                reject_unpriced(draft, &reason, legs)
            }
        };

        let snapshot = AnalysisSnapshot {
            ticker: ticker.clone(),
            close: trend.close,
            ema20: trend.ema20,
            ema50: trend.ema50,
            bias: trend.bias,
            support: support.support,
            support_swing_date: support.swing_date,
            support_rejections: support.rejection_count,
            support_rejection_dates: support.rejection_dates,
            trade,
        };

        let record = self
            .store
            .append(NewRun::from_analysis(snapshot, self.meta(req.source)))
            .await?;

        info!(
            %ticker,
            run_id = %record.id,
            bias = %record.analysis.bias,
            status = record.status.as_str(),
            "Analysis recorded"
        );
        Ok(record)
    }

    /// # Summary
    /// 为草稿方案获取实时报价。
    ///
    /// # Logic
    /// 传输/解析失败降级为"无报价"；配置错误原样返回。
    async fn fetch_quote(&self, ticker: &Ticker, plan: &TradePlan) -> Result<Quote, QuoteError> {
        let result = match plan {
            TradePlan::BullPutSpread(p) => {
                self.quotes
                    .fetch_spread_credit(&SpreadQuoteRequest {
                        underlying: ticker.clone(),
                        exp: p.exp,
                        sell_strike: p.sell_strike,
                        buy_strike: p.buy_strike,
                    })
                    .await
            }
            TradePlan::LongCall(p) => {
                self.quotes
                    .fetch_call_premium(&CallQuoteRequest {
                        underlying: ticker.clone(),
                        exp: p.exp,
                        call_strike: p.call_strike,
                    })
                    .await
            }
        };

        match result {
            Ok(quote) => Ok(quote),
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                warn!(%ticker, error = %e, "Quote provider failed, treating as unavailable");
                Ok(Quote::unavailable(e.to_string(), Vec::new()))
            }
        }
    }

    fn meta(&self, source: RunSource) -> RunMeta {
        let provider = self.quotes.name().to_string();
        let tradier_env = (provider == "tradier").then(|| self.config.quote.tradier_env.clone());
        RunMeta {
            quote_provider: provider,
            strategy: self.config.risk.strategy,
            tradier_env,
            source,
        }
    }

    /// 最近的运行记录
    pub async fn recent_runs(&self, limit: u32) -> Result<Vec<RunRecord>, AnalysisError> {
        Ok(self.store.latest(limit).await?)
    }
}
