//! 后台定时任务：周期结算与可选的观察列表分析。

use optagent_core::config::ScheduleConfig;
use optagent_manager::analysis::{AnalysisService, AnalyzeRequest};
use optagent_manager::settlement::SettlementService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

/// # Summary
/// 按配置启动后台任务。
///
/// # Logic
/// - `settle_interval_secs > 0` 时周期执行结算批次。
/// - `analyze_interval_secs > 0` 且观察列表非空时周期分析每个标的（`source = scheduled`）。
///
/// # Returns
/// 已启动任务的句柄，停机时由调用方 abort。
pub fn spawn(
    config: &ScheduleConfig,
    analysis: Arc<AnalysisService>,
    settlement: Arc<SettlementService>,
) -> Vec<JoinHandle<()>> {
    let mut tasks = Vec::new();

    if config.settle_interval_secs > 0 {
        let period = Duration::from_secs(config.settle_interval_secs);
        info!(every_secs = config.settle_interval_secs, "Scheduling settlement passes");
        tasks.push(tokio::spawn(settlement_loop(settlement, period)));
    }

    if config.analyze_interval_secs > 0 && !config.watch_tickers.is_empty() {
        let period = Duration::from_secs(config.analyze_interval_secs);
        info!(
            every_secs = config.analyze_interval_secs,
            tickers = ?config.watch_tickers,
            "Scheduling watch list analysis"
        );
        tasks.push(tokio::spawn(analysis_loop(
            analysis,
            config.watch_tickers.clone(),
            period,
        )));
    }

    tasks
}

async fn settlement_loop(service: Arc<SettlementService>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = service.settle_open_trades().await {
            error!(error = %e, "Scheduled settlement pass failed");
        }
    }
}

async fn analysis_loop(service: Arc<AnalysisService>, tickers: Vec<String>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        for symbol in &tickers {
            if let Err(e) = service.analyze(AnalyzeRequest::scheduled(symbol)).await {
                warn!(ticker = %symbol, error = %e, "Scheduled analysis failed");
            }
        }
    }
}
