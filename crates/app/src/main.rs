mod logging;
mod scheduler;
mod settings;

use std::path::Path;
use std::sync::Arc;

use optagent_api::server::{AppState, start_server};
use optagent_core::common::time::{RealTimeProvider, TimeProvider};
use optagent_core::market::port::MarketDataProvider;
use optagent_core::store::port::RunStore;
use optagent_feed::polygon::PolygonProvider;
use optagent_feed::registry::resolve_quote_provider;
use optagent_manager::analysis::AnalysisService;
use optagent_manager::settlement::SettlementService;
use optagent_store::sqlite::SqliteRunStore;
use tracing::info;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 `Arc<dyn Trait>` 注入到应用服务。
///
/// # Logic
/// 1. 读取 `.env` 与配置，初始化全局日志。
/// 2. 实例化基础设施层（Polygon 行情、报价提供者、SQLite 存储）。
/// 3. 构造应用服务层（AnalysisService、SettlementService）。
/// 4. 启动后台定时任务与 HTTP 服务，收到 Ctrl-C 后优雅退出。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与配置
    dotenvy::dotenv().ok();
    let config = Arc::new(settings::load()?);
    let _log_guard = logging::init(&config.log)?;
    info!("OptAgent starting...");

    // 2. 实例化基础设施层
    let market: Arc<dyn MarketDataProvider> = Arc::new(PolygonProvider::new(&config.market)?);
    let quotes = resolve_quote_provider(&config.quote)?;
    let store: Arc<dyn RunStore> =
        Arc::new(SqliteRunStore::open(Path::new(&config.database.data_dir)).await?);
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    info!(
        quote_provider = quotes.name(),
        strategy = %config.risk.strategy,
        data_dir = %config.database.data_dir,
        "Infrastructure ready"
    );

    // 3. 构造应用服务层
    let analysis = AnalysisService::new(
        config.clone(),
        market.clone(),
        quotes,
        store.clone(),
        clock.clone(),
    );
    let settlement = SettlementService::new(
        market,
        store,
        clock,
        config.schedule.settle_concurrency,
    );

    // 4. 后台任务与 HTTP 服务
    let tasks = scheduler::spawn(&config.schedule, analysis.clone(), settlement.clone());

    let state = AppState {
        analysis,
        settlement,
    };
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr, shutdown_signal()).await?;

    for task in tasks {
        task.abort();
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Exiting...");
}
