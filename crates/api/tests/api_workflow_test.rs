use chrono::{Duration, NaiveDate, TimeZone, Utc};
use optagent_api::server::{AppState, serve};
use optagent_api::types::{ApiErrorResponse, ApiResponse, RunListResponse, RunResponse, SettleResponse};
use optagent_core::common::time::FakeClockProvider;
use optagent_core::config::AgentConfig;
use optagent_core::market::entity::Candle;
use optagent_core::store::port::RunStore;
use optagent_core::test_utils::{FixedQuoteProvider, StaticMarketData, candle};
use optagent_manager::analysis::AnalysisService;
use optagent_manager::settlement::SettlementService;
use optagent_store::sqlite::SqliteRunStore;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::net::TcpListener;

struct TestServer {
    addr: String,
    market: Arc<StaticMarketData>,
    clock: Arc<FakeClockProvider>,
    _tmp_dir: tempfile::TempDir,
}

fn bullish_candles() -> Vec<Candle> {
    let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
    let mut candles: Vec<_> = (0..60i64)
        .map(|i| {
            let base = Decimal::from(60 + i);
            candle(start + Duration::days(i), base, base + dec!(1), base - dec!(0.5), base + dec!(0.5))
        })
        .collect();
    let n = candles.len();
    for (offset, low) in [(5, dec!(120.1)), (4, dec!(120)), (3, dec!(120.2)), (2, dec!(120.5)), (1, dec!(121))] {
        let c = &mut candles[n - offset];
        c.low = low;
        c.close = dec!(122);
    }
    candles
}

fn client() -> reqwest::Client {
    // reqwest 未启用内置加密后端，需先安装进程级 provider
    rustls::crypto::ring::default_provider().install_default().ok();
    reqwest::Client::new()
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server() -> TestServer {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: Arc<dyn RunStore> = Arc::new(SqliteRunStore::open(tmp_dir.path()).await.unwrap());

    let market = Arc::new(StaticMarketData::new());
    market.set_candles("SPY", bullish_candles()).await;

    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap(),
    ));
    let quotes = Arc::new(FixedQuoteProvider::priced(dec!(0.65)));

    let analysis = AnalysisService::new(
        Arc::new(AgentConfig::default()),
        market.clone(),
        quotes,
        store.clone(),
        clock.clone(),
    );
    let settlement = SettlementService::new(market.clone(), store, clock.clone(), 2);
    let state = AppState {
        analysis,
        settlement,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        serve(listener, state, std::future::pending()).await.unwrap();
    });

    TestServer {
        addr: format!("http://127.0.0.1:{port}"),
        market,
        clock,
        _tmp_dir: tmp_dir,
    }
}

#[tokio::test]
async fn test_analyze_list_and_settle_workflow() -> anyhow::Result<()> {
    let server = spawn_test_server().await;
    let client = client();

    // 1. 分析：成交建议被保存为 OPEN
    let resp = client
        .get(format!("{}/api/v1/analyze", server.addr))
        .query(&[("ticker", "spy")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<RunResponse> = resp.json().await?;
    assert!(body.success);
    let run = body.data;
    assert_eq!(run.ticker, "SPY");
    assert_eq!(run.status, "OPEN");
    assert_eq!(run.created_at_ms, run.created_at.timestamp_millis());

    // 2. 覆盖阈值导致 NO_TRADE
    let resp = client
        .get(format!("{}/api/v1/analyze", server.addr))
        .query(&[("min_rejections", "9")])
        .send()
        .await?;
    let body: ApiResponse<RunResponse> = resp.json().await?;
    assert_eq!(body.data.status, "NO_TRADE");
    assert_eq!(body.data.outcome, None);

    // 3. 历史按时间倒序
    let resp = client
        .get(format!("{}/api/v1/runs", server.addr))
        .query(&[("limit", "1")])
        .send()
        .await?;
    let body: ApiResponse<RunListResponse> = resp.json().await?;
    assert_eq!(body.data.runs.len(), 1);
    assert_eq!(body.data.runs[0].status, "NO_TRADE");

    // 4. 未到期不结算
    let resp = client.post(format!("{}/api/v1/settle", server.addr)).send().await?;
    let body: ApiResponse<SettleResponse> = resp.json().await?;
    assert_eq!(body.data, SettleResponse { checked: 1, settled: 0 });

    // 5. 到期后结算为 WIN
    let exp = NaiveDate::from_ymd_opt(2026, 11, 13).unwrap();
    server.clock.set_time(Utc.with_ymd_and_hms(2026, 11, 13, 21, 0, 0).unwrap());
    server.market.set_close("SPY", exp, dec!(125)).await;

    let resp = client.post(format!("{}/api/v1/settle", server.addr)).send().await?;
    let body: ApiResponse<SettleResponse> = resp.json().await?;
    assert_eq!(body.data, SettleResponse { checked: 1, settled: 1 });

    let resp = client.get(format!("{}/api/v1/runs", server.addr)).send().await?;
    let body: ApiResponse<RunListResponse> = resp.json().await?;
    let settled = body.data.runs.iter().find(|r| r.id == run.id).unwrap();
    assert_eq!(settled.status, "CLOSED");
    assert_eq!(settled.outcome.as_ref().map(|o| o.label()), Some("WIN"));
    assert!(settled.settled_at.is_some());

    Ok(())
}

#[tokio::test]
async fn test_unknown_ticker_returns_not_found() -> anyhow::Result<()> {
    let server = spawn_test_server().await;

    let resp = client()
        .get(format!("{}/api/v1/analyze", server.addr))
        .query(&[("ticker", "NOPE")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ApiErrorResponse = resp.json().await?;
    assert!(!body.success);
    assert!(body.message.contains("NOPE"), "{}", body.message);
    Ok(())
}

#[tokio::test]
async fn test_market_outage_maps_to_bad_gateway() -> anyhow::Result<()> {
    let server = spawn_test_server().await;
    server.market.set_failing(Some("HTTP 503")).await;

    let resp = client()
        .get(format!("{}/api/v1/analyze", server.addr))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    Ok(())
}

#[tokio::test]
async fn test_settle_with_misconfigured_market_is_server_error() -> anyhow::Result<()> {
    let server = spawn_test_server().await;
    let client = client();

    let resp = client.get(format!("{}/api/v1/analyze", server.addr)).send().await?;
    let body: ApiResponse<RunResponse> = resp.json().await?;
    assert_eq!(body.data.status, "OPEN");

    server.clock.set_time(Utc.with_ymd_and_hms(2026, 11, 13, 21, 0, 0).unwrap());
    server.market.set_misconfigured("Missing POLYGON_API_KEY").await;

    let resp = client.post(format!("{}/api/v1/settle", server.addr)).send().await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ApiErrorResponse = resp.json().await?;
    assert!(!body.success);
    Ok(())
}

#[tokio::test]
async fn test_swagger_document_lists_routes() -> anyhow::Result<()> {
    let server = spawn_test_server().await;

    let resp = client()
        .get(format!("{}/api-docs/openapi.json", server.addr))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: serde_json::Value = resp.json().await?;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/analyze"));
    assert!(paths.contains_key("/api/v1/runs"));
    assert!(paths.contains_key("/api/v1/settle"));
    Ok(())
}
