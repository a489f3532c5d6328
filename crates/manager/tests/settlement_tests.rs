mod common;

use common::{expiry, harness, move_clock};
use optagent_core::config::{AgentConfig, RiskConfig};
use optagent_core::decision::entity::StrategyKind;
use optagent_core::run::entity::{Outcome, RunRecord, RunStatus};
use optagent_core::test_utils::FixedQuoteProvider;
use optagent_manager::analysis::AnalyzeRequest;
use optagent_core::market::error::MarketError;
use optagent_manager::settlement::{SettlementError, SettlementSummary};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// 建一笔 credit 0.65 的 120/118 价差，拨到到期日并设置收盘价后结算
async fn settle_with_close(close: Option<Decimal>) -> (SettlementSummary, RunRecord) {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    let opened = h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();

    move_clock(&h.clock, expiry());
    if let Some(close) = close {
        h.market.set_close("SPY", expiry(), close).await;
    }

    let summary = h.settlement.settle_open_trades().await.unwrap();
    let record = h
        .store
        .latest(10)
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id == opened.id)
        .unwrap();
    (summary, record)
}

#[tokio::test]
async fn test_close_above_short_strike_is_win() {
    let (summary, record) = settle_with_close(Some(dec!(125))).await;

    assert_eq!(summary, SettlementSummary { checked: 1, settled: 1 });
    assert_eq!(record.status, RunStatus::Closed);
    assert!(record.settled_at.is_some());
    let Some(Outcome::Win(s)) = record.outcome else {
        panic!("expected WIN, got {:?}", record.outcome);
    };
    assert_eq!(s.exp, expiry());
    assert_eq!(s.underlying_close_at_exp, dec!(125));
    assert_eq!(s.credit, dec!(65));
    assert_eq!(s.max_loss, dec!(135));
    assert_eq!(s.profit, dec!(65));
}

#[tokio::test]
async fn test_close_below_long_strike_is_loss() {
    let (_, record) = settle_with_close(Some(dec!(117))).await;

    let Some(Outcome::Loss(s)) = record.outcome else {
        panic!("expected LOSS, got {:?}", record.outcome);
    };
    assert_eq!(s.profit, dec!(-135));
}

#[tokio::test]
async fn test_close_between_strikes() {
    // 65 - (120 - 119.5) * 100 = 15，仍为正
    let (_, record) = settle_with_close(Some(dec!(119.5))).await;
    let Some(Outcome::Win(s)) = record.outcome else {
        panic!("expected WIN, got {:?}", record.outcome);
    };
    assert_eq!(s.profit, dec!(15));

    // 65 - (120 - 119) * 100 = -35
    let (_, record) = settle_with_close(Some(dec!(119))).await;
    let Some(Outcome::Partial(s)) = record.outcome else {
        panic!("expected PARTIAL, got {:?}", record.outcome);
    };
    assert_eq!(s.profit, dec!(-35));
}

#[tokio::test]
async fn test_missing_close_closes_as_unknown() {
    let (summary, record) = settle_with_close(None).await;

    assert_eq!(summary.settled, 1);
    assert_eq!(record.status, RunStatus::Closed);
    let Some(Outcome::Unknown { exp, reason }) = record.outcome else {
        panic!("expected UNKNOWN, got {:?}", record.outcome);
    };
    assert_eq!(exp, expiry());
    assert_eq!(reason, "No close available for SPY on 2026-11-13");
}

#[tokio::test]
async fn test_not_yet_expired_is_skipped() {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();

    move_clock(&h.clock, expiry().pred_opt().unwrap());
    let summary = h.settlement.settle_open_trades().await.unwrap();

    assert_eq!(summary, SettlementSummary { checked: 1, settled: 0 });
    assert_eq!(h.market.close_calls(), 0);
    assert_eq!(h.store.list_open().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_market_failure_keeps_record_open() {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();

    move_clock(&h.clock, expiry());
    h.market.set_failing(Some("HTTP 429")).await;
    let summary = h.settlement.settle_open_trades().await.unwrap();
    assert_eq!(summary, SettlementSummary { checked: 1, settled: 0 });
    assert_eq!(h.store.list_open().await.unwrap().len(), 1);

    // 下一轮行情恢复后正常结算
    h.market.set_failing(None).await;
    h.market.set_close("SPY", expiry(), dec!(130)).await;
    let summary = h.settlement.settle_open_trades().await.unwrap();
    assert_eq!(summary.settled, 1);
    assert!(h.store.list_open().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_market_config_error_aborts_the_pass() {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();

    move_clock(&h.clock, expiry());
    h.market.set_misconfigured("Missing POLYGON_API_KEY").await;

    let err = h.settlement.settle_open_trades().await.unwrap_err();
    assert!(
        matches!(err, SettlementError::Market(MarketError::Config(ref m)) if m == "Missing POLYGON_API_KEY"),
        "{err:?}"
    );
    assert_eq!(h.store.list_open().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_pass_is_noop() {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();
    h.analysis.analyze(AnalyzeRequest::http(Some("QQQ".to_string()), None)).await.unwrap();

    move_clock(&h.clock, expiry());
    h.market.set_close("SPY", expiry(), dec!(121)).await;

    let first = h.settlement.settle_open_trades().await.unwrap();
    assert_eq!(first, SettlementSummary { checked: 1, settled: 1 });
    let calls = h.market.close_calls();

    let second = h.settlement.settle_open_trades().await.unwrap();
    assert_eq!(second, SettlementSummary::default());
    assert_eq!(h.market.close_calls(), calls);
}

#[tokio::test]
async fn test_long_call_records_are_not_settled() {
    let config = AgentConfig {
        risk: RiskConfig {
            strategy: StrategyKind::LongCall,
            ..RiskConfig::default()
        },
        ..AgentConfig::default()
    };
    let h = harness(config, Arc::new(FixedQuoteProvider::priced(dec!(75)))).await;
    h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();

    move_clock(&h.clock, expiry());
    let summary = h.settlement.settle_open_trades().await.unwrap();

    assert_eq!(summary, SettlementSummary { checked: 1, settled: 0 });
    assert_eq!(h.store.list_open().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_settles_many_records_concurrently() {
    let h = harness(AgentConfig::default(), Arc::new(FixedQuoteProvider::priced(dec!(0.65)))).await;
    for _ in 0..10 {
        h.analysis.analyze(AnalyzeRequest::http(None, None)).await.unwrap();
    }

    move_clock(&h.clock, expiry());
    h.market.set_close("SPY", expiry(), dec!(118.5)).await;
    let summary = h.settlement.settle_open_trades().await.unwrap();

    assert_eq!(summary, SettlementSummary { checked: 10, settled: 10 });
    let records = h.store.latest(20).await.unwrap();
    assert!(records.iter().all(|r| r.status == RunStatus::Closed));
    assert!(
        records
            .iter()
            .all(|r| matches!(r.outcome, Some(Outcome::Partial(ref s)) if s.profit == dec!(-85)))
    );
}
