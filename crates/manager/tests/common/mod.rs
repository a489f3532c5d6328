#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use optagent_core::common::time::FakeClockProvider;
use optagent_core::config::AgentConfig;
use optagent_core::market::entity::Candle;
use optagent_core::quote::port::QuoteProvider;
use optagent_core::store::port::RunStore;
use optagent_core::test_utils::{StaticMarketData, candle};
use optagent_manager::analysis::AnalysisService;
use optagent_manager::settlement::SettlementService;
use optagent_store::memory::MemoryRunStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// 默认区间策略下 2026-10-18 选出的到期日
pub fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 13).unwrap()
}

pub fn clock_at(date: NaiveDate) -> Arc<FakeClockProvider> {
    let time = Utc.from_utc_datetime(&date.and_hms_opt(15, 0, 0).unwrap());
    Arc::new(FakeClockProvider::new(time))
}

pub fn move_clock(clock: &FakeClockProvider, date: NaiveDate) {
    clock.set_time(Utc.from_utc_datetime(&date.and_hms_opt(21, 0, 0).unwrap()));
}

/// 缓慢上涨，末段在 120 附近被测试三次的日线
pub fn bullish_candles() -> Vec<Candle> {
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

pub fn bearish_candles() -> Vec<Candle> {
    let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
    (0..60i64)
        .map(|i| {
            let base = Decimal::from(200 - i);
            candle(start + Duration::days(i), base, base + dec!(0.5), base - dec!(1), base - dec!(0.5))
        })
        .collect()
}

pub struct Harness {
    pub market: Arc<StaticMarketData>,
    pub store: Arc<dyn RunStore>,
    pub clock: Arc<FakeClockProvider>,
    pub analysis: Arc<AnalysisService>,
    pub settlement: Arc<SettlementService>,
}

pub async fn harness(config: AgentConfig, quotes: Arc<dyn QuoteProvider>) -> Harness {
    let market = Arc::new(StaticMarketData::new());
    market.set_candles("SPY", bullish_candles()).await;
    market.set_candles("QQQ", bearish_candles()).await;

    let store: Arc<dyn RunStore> = Arc::new(MemoryRunStore::new());
    let clock = clock_at(today());

    let analysis = AnalysisService::new(
        Arc::new(config),
        market.clone(),
        quotes,
        store.clone(),
        clock.clone(),
    );
    let settlement = SettlementService::new(market.clone(), store.clone(), clock.clone(), 4);

    Harness {
        market,
        store,
        clock,
        analysis,
        settlement,
    }
}
