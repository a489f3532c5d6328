use chrono::NaiveDate;
use optagent_core::common::Ticker;
use optagent_core::config::QuoteConfig;
use optagent_core::quote::entity::{CallQuoteRequest, SpreadQuoteRequest};
use optagent_core::quote::error::QuoteError;
use optagent_core::quote::port::QuoteProvider;
use optagent_feed::tradier::TradierProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXP: &str = "2026-11-20";

fn exp() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
}

fn provider(server: &MockServer) -> TradierProvider {
    TradierProvider::new(&QuoteConfig {
        provider: "tradier".to_string(),
        tradier_token: Some("secret".to_string()),
        tradier_base_url: Some(server.uri()),
        ..QuoteConfig::default()
    })
    .unwrap()
}

fn spread_request(sell: Decimal, buy: Decimal) -> SpreadQuoteRequest {
    SpreadQuoteRequest {
        underlying: Ticker::sanitize(Some("SPY"), "SPY"),
        exp: exp(),
        sell_strike: sell,
        buy_strike: buy,
    }
}

fn put(strike: i64, bid: Value, ask: Value) -> Value {
    json!({
        "symbol": format!("SPY261120P{:05}000", strike),
        "option_type": "put",
        "strike": strike,
        "bid": bid,
        "ask": ask
    })
}

async fn mount_chain(server: &MockServer, options: Value) {
    Mock::given(method("GET"))
        .and(path("/markets/options/chains"))
        .and(query_param("symbol", "SPY"))
        .and(query_param("expiration", EXP))
        .and(query_param("greeks", "false"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "options": options })))
        .mount(server)
        .await;
}

/// # Summary
/// 净收入 = 卖出腿 bid - 买入腿 ask，附带两条腿的盘口。
#[tokio::test]
async fn test_spread_credit_conservative_fill() {
    let server = MockServer::start().await;
    mount_chain(
        &server,
        json!({ "option": [
            put(98, json!(0.80), json!(0.85)),
            put(100, json!(1.40), json!(1.46)),
            { "symbol": "SPY261120C00100000", "option_type": "call", "strike": 100.0, "bid": 3.1, "ask": 3.2 }
        ]}),
    )
    .await;

    let quote = provider(&server)
        .fetch_spread_credit(&spread_request(dec!(100), dec!(98)))
        .await
        .unwrap();

    assert_eq!(quote.value, Some(dec!(0.55)));
    assert_eq!(quote.reason, None);
    assert_eq!(quote.legs.len(), 2);
    assert_eq!(quote.legs[0].strike, dec!(100));
    assert_eq!(quote.legs[0].bid, Some(dec!(1.40)));
}

#[tokio::test]
async fn test_single_object_chain_missing_strike() {
    let server = MockServer::start().await;
    mount_chain(&server, json!({ "option": put(100, json!(1.0), json!(1.1)) })).await;

    let quote = provider(&server)
        .fetch_spread_credit(&spread_request(dec!(100), dec!(98)))
        .await
        .unwrap();

    assert_eq!(quote.value, None);
    assert_eq!(quote.reason.as_deref(), Some("Selected strikes not found in chain"));
}

#[tokio::test]
async fn test_missing_bid_keeps_legs() {
    let server = MockServer::start().await;
    mount_chain(
        &server,
        json!({ "option": [put(98, json!(0.8), json!(0.9)), put(100, Value::Null, json!(1.5))] }),
    )
    .await;

    let quote = provider(&server)
        .fetch_spread_credit(&spread_request(dec!(100), dec!(98)))
        .await
        .unwrap();

    assert_eq!(quote.value, None);
    assert_eq!(quote.reason.as_deref(), Some("Missing bid/ask"));
    assert_eq!(quote.legs.len(), 2);
}

#[tokio::test]
async fn test_empty_chain() {
    let server = MockServer::start().await;
    mount_chain(&server, Value::Null).await;

    let quote = provider(&server)
        .fetch_spread_credit(&spread_request(dec!(100), dec!(98)))
        .await
        .unwrap();
    assert_eq!(quote.value, None);
}

#[tokio::test]
async fn test_call_premium_per_contract() {
    let server = MockServer::start().await;
    mount_chain(
        &server,
        json!({ "option": [
            { "symbol": "SPY261120C00103000", "option_type": "call", "strike": 103, "bid": 0.7, "ask": 0.74 }
        ]}),
    )
    .await;

    let quote = provider(&server)
        .fetch_call_premium(&CallQuoteRequest {
            underlying: Ticker::sanitize(Some("SPY"), "SPY"),
            exp: exp(),
            call_strike: dec!(103),
        })
        .await
        .unwrap();
    assert_eq!(quote.value, Some(dec!(74)));
}

#[tokio::test]
async fn test_http_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Access Token"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_spread_credit(&spread_request(dec!(100), dec!(98)))
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::Network(ref msg) if msg.contains("401") && msg.contains("Invalid Access Token")));
}

#[test]
fn test_base_url_from_env() {
    let live = TradierProvider::new(&QuoteConfig {
        tradier_token: Some("t".to_string()),
        tradier_env: "LIVE".to_string(),
        ..QuoteConfig::default()
    })
    .unwrap();
    assert_eq!(live.base_url(), "https://api.tradier.com/v1");

    let sandbox = TradierProvider::new(&QuoteConfig {
        tradier_token: Some("t".to_string()),
        ..QuoteConfig::default()
    })
    .unwrap();
    assert_eq!(sandbox.base_url(), "https://sandbox.tradier.com/v1");
}
