use crate::decision::entity::{ExpiryPolicy, StrategyKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 全局不可变配置，启动时加载一次并显式传递给各服务。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    pub risk: RiskConfig,
    pub signal: SignalConfig,
    pub quote: QuoteConfig,
    pub market: MarketConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub schedule: ScheduleConfig,
    pub log: LogConfig,
}

/// 风控与交易结构参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    // 价差单张最大亏损上限（美元）
    pub max_loss_cap: Decimal,
    // 价差行权价宽度
    pub spread_width: Decimal,
    pub min_support_rejections: u32,
    // 单腿看涨权利金上限（美元/张）
    pub max_premium_cap: Decimal,
    pub min_dte: u32,
    pub max_dte: u32,
    pub take_profit_pct: Decimal,
    pub stop_loss_pct: Decimal,
    pub strategy: StrategyKind,
    pub expiry_policy: ExpiryPolicy,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_loss_cap: Decimal::from(200),
            spread_width: Decimal::from(2),
            min_support_rejections: 2,
            max_premium_cap: Decimal::from(100),
            min_dte: 21,
            max_dte: 35,
            take_profit_pct: Decimal::new(6, 1),
            stop_loss_pct: Decimal::new(5, 1),
            strategy: StrategyKind::BullPutSpread,
            expiry_policy: ExpiryPolicy::Range,
        }
    }
}

/// 信号计算参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub support_lookback: usize,
    pub support_tolerance_pct: Decimal,
    // 拉取日线的交易日数量
    pub candle_lookback_days: u32,
    pub default_ticker: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            support_lookback: 15,
            support_tolerance_pct: Decimal::new(2, 3),
            candle_lookback_days: 60,
            default_ticker: "SPY".to_string(),
        }
    }
}

/// 报价提供者配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    // stub | tradier
    pub provider: String,
    pub tradier_token: Option<String>,
    // sandbox | live
    pub tradier_env: String,
    pub tradier_base_url: Option<String>,
    pub stub_credit: Decimal,
    pub stub_premium: Decimal,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            provider: "stub".to_string(),
            tradier_token: None,
            tradier_env: "sandbox".to_string(),
            tradier_base_url: None,
            stub_credit: Decimal::new(50, 2),
            stub_premium: Decimal::from(75),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub polygon_api_key: Option<String>,
    pub polygon_base_url: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            polygon_api_key: None,
            polygon_base_url: "https://api.polygon.io".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// 后台调度参数，间隔为 0 表示关闭对应任务
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub settle_interval_secs: u64,
    pub analyze_interval_secs: u64,
    pub watch_tickers: Vec<String>,
    pub settle_concurrency: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            settle_interval_secs: 3600,
            analyze_interval_secs: 0,
            watch_tickers: Vec::new(),
            settle_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.risk.max_loss_cap, dec!(200));
        assert_eq!(config.risk.spread_width, dec!(2));
        assert_eq!(config.risk.min_support_rejections, 2);
        assert_eq!(config.risk.take_profit_pct, dec!(0.6));
        assert_eq!(config.risk.strategy, StrategyKind::BullPutSpread);
        assert_eq!(config.risk.expiry_policy, ExpiryPolicy::Range);
        assert_eq!(config.signal.support_tolerance_pct, dec!(0.002));
        assert_eq!(config.quote.provider, "stub");
        assert_eq!(config.quote.stub_credit, dec!(0.50));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.data_dir, "data");
        assert_eq!(config.schedule.settle_concurrency, 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "risk": { "max_loss_cap": 150, "strategy": "long_call" } }"#;
        let config: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.risk.max_loss_cap, dec!(150));
        assert_eq!(config.risk.strategy, StrategyKind::LongCall);
        assert_eq!(config.risk.min_dte, 21);
        assert_eq!(config.signal.default_ticker, "SPY");
    }
}
