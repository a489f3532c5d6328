//! 启动配置加载：可选的 TOML 文件，之后由扁平环境变量覆盖。

use config::{Config, ConfigError, File, FileFormat};
use optagent_core::config::AgentConfig;

/// 配置文件路径的环境变量，缺省为 `optagent.toml`
pub const CONFIG_PATH_ENV: &str = "OPTAGENT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "optagent.toml";

/// 扁平环境变量到配置键的映射
const ENV_KEYS: &[(&str, &str)] = &[
    ("MAX_LOSS_CAP", "risk.max_loss_cap"),
    ("SPREAD_WIDTH", "risk.spread_width"),
    ("MIN_SUPPORT_REJECTIONS", "risk.min_support_rejections"),
    ("MAX_PREMIUM_CAP", "risk.max_premium_cap"),
    ("MIN_DTE", "risk.min_dte"),
    ("MAX_DTE", "risk.max_dte"),
    ("TAKE_PROFIT_PCT", "risk.take_profit_pct"),
    ("STOP_LOSS_PCT", "risk.stop_loss_pct"),
    ("STRATEGY", "risk.strategy"),
    ("EXPIRY_POLICY", "risk.expiry_policy"),
    ("SUPPORT_LOOKBACK", "signal.support_lookback"),
    ("SUPPORT_TOLERANCE_PCT", "signal.support_tolerance_pct"),
    ("CANDLE_LOOKBACK_DAYS", "signal.candle_lookback_days"),
    ("DEFAULT_TICKER", "signal.default_ticker"),
    ("QUOTE_PROVIDER", "quote.provider"),
    ("TRADIER_TOKEN", "quote.tradier_token"),
    ("TRADIER_ENV", "quote.tradier_env"),
    ("TRADIER_BASE_URL", "quote.tradier_base_url"),
    ("STUB_CREDIT", "quote.stub_credit"),
    ("STUB_PREMIUM", "quote.stub_premium"),
    ("POLYGON_API_KEY", "market.polygon_api_key"),
    ("POLYGON_BASE_URL", "market.polygon_base_url"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATA_DIR", "database.data_dir"),
    ("SETTLE_INTERVAL_SECS", "schedule.settle_interval_secs"),
    ("ANALYZE_INTERVAL_SECS", "schedule.analyze_interval_secs"),
    ("SETTLE_CONCURRENCY", "schedule.settle_concurrency"),
    ("LOG_DIR", "log.dir"),
];

/// 逗号分隔的代码列表
const WATCH_TICKERS_ENV: &str = "WATCH_TICKERS";

/// 从进程环境加载配置
pub fn load() -> Result<AgentConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// # Summary
/// 以给定的环境查询函数构建配置。
///
/// # Logic
/// 1. 读取可选配置文件（路径可由 `OPTAGENT_CONFIG` 指定）。
/// 2. 非空环境变量逐项覆盖对应键。
/// 3. 反序列化为 `AgentConfig`，未出现的字段取默认值。
///
/// # Returns
/// 文件格式错误或数值无法解析时返回 `ConfigError`。
pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<AgentConfig, ConfigError> {
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let path = lookup(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let mut builder =
        Config::builder().add_source(File::new(&path, FileFormat::Toml).required(false));

    for (var, key) in ENV_KEYS {
        builder = builder.set_override_option(*key, lookup(var).map(|v| v.trim().to_string()))?;
    }

    let watch = lookup(WATCH_TICKERS_ENV).map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    builder = builder.set_override_option("schedule.watch_tickers", watch)?;

    builder.build()?.try_deserialize()
}
