use serde::{Deserialize, Serialize};

pub mod time;

/// # Summary
/// 证券代码，代表一次分析针对的标的（例如 SPY、AAPL）。
///
/// # Invariants
/// - 内部字符串始终为去除首尾空白后的大写形式，且非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// # Summary
    /// 规范化调用方输入的代码。
    ///
    /// # Logic
    /// 1. 去除首尾空白并转大写。
    /// 2. 若结果为空或缺失，则回退到 `default`。
    ///
    /// # Arguments
    /// * `raw`: 调用方传入的原始代码，可缺失。
    /// * `default`: 兜底代码。
    ///
    /// # Returns
    /// 规范化后的 Ticker。
    pub fn sanitize(raw: Option<&str>, default: &str) -> Self {
        let cleaned = raw.map(|s| s.trim().to_uppercase()).unwrap_or_default();
        if cleaned.is_empty() {
            Self(default.trim().to_uppercase())
        } else {
            Self(cleaned)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
