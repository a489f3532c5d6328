//! 指数移动平均 (EMA)。
//!
//! 递推：EMA[t] = k * close[t] + (1 - k) * EMA[t-1]，k = 2 / (N + 1)。
//! 种子：前 N 个值的简单平均；样本不足 N 个时以第一个值为种子。

use rust_decimal::{Decimal, RoundingStrategy};

/// # Summary
/// 计算序列末端的 EMA(N)。
///
/// # Arguments
/// * `values`: 升序排列的收盘价。
/// * `period`: 周期 N。
///
/// # Returns
/// 空序列或 `period == 0` 返回 `None`。
pub fn ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    let first = *values.first()?;
    if period == 0 {
        return None;
    }

    let k = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);

    let (seed, rest) = if values.len() >= period {
        let (head, tail) = values.split_at(period);
        let sum: Decimal = head.iter().sum();
        (sum / Decimal::from(period), tail)
    } else {
        (first, &values[1..])
    };

    Some(
        rest.iter()
            .fold(seed, |prev, &v| k * v + (Decimal::ONE - k) * prev),
    )
}

/// 四舍五入（中点远离零）到 `dp` 位小数
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// 美元金额的展示形式：取整并去掉多余的小数位
pub fn dollars(value: Decimal) -> String {
    round_half_up(value, 0).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ema_empty_is_none() {
        assert_eq!(ema(&[], 20), None);
        assert_eq!(ema(&[dec!(1)], 0), None);
    }

    #[test]
    fn test_ema_period_one_is_last_close() {
        let closes = [dec!(10), dec!(11), dec!(12.5)];
        assert_eq!(ema(&closes, 1), Some(dec!(12.5)));
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        // 种子 = (1+2+3)/3 = 2，k = 0.5，EMA = 0.5*4 + 0.5*2 = 3
        let closes = [dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(ema(&closes, 3), Some(dec!(3)));
    }

    #[test]
    fn test_ema_short_series_seeds_with_first() {
        // 种子 = 10，k = 2/21
        let closes = [dec!(10), dec!(10), dec!(10)];
        let v = ema(&closes, 20).unwrap();
        assert_eq!(round_half_up(v, 10), dec!(10));
    }

    #[test]
    fn test_constant_series_is_constant() {
        let closes = vec![dec!(42.17); 60];
        let v = ema(&closes, 50).unwrap();
        assert_eq!(round_half_up(v, 8), dec!(42.17));
    }

    #[test]
    fn test_rounding_and_dollars() {
        assert_eq!(round_half_up(dec!(0.505), 2), dec!(0.51));
        assert_eq!(round_half_up(dec!(-49.5), 0), dec!(-50));
        assert_eq!(dollars(dec!(150.0)), "150");
        assert_eq!(dollars(dec!(100)), "100");
    }
}
