use chrono::{Datelike, Duration, NaiveDate};
use optagent_core::decision::entity::ExpiryPolicy;
use tracing::debug;

/// 当天（含）之后的第一个周五
pub fn next_friday_on_or_after(date: NaiveDate) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    let diff = (5 - weekday + 7) % 7;
    date + Duration::days(diff)
}

/// # Summary
/// 按策略选择期权到期日。
///
/// # Logic
/// - `NextFriday`: 今天（含）之后的第一个周五。
/// - `Range`: `today + min_dte`（含）之后的第一个周五；即使超出 `today + max_dte` 也照样返回。
pub fn select_expiry(policy: ExpiryPolicy, today: NaiveDate, min_dte: u32, max_dte: u32) -> NaiveDate {
    match policy {
        ExpiryPolicy::NextFriday => next_friday_on_or_after(today),
        ExpiryPolicy::Range => {
            let earliest = today + Duration::days(i64::from(min_dte));
            let friday = next_friday_on_or_after(earliest);
            let latest = today + Duration::days(i64::from(max_dte));
            if friday > latest {
                debug!(%friday, %latest, "First eligible Friday is beyond max DTE");
            }
            friday
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_next_friday() {
        // 2026-10-16 是周五
        assert_eq!(next_friday_on_or_after(d(2026, 10, 16)), d(2026, 10, 16));
        assert_eq!(next_friday_on_or_after(d(2026, 10, 17)), d(2026, 10, 23));
        assert_eq!(next_friday_on_or_after(d(2026, 10, 18)), d(2026, 10, 23));
        assert_eq!(next_friday_on_or_after(d(2026, 10, 22)), d(2026, 10, 23));
    }

    #[test]
    fn test_range_policy() {
        // 周日 + 21 天 = 2026-11-08（周日）-> 2026-11-13
        let exp = select_expiry(ExpiryPolicy::Range, d(2026, 10, 18), 21, 35);
        assert_eq!(exp, d(2026, 11, 13));
        assert_eq!(exp.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_range_beyond_max_dte_is_kept() {
        // 窗口 [10, 11] 内没有周五，仍返回第一个周五
        let today = d(2026, 10, 18);
        let exp = select_expiry(ExpiryPolicy::Range, today, 10, 11);
        assert_eq!(exp, d(2026, 10, 30));
        assert!(exp > today + Duration::days(11));
    }

    #[test]
    fn test_next_friday_policy_ignores_dte() {
        let exp = select_expiry(ExpiryPolicy::NextFriday, d(2026, 10, 18), 21, 35);
        assert_eq!(exp, d(2026, 10, 23));
    }
}
