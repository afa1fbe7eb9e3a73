use super::value_objects::{DailyRate, RentalPeriod};

const SECONDS_PER_DAY: i64 = 86_400;

/// 純粋関数：請求日数を計算する
///
/// ビジネスルール：
/// - 暦日単位の請求で、端数の日は切り上げる
/// - 例：36時間のレンタルは2日分として請求される
///
/// `RentalPeriod`の不変条件（end > start）により結果は常に1以上。
pub fn billable_days(period: &RentalPeriod) -> i64 {
    let seconds = (period.end() - period.start()).num_seconds();
    // RentalPeriod の不変条件（end > start）により seconds は常に正。
    // 正の整数に対する切り上げ除算（安定版 API）。
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// 純粋関数：レンタル料金を計算する
///
/// 合計金額 = 請求日数 × 日額料金。副作用なし。
pub fn rental_price(period: &RentalPeriod, rate: DailyRate) -> i64 {
    billable_days(period) * rate.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn period(hours: i64) -> RentalPeriod {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RentalPeriod::new(start, start + Duration::hours(hours)).unwrap()
    }

    // TDD: billable_days() のテスト
    #[test]
    fn test_billable_days_exact_days() {
        assert_eq!(billable_days(&period(24)), 1);
        assert_eq!(billable_days(&period(48)), 2);
    }

    #[test]
    fn test_billable_days_rounds_up_fractional_day() {
        // 36時間 → 2日分
        assert_eq!(billable_days(&period(36)), 2);
    }

    #[test]
    fn test_billable_days_minimum_is_one() {
        assert_eq!(billable_days(&period(1)), 1);
    }

    // TDD: rental_price() のテスト
    #[test]
    fn test_rental_price_day0_to_day1_noon() {
        // Day0 00:00 → Day1 12:00、日額10 → 2日分 = 20
        let rate = DailyRate::new(10).unwrap();
        assert_eq!(rental_price(&period(36), rate), 20);
    }

    #[test]
    fn test_rental_price_two_full_days() {
        // Jan1 → Jan3、日額15 → 2日分 = 30
        let rate = DailyRate::new(15).unwrap();
        assert_eq!(rental_price(&period(48), rate), 30);
    }
}
