use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AccessError, BikeId, BookingId, Caller, CustomerId, DailyRate, GeoPoint, PaymentStatus,
    RentalPeriod, RentalServiceId, TransitionError, pricing,
};

// ============================================================================
// 予約状態の状態機械
// ============================================================================

/// 予約状態
///
/// pending → confirmed → in_progress → completed と進み、
/// cancelled は非終端状態のどこからでも到達できる。
/// completed / cancelled は終端状態で、以降の遷移は一切受け付けない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// 自転車を占有している状態か（pending / confirmed / in_progress）
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }

    /// 終端状態か（completed / cancelled）
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// 遷移表
    ///
    /// 隣接する前進遷移と、非終端状態からのキャンセルのみ許可する。
    /// 状態の飛び越しや逆行は不正な遷移として扱う。
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// ============================================================================
// 予約集約
// ============================================================================

/// 予約集約 - 1台の自転車の1回の貸出予約
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    // 識別子
    pub booking_id: BookingId,

    // 他の集約への参照（IDのみ）
    pub customer_id: CustomerId,
    pub bike_id: BikeId,

    // 予約管理の責務
    pub period: RentalPeriod,
    pub status: BookingStatus,
    pub total_price: i64,
    pub payment_status: PaymentStatus,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 状態遷移が自転車の利用可否フラグに及ぼす影響
///
/// ドメイン層は影響を値として返すだけで、フラグの永続化は
/// 予約の書き込みと同一トランザクションでアダプターが行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityEffect {
    /// 自転車を予約不可にする
    MarkUnavailable,
    /// 自転車を再び予約可能にする
    MarkAvailable,
}

/// 純粋関数：予約を作成する
///
/// ビジネスルール：
/// - 初期状態はpending、支払い状態もpending
/// - 合計金額は請求日数（切り上げ）× 日額料金
///
/// 自転車の存在・利用可否・期間の競合チェックはアプリケーション層の責務。
/// 副作用なし。新しいBookingを返す。
pub fn open_booking(
    customer_id: CustomerId,
    bike_id: BikeId,
    period: RentalPeriod,
    rate: DailyRate,
    pickup: GeoPoint,
    dropoff: GeoPoint,
    requested_at: DateTime<Utc>,
) -> Booking {
    Booking {
        booking_id: BookingId::new(),
        customer_id,
        bike_id,
        period,
        status: BookingStatus::Pending,
        total_price: pricing::rental_price(&period, rate),
        payment_status: PaymentStatus::Pending,
        pickup,
        dropoff,
        created_at: requested_at,
        updated_at: requested_at,
    }
}

/// 純粋関数：2つの期間が重なるか判定する
///
/// 閉区間で比較する（a.start <= b.end かつ a.end >= b.start）。
/// 境界が接しているだけでも重なりとみなすため、同日の引き渡しは成立しない。
pub fn periods_overlap(a: &RentalPeriod, b: &RentalPeriod) -> bool {
    a.start() <= b.end() && a.end() >= b.start()
}

/// 純粋関数：候補期間と競合するアクティブ予約を探す
///
/// アクティブ（pending / confirmed / in_progress）な予約だけが
/// 自転車を占有する。終端状態の予約は競合しない。
/// 状態を変更しない。
pub fn find_conflict<'a>(
    existing: &'a [Booking],
    candidate: &RentalPeriod,
) -> Option<&'a Booking> {
    existing
        .iter()
        .find(|booking| booking.status.is_active() && periods_overlap(&booking.period, candidate))
}

/// 純粋関数：予約状態を遷移させる
///
/// ビジネスルール：
/// - 終端状態からは遷移不可
/// - 遷移表（`BookingStatus::can_transition_to`）にない遷移は不可
/// - pending → confirmed：自転車を予約不可にする（既に不可なら冪等）
/// - completed / cancelled への遷移：自転車を再び予約可能にする
///
/// 副作用なし。新しいBookingとフラグへの影響を返す。
pub fn transition_status(
    booking: &Booking,
    next: BookingStatus,
    changed_at: DateTime<Utc>,
) -> Result<(Booking, Option<AvailabilityEffect>), TransitionError> {
    if booking.status.is_terminal() {
        return Err(TransitionError::TerminalStatus {
            from: booking.status,
        });
    }

    if !booking.status.can_transition_to(next) {
        return Err(TransitionError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }

    let effect = match next {
        BookingStatus::Confirmed => Some(AvailabilityEffect::MarkUnavailable),
        BookingStatus::Completed | BookingStatus::Cancelled => {
            Some(AvailabilityEffect::MarkAvailable)
        }
        _ => None,
    };

    let new_booking = Booking {
        status: next,
        updated_at: changed_at,
        ..booking.clone()
    };

    Ok((new_booking, effect))
}

/// 純粋関数：呼び出し元の権限を確認する
///
/// ビジネスルール：
/// - 予約の顧客本人は操作できる
/// - 対象自転車を所有する事業者は操作できる
/// - それ以外は拒否
pub fn authorize_caller(
    booking: &Booking,
    bike_owner: RentalServiceId,
    caller: &Caller,
) -> Result<(), AccessError> {
    match caller {
        Caller::Customer(customer_id) => {
            if *customer_id == booking.customer_id {
                Ok(())
            } else {
                Err(AccessError::NotBookingCustomer)
            }
        }
        Caller::RentalService(rental_service_id) => {
            if *rental_service_id == bike_owner {
                Ok(())
            } else {
                Err(AccessError::NotBikeOwner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn period_days(start_day: u32, end_day: u32) -> RentalPeriod {
        let start = Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, end_day, 0, 0, 0).unwrap();
        RentalPeriod::new(start, end).unwrap()
    }

    fn sample_booking(period: RentalPeriod) -> Booking {
        open_booking(
            CustomerId::new(),
            BikeId::new(),
            period,
            DailyRate::new(1000).unwrap(),
            GeoPoint::new(139.70, 35.66),
            GeoPoint::new(139.75, 35.68),
            Utc::now(),
        )
    }

    // TDD: open_booking() のテスト
    #[test]
    fn test_open_booking_starts_pending() {
        let booking = sample_booking(period_days(1, 3));

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.created_at, booking.updated_at);
    }

    #[test]
    fn test_open_booking_computes_price() {
        // 2日間 × 1000 = 2000
        let booking = sample_booking(period_days(1, 3));
        assert_eq!(booking.total_price, 2000);
    }

    #[test]
    fn test_open_booking_rounds_fractional_day_up() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(36);
        let period = RentalPeriod::new(start, end).unwrap();

        let booking = open_booking(
            CustomerId::new(),
            BikeId::new(),
            period,
            DailyRate::new(10).unwrap(),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.0),
            Utc::now(),
        );

        assert_eq!(booking.total_price, 20);
    }

    // TDD: periods_overlap() のテスト
    #[test]
    fn test_periods_overlap_partial() {
        // Jan1→Jan3 と Jan2→Jan4 は重なる
        assert!(periods_overlap(&period_days(1, 3), &period_days(2, 4)));
    }

    #[test]
    fn test_periods_overlap_contained() {
        assert!(periods_overlap(&period_days(1, 10), &period_days(3, 5)));
    }

    #[test]
    fn test_periods_overlap_boundary_touch_counts() {
        // 境界が接しているだけでも重なり（同日の引き渡しは不可）
        assert!(periods_overlap(&period_days(1, 3), &period_days(3, 5)));
    }

    #[test]
    fn test_periods_do_not_overlap_when_disjoint() {
        assert!(!periods_overlap(&period_days(1, 3), &period_days(4, 6)));
    }

    // TDD: find_conflict() のテスト
    #[test]
    fn test_find_conflict_detects_active_overlap() {
        let existing = vec![sample_booking(period_days(1, 3))];

        let conflict = find_conflict(&existing, &period_days(2, 4));
        assert!(conflict.is_some());
        assert_eq!(conflict.unwrap().booking_id, existing[0].booking_id);
    }

    #[test]
    fn test_find_conflict_ignores_terminal_bookings() {
        let mut cancelled = sample_booking(period_days(1, 3));
        cancelled.status = BookingStatus::Cancelled;
        let mut completed = sample_booking(period_days(1, 3));
        completed.status = BookingStatus::Completed;

        let existing = vec![cancelled, completed];
        assert!(find_conflict(&existing, &period_days(2, 4)).is_none());
    }

    #[test]
    fn test_find_conflict_none_when_periods_disjoint() {
        let existing = vec![sample_booking(period_days(1, 3))];
        assert!(find_conflict(&existing, &period_days(4, 6)).is_none());
    }

    // TDD: 状態機械のテスト
    #[test]
    fn test_full_forward_path_is_valid() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_cancel_allowed_from_all_non_terminal_states() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        use BookingStatus::*;
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn test_backward_moves_are_rejected() {
        use BookingStatus::*;
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Confirmed));
    }

    // TDD: transition_status() のテスト
    #[test]
    fn test_transition_to_confirmed_marks_unavailable() {
        let booking = sample_booking(period_days(1, 3));
        let changed_at = Utc::now();

        let (confirmed, effect) =
            transition_status(&booking, BookingStatus::Confirmed, changed_at).unwrap();

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.updated_at, changed_at);
        assert_eq!(effect, Some(AvailabilityEffect::MarkUnavailable));
    }

    #[test]
    fn test_transition_to_in_progress_has_no_effect_on_flag() {
        let mut booking = sample_booking(period_days(1, 3));
        booking.status = BookingStatus::Confirmed;

        let (_, effect) =
            transition_status(&booking, BookingStatus::InProgress, Utc::now()).unwrap();
        assert_eq!(effect, None);
    }

    #[test]
    fn test_transition_to_completed_releases_bike() {
        let mut booking = sample_booking(period_days(1, 3));
        booking.status = BookingStatus::InProgress;

        let (completed, effect) =
            transition_status(&booking, BookingStatus::Completed, Utc::now()).unwrap();

        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(effect, Some(AvailabilityEffect::MarkAvailable));
    }

    #[test]
    fn test_cancel_from_pending_releases_bike() {
        let booking = sample_booking(period_days(1, 3));

        let (cancelled, effect) =
            transition_status(&booking, BookingStatus::Cancelled, Utc::now()).unwrap();

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(effect, Some(AvailabilityEffect::MarkAvailable));
    }

    #[test]
    fn test_transition_fails_from_terminal_state() {
        let mut booking = sample_booking(period_days(1, 3));
        booking.status = BookingStatus::Completed;

        let result = transition_status(&booking, BookingStatus::Confirmed, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            TransitionError::TerminalStatus {
                from: BookingStatus::Completed
            }
        );
    }

    #[test]
    fn test_double_complete_fails_without_touching_flag() {
        let mut booking = sample_booking(period_days(1, 3));
        booking.status = BookingStatus::InProgress;

        let (completed, _) =
            transition_status(&booking, BookingStatus::Completed, Utc::now()).unwrap();

        // 2回目のcompletedは終端状態エラーで、フラグへの影響も発生しない
        let result = transition_status(&completed, BookingStatus::Completed, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            TransitionError::TerminalStatus {
                from: BookingStatus::Completed
            }
        );
    }

    #[test]
    fn test_invalid_transition_reports_both_states() {
        let booking = sample_booking(period_days(1, 3));

        let result = transition_status(&booking, BookingStatus::InProgress, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            TransitionError::InvalidTransition {
                from: BookingStatus::Pending,
                to: BookingStatus::InProgress
            }
        );
    }

    // ワイヤ表現のテスト
    #[test]
    fn test_booking_status_serializes_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, BookingStatus::Cancelled);
    }

    // TDD: authorize_caller() のテスト
    #[test]
    fn test_booking_customer_is_authorized() {
        let booking = sample_booking(period_days(1, 3));
        let caller = Caller::Customer(booking.customer_id);

        assert!(authorize_caller(&booking, RentalServiceId::new(), &caller).is_ok());
    }

    #[test]
    fn test_foreign_customer_is_rejected() {
        let booking = sample_booking(period_days(1, 3));
        let caller = Caller::Customer(CustomerId::new());

        let result = authorize_caller(&booking, RentalServiceId::new(), &caller);
        assert_eq!(result.unwrap_err(), AccessError::NotBookingCustomer);
    }

    #[test]
    fn test_bike_owner_is_authorized() {
        let booking = sample_booking(period_days(1, 3));
        let owner = RentalServiceId::new();
        let caller = Caller::RentalService(owner);

        assert!(authorize_caller(&booking, owner, &caller).is_ok());
    }

    #[test]
    fn test_non_owning_rental_service_is_rejected() {
        let booking = sample_booking(period_days(1, 3));
        let caller = Caller::RentalService(RentalServiceId::new());

        let result = authorize_caller(&booking, RentalServiceId::new(), &caller);
        assert_eq!(result.unwrap_err(), AccessError::NotBikeOwner);
    }
}
