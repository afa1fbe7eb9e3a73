use crate::domain::{self, TransitionError, commands::*, value_objects::*};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{BookingApplicationError, Result};
use crate::domain::bike::Bike;
use crate::domain::booking::Booking;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub bike_store: Arc<dyn BikeStore>,
    pub booking_store: Arc<dyn BookingStore>,
}

/// ストアから自転車を取得するヘルパー関数
///
/// create_booking, transition_booking_status, get_bookingで共通利用される。
///
/// # エラー
/// - BikeStoreError: 読み込み失敗
/// - BikeNotFound: 自転車が存在しない
async fn load_bike(bike_store: &Arc<dyn BikeStore>, bike_id: BikeId) -> Result<Bike> {
    bike_store
        .get(bike_id)
        .await
        .map_err(BookingApplicationError::BikeStoreError)?
        .ok_or(BookingApplicationError::BikeNotFound)
}

/// ストアから予約を取得するヘルパー関数
async fn load_booking(
    booking_store: &Arc<dyn BookingStore>,
    booking_id: BookingId,
) -> Result<Booking> {
    booking_store
        .get(booking_id)
        .await
        .map_err(map_store_error)?
        .ok_or(BookingApplicationError::BookingNotFound)
}

/// 予約ストアの型付きエラーをアプリケーション層のエラーに写像する
fn map_store_error(err: BookingStoreError) -> BookingApplicationError {
    match err {
        BookingStoreError::PeriodConflict => BookingApplicationError::PeriodConflict,
        BookingStoreError::BikeUnavailable => BookingApplicationError::BikeUnavailable,
        BookingStoreError::StaleStatus => BookingApplicationError::ConcurrentUpdate,
        BookingStoreError::Io(e) => BookingApplicationError::BookingStoreError(e),
    }
}

/// 予約を作成する（純粋な関数）
///
/// ビジネスルール：
/// - 期間はend > startであること
/// - 自転車が存在し、予約可能であること
/// - 既存のアクティブ予約と期間が重ならないこと
/// - 合計金額は請求日数（切り上げ）× 日額料金
///
/// すべての依存が引数として明示的に渡される（関数型の原則）。
///
/// # 一貫性保証
///
/// 事前の重なりチェックは楽観的で、確定的な判定は
/// `BookingStore::insert_active`のトランザクション内の再チェックが行う。
/// 予約の挿入と自転車のis_available更新は同一の原子的な単位で永続化され、
/// 並行する作成リクエストが両方成功することはない。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 予約作成コマンド
///
/// # 戻り値
/// 成功時は作成された予約
pub async fn create_booking(deps: &ServiceDependencies, cmd: CreateBooking) -> Result<Booking> {
    // 1. 期間の検証
    let period = RentalPeriod::new(cmd.start, cmd.end)
        .map_err(|_| BookingApplicationError::InvalidPeriod)?;

    // 2. 自転車の存在確認
    let bike = load_bike(&deps.bike_store, cmd.bike_id).await?;

    // 3. 既存のアクティブ予約との重なりチェック
    //    （重なりがあるときは利用可否フラグより具体的な競合として報告する）
    let active = deps
        .booking_store
        .active_for_bike(cmd.bike_id)
        .await
        .map_err(map_store_error)?;

    if domain::booking::find_conflict(&active, &period).is_some() {
        return Err(BookingApplicationError::PeriodConflict);
    }

    // 4. 予約可能性の確認（期間が重ならなくても占有中なら不可）
    if !bike.is_available {
        return Err(BookingApplicationError::BikeUnavailable);
    }

    // 5. ドメイン層の純粋関数で予約を構築（料金計算を含む）
    let booking = domain::booking::open_booking(
        cmd.customer_id,
        cmd.bike_id,
        period,
        bike.price_per_day,
        cmd.pickup,
        cmd.dropoff,
        cmd.requested_at,
    );

    // 6. 予約の挿入と利用可否フラグの更新を原子的に永続化
    deps.booking_store
        .insert_active(&booking)
        .await
        .map_err(map_store_error)?;

    Ok(booking)
}

/// 予約状態を遷移させる（純粋な関数）
///
/// ビジネスルール：
/// - 予約が存在すること
/// - 呼び出し元が予約の顧客本人か、対象自転車の所有事業者であること
/// - 遷移表にある遷移だけを受け付ける（終端状態からは遷移不可）
/// - pending → confirmed：自転車を予約不可にする（冪等）
/// - completed / cancelled への遷移：自転車を再び予約可能にする
///
/// # 一貫性保証
///
/// 状態の上書きは読み込んだ時点の状態を期待値とするcompare-and-swapで行われ、
/// フラグ更新と同一の原子的な単位で永続化される。並行する遷移リクエストが
/// 両方成功することはなく、敗者には`ConcurrentUpdate`が返る。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 状態変更コマンド
///
/// # 戻り値
/// 成功時は遷移後の予約
pub async fn transition_booking_status(
    deps: &ServiceDependencies,
    cmd: ChangeBookingStatus,
) -> Result<Booking> {
    // 1. 予約と対象自転車を取得
    let booking = load_booking(&deps.booking_store, cmd.booking_id).await?;
    let bike = load_bike(&deps.bike_store, booking.bike_id).await?;

    // 2. 呼び出し元の権限確認
    domain::booking::authorize_caller(&booking, bike.rental_service_id, &cmd.caller)
        .map_err(|_| BookingApplicationError::Forbidden)?;

    // 3. ドメイン層の純粋関数で遷移を適用
    let expected = booking.status;
    let (updated, effect) =
        domain::booking::transition_status(&booking, cmd.next_status, cmd.changed_at).map_err(
            |e| match e {
                TransitionError::TerminalStatus { from } => {
                    BookingApplicationError::InvalidTransition(format!(
                        "booking is {} and accepts no further transitions",
                        from.as_str()
                    ))
                }
                TransitionError::InvalidTransition { from, to } => {
                    BookingApplicationError::InvalidTransition(format!(
                        "cannot transition from {} to {}",
                        from.as_str(),
                        to.as_str()
                    ))
                }
            },
        )?;

    // 4. CASで予約を上書きし、フラグへの影響を同一単位で適用
    deps.booking_store
        .apply_transition(&updated, expected, effect)
        .await
        .map_err(map_store_error)?;

    Ok(updated)
}

/// 予約を取得する（純粋な関数）
///
/// ビジネスルール：
/// - 予約の顧客本人か、対象自転車の所有事業者だけが閲覧できる
pub async fn get_booking(
    deps: &ServiceDependencies,
    caller: Caller,
    booking_id: BookingId,
) -> Result<Booking> {
    let booking = load_booking(&deps.booking_store, booking_id).await?;
    let bike = load_bike(&deps.bike_store, booking.bike_id).await?;

    domain::booking::authorize_caller(&booking, bike.rental_service_id, &caller)
        .map_err(|_| BookingApplicationError::Forbidden)?;

    Ok(booking)
}

/// 顧客自身の予約一覧を取得する（新しい順）
pub async fn list_customer_bookings(
    deps: &ServiceDependencies,
    customer_id: CustomerId,
) -> Result<Vec<Booking>> {
    deps.booking_store
        .find_by_customer(customer_id)
        .await
        .map_err(map_store_error)
}

/// 事業者の所有自転車に対する予約一覧を取得する（新しい順）
pub async fn list_owner_bookings(
    deps: &ServiceDependencies,
    rental_service_id: RentalServiceId,
) -> Result<Vec<Booking>> {
    deps.booking_store
        .find_by_owner(rental_service_id)
        .await
        .map_err(map_store_error)
}
