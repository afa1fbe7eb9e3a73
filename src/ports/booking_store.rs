use crate::domain::booking::{AvailabilityEffect, Booking, BookingStatus};
use crate::domain::value_objects::{BikeId, BookingId, CustomerId, RentalServiceId};
use async_trait::async_trait;
use thiserror::Error;

/// 予約ストアのエラー
///
/// 競合を型で区別する。アプリケーション層は競合系の変種を専用の
/// エラー種別に写像し、I/Oエラーだけを汎用の障害として扱う。
#[derive(Debug, Error)]
pub enum BookingStoreError {
    /// トランザクション内の再チェックで期間の競合を検出した
    #[error("an active booking already overlaps the requested period")]
    PeriodConflict,

    /// トランザクション内の再チェックで自転車が予約不可だった
    /// （期間は重ならないが、別のアクティブ予約が自転車を占有している）
    #[error("bike is not available for booking")]
    BikeUnavailable,

    /// 期待した現在状態と保存済み状態が一致しなかった（並行遷移）
    #[error("booking status changed concurrently")]
    StaleStatus,

    /// 下層のI/Oエラー
    #[error("booking store I/O error")]
    Io(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, BookingStoreError>;

/// 予約ストアポート
///
/// 予約の永続化と、予約と自転車の利用可否フラグを同一の原子的な単位で
/// 書き込むトランザクション境界を抽象化する。予約は削除されない
/// （終端状態は恒久的な記録）。
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// IDで予約を取得する
    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// 自転車のアクティブ予約を取得する
    ///
    /// 重なりチェック（`domain::booking::find_conflict`）の入力に使用される。
    async fn active_for_bike(&self, bike_id: BikeId) -> Result<Vec<Booking>>;

    /// 新規予約を永続化する
    ///
    /// 単一の原子的な単位で以下を行う：
    /// 1. 対象自転車のアクティブ予約と候補期間の重なりを再チェック。
    ///    重なれば`PeriodConflict`。重ならなくても自転車が占有中なら
    ///    `BikeUnavailable`（1台につきアクティブ予約は同時に1件まで）
    /// 2. 予約を挿入
    /// 3. 自転車のis_availableをfalseに更新
    ///
    /// 同一自転車に対する並行作成はこの単位で直列化され、
    /// 二重予約が両方成功することはない。
    async fn insert_active(&self, booking: &Booking) -> Result<()>;

    /// 状態遷移を永続化する
    ///
    /// 保存済み状態が`expected`と一致する場合のみ予約を上書きし
    /// （compare-and-swap）、`effect`があれば自転車のis_availableを
    /// 同一の原子的な単位で更新する。不一致は`StaleStatus`。
    async fn apply_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
        effect: Option<AvailabilityEffect>,
    ) -> Result<()>;

    /// 顧客の予約を新しい順に取得する
    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Booking>>;

    /// 事業者の所有自転車に対する予約を新しい順に取得する
    async fn find_by_owner(&self, rental_service_id: RentalServiceId) -> Result<Vec<Booking>>;
}
