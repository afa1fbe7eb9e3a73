use thiserror::Error;

/// 予約管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookingApplicationError {
    /// 自転車が存在しない
    #[error("Bike not found")]
    BikeNotFound,

    /// 自転車が予約不可
    #[error("Bike is not available for booking")]
    BikeUnavailable,

    /// 期間が既存のアクティブ予約と重なる
    #[error("Bike is already booked for an overlapping period")]
    PeriodConflict,

    /// 期間が不正（end <= start）
    #[error("Rental period end must be after start")]
    InvalidPeriod,

    /// 予約が見つからない
    #[error("Booking not found")]
    BookingNotFound,

    /// 呼び出し元にこの予約・自転車への権限がない
    #[error("Caller is not allowed to operate on this booking")]
    Forbidden,

    /// 不正な状態遷移（例: 終端状態からの遷移）
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// 並行する操作で状態が変わった
    #[error("Booking was modified concurrently")]
    ConcurrentUpdate,

    /// BikeStoreのエラー
    #[error("Bike store error")]
    BikeStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookingStoreのエラー
    #[error("Booking store error")]
    BookingStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookingApplicationError>;
