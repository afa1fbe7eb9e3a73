use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::BookingStatus;
use super::{BikeId, BookingId, Caller, CustomerId, GeoPoint};

/// コマンド：予約を作成する
///
/// 開始・終了は生の日時で受け取り、順序の検証（end > start）は
/// 予約作成操作の中で行う。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBooking {
    pub customer_id: CustomerId,
    pub bike_id: BikeId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：予約状態を変更する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBookingStatus {
    pub booking_id: BookingId,
    pub next_status: BookingStatus,
    pub caller: Caller,
    pub changed_at: DateTime<Utc>,
}
