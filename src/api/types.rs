use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::catalog::BikeListing;
use crate::domain::bike::{Bike, BikeDraft, BikeUpdate};
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::commands::CreateBooking;
use crate::domain::value_objects::{
    BikeCondition, BikeId, BikeType, CustomerId, DailyRate, GeoPoint,
};

/// カタログ検索のクエリパラメータ
///
/// `location`は「経度,緯度」形式、`radius`はキロメートル単位。
/// 近傍検索は両方が指定されたときだけ有効になる。
#[derive(Debug, Deserialize)]
pub struct ListBikesQuery {
    /// 車種でフィルタリング
    pub bike_type: Option<String>,
    /// 日額料金の下限
    pub min_price: Option<i64>,
    /// 日額料金の上限
    pub max_price: Option<i64>,
    /// 近傍検索の中心点（"経度,緯度"）
    pub location: Option<String>,
    /// 近傍検索の半径（km）
    pub radius: Option<f64>,
}

/// 一覧・詳細に埋め込む所有者の最小プロフィール
#[derive(Debug, Serialize)]
pub struct OwnerSummary {
    pub business_name: String,
    pub business_address: String,
}

/// 自転車レスポンス（GET /bikes と GET /bikes/:id）
#[derive(Debug, Serialize)]
pub struct BikeResponse {
    pub bike_id: Uuid,
    pub rental_service_id: Uuid,
    pub model: String,
    pub bike_type: String,
    pub condition: String,
    pub price_per_day: i64,
    pub location: GeoPoint,
    pub is_available: bool,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner: Option<OwnerSummary>,
}

impl From<BikeListing> for BikeResponse {
    fn from(listing: BikeListing) -> Self {
        let owner = listing.owner.map(|profile| OwnerSummary {
            business_name: profile.business_name,
            business_address: profile.business_address,
        });

        let bike = listing.bike;
        Self {
            bike_id: bike.bike_id.value(),
            rental_service_id: bike.rental_service_id.value(),
            model: bike.model,
            bike_type: bike.bike_type.as_str().to_string(),
            condition: bike.condition.as_str().to_string(),
            price_per_day: bike.price_per_day.value(),
            location: bike.location,
            is_available: bike.is_available,
            images: bike.images,
            features: bike.features,
            description: bike.description,
            created_at: bike.created_at,
            owner,
        }
    }
}

impl From<Bike> for BikeResponse {
    fn from(bike: Bike) -> Self {
        Self::from(BikeListing { bike, owner: None })
    }
}

/// 予約レスポンス
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub bike_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub total_price: i64,
    pub payment_status: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.booking_id.value(),
            customer_id: booking.customer_id.value(),
            bike_id: booking.bike_id.value(),
            start_date: booking.period.start(),
            end_date: booking.period.end(),
            status: booking.status.as_str().to_string(),
            total_price: booking.total_price,
            payment_status: booking.payment_status.as_str().to_string(),
            pickup: booking.pickup,
            dropoff: booking.dropoff,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// 予約作成リクエスト（POST /bookings）
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub bike_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
}

impl CreateBookingRequest {
    pub fn to_command(&self, customer_id: CustomerId) -> CreateBooking {
        CreateBooking {
            customer_id,
            bike_id: BikeId::from_uuid(self.bike_id),
            start: self.start_date,
            end: self.end_date,
            pickup: self.pickup,
            dropoff: self.dropoff,
            requested_at: Utc::now(),
        }
    }
}

/// 状態変更リクエスト（PATCH /bookings/:id/status）
///
/// 列挙値以外はデシリアライズの時点で拒否される。
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: BookingStatus,
}

/// 自転車登録リクエスト（POST /bikes）
#[derive(Debug, Deserialize)]
pub struct RegisterBikeRequest {
    pub model: String,
    pub bike_type: BikeType,
    pub condition: BikeCondition,
    pub price_per_day: i64,
    pub location: GeoPoint,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub description: Option<String>,
}

impl RegisterBikeRequest {
    /// ドメインの登録内容に変換する
    ///
    /// # エラー
    /// price_per_dayが正の値でない場合
    pub fn to_draft(self) -> Result<BikeDraft, String> {
        let price_per_day = DailyRate::new(self.price_per_day)
            .map_err(|_| "price_per_day must be positive".to_string())?;

        Ok(BikeDraft {
            model: self.model,
            bike_type: self.bike_type,
            condition: self.condition,
            price_per_day,
            location: self.location,
            images: self.images,
            features: self.features,
            description: self.description,
        })
    }
}

/// 自転車更新リクエスト（PUT /bikes/:id）
///
/// 許可リスト方式：ここに無いフィールド（is_availableや所有者）は
/// この経路からは変更できない。
#[derive(Debug, Deserialize)]
pub struct UpdateBikeRequest {
    pub model: Option<String>,
    pub bike_type: Option<BikeType>,
    pub condition: Option<BikeCondition>,
    pub price_per_day: Option<i64>,
    pub location: Option<GeoPoint>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub description: Option<String>,
}

impl UpdateBikeRequest {
    /// ドメインの更新内容に変換する
    ///
    /// # エラー
    /// price_per_dayが正の値でない場合
    pub fn to_update(self) -> Result<BikeUpdate, String> {
        let price_per_day = self
            .price_per_day
            .map(DailyRate::new)
            .transpose()
            .map_err(|_| "price_per_day must be positive".to_string())?;

        Ok(BikeUpdate {
            model: self.model,
            bike_type: self.bike_type,
            condition: self.condition,
            price_per_day,
            location: self.location,
            images: self.images,
            features: self.features,
            description: self.description,
        })
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
