use crate::application::booking::{
    self, BookingApplicationError, create_booking as execute_create_booking,
    get_booking as execute_get_booking, list_customer_bookings, list_owner_bookings,
    transition_booking_status,
};
use crate::application::catalog::{
    self, CatalogApplicationError, CatalogFilter, get_bike as execute_get_bike,
    list_bikes as execute_list_bikes, register_bike as execute_register_bike,
    remove_bike as execute_remove_bike, update_bike as execute_update_bike,
};
use crate::domain::commands::ChangeBookingStatus;
use crate::domain::value_objects::{
    BikeId, BikeType, BookingId, Caller, CustomerId, GeoPoint, RentalServiceId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    auth::CallerIdentity,
    error::ApiError,
    types::{
        BikeResponse, BookingResponse, ChangeStatusRequest, CreateBookingRequest, ListBikesQuery,
        RegisterBikeRequest, UpdateBikeRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub booking_deps: booking::ServiceDependencies,
    pub catalog_deps: catalog::ServiceDependencies,
}

// ============================================================================
// ロールゲート（上流ゲートウェイが解決したロールの入口チェック）
// ============================================================================

fn require_customer(caller: Caller) -> Result<CustomerId, ApiError> {
    match caller {
        Caller::Customer(customer_id) => Ok(customer_id),
        Caller::RentalService(_) => Err(ApiError::Booking(BookingApplicationError::Forbidden)),
    }
}

fn require_rental_service(caller: Caller) -> Result<RentalServiceId, ApiError> {
    match caller {
        Caller::RentalService(rental_service_id) => Ok(rental_service_id),
        Caller::Customer(_) => Err(ApiError::Catalog(CatalogApplicationError::Forbidden)),
    }
}

/// 「経度,緯度」形式の中心点をパースする
fn parse_location(raw: &str) -> Result<GeoPoint, ApiError> {
    let mut parts = raw.splitn(2, ',');
    let longitude = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
    let latitude = parts.next().and_then(|s| s.trim().parse::<f64>().ok());

    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Ok(GeoPoint::new(longitude, latitude)),
        _ => Err(ApiError::BadRequest(
            "location must be 'longitude,latitude'".to_string(),
        )),
    }
}

// ============================================================================
// Catalog handlers
// ============================================================================

/// GET /bikes - カタログ検索
///
/// クエリパラメータ:
/// - bike_type: 車種（mountain / road / hybrid / electric）
/// - min_price, max_price: 日額料金の範囲
/// - location + radius: 「経度,緯度」の中心点とkm単位の半径（両方必須）
///
/// 予約可能な自転車だけが登録の新しい順に返る。
pub async fn list_bikes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBikesQuery>,
) -> Result<Json<Vec<BikeResponse>>, ApiError> {
    let bike_type = query
        .bike_type
        .as_deref()
        .map(str::parse::<BikeType>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    // 近傍検索は中心点と半径の両方が揃ったときだけ有効
    let near = match (query.location.as_deref(), query.radius) {
        (Some(raw), Some(radius_km)) => Some((parse_location(raw)?, radius_km)),
        _ => None,
    };

    let filter = CatalogFilter {
        bike_type,
        min_price_per_day: query.min_price,
        max_price_per_day: query.max_price,
        near,
    };

    let listings = execute_list_bikes(&state.catalog_deps, filter).await?;

    Ok(Json(listings.into_iter().map(BikeResponse::from).collect()))
}

/// GET /bikes/:id - 自転車詳細を取得
pub async fn get_bike(
    State(state): State<Arc<AppState>>,
    Path(bike_id): Path<Uuid>,
) -> Result<Json<BikeResponse>, ApiError> {
    let listing = execute_get_bike(&state.catalog_deps, BikeId::from_uuid(bike_id)).await?;

    Ok(Json(BikeResponse::from(listing)))
}

/// POST /bikes - 自転車を登録（事業者のみ）
pub async fn register_bike(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(req): Json<RegisterBikeRequest>,
) -> Result<(StatusCode, Json<BikeResponse>), ApiError> {
    let rental_service_id = require_rental_service(caller)?;
    let draft = req.to_draft().map_err(ApiError::BadRequest)?;

    let bike = execute_register_bike(&state.catalog_deps, rental_service_id, draft).await?;

    Ok((StatusCode::CREATED, Json(BikeResponse::from(bike))))
}

/// PUT /bikes/:id - 自転車を更新（所有事業者のみ）
///
/// 許可リスト方式の更新。is_availableと所有者はこの経路では変更できない。
pub async fn update_bike(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(bike_id): Path<Uuid>,
    Json(req): Json<UpdateBikeRequest>,
) -> Result<Json<BikeResponse>, ApiError> {
    let rental_service_id = require_rental_service(caller)?;
    let update = req.to_update().map_err(ApiError::BadRequest)?;

    let bike = execute_update_bike(
        &state.catalog_deps,
        rental_service_id,
        BikeId::from_uuid(bike_id),
        update,
    )
    .await?;

    Ok(Json(BikeResponse::from(bike)))
}

/// DELETE /bikes/:id - 自転車を削除（所有事業者のみ）
///
/// 予約記録は恒久的な記録として残る。
pub async fn delete_bike(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(bike_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rental_service_id = require_rental_service(caller)?;

    execute_remove_bike(
        &state.catalog_deps,
        rental_service_id,
        BikeId::from_uuid(bike_id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Booking handlers
// ============================================================================

/// POST /bookings - 新しい予約を作成（顧客のみ）
///
/// 強制されるビジネスルール:
/// - 期間はend > startであること
/// - 自転車が存在し、予約可能であること
/// - 既存のアクティブ予約と期間が重ならないこと
/// - 合計金額は請求日数（切り上げ）× 日額料金
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let customer_id = require_customer(caller)?;
    let cmd = req.to_command(customer_id);

    let booking = execute_create_booking(&state.booking_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

/// PATCH /bookings/:id/status - 予約状態を遷移
///
/// 強制されるビジネスルール:
/// - 呼び出し元が予約の顧客本人か、対象自転車の所有事業者であること
/// - 遷移表にある遷移だけを受け付ける（終端状態からは遷移不可）
/// - 利用可否フラグは遷移と同一の原子的な単位で更新される
pub async fn change_booking_status(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let cmd = ChangeBookingStatus {
        booking_id: BookingId::from_uuid(booking_id),
        next_status: req.status,
        caller,
        changed_at: chrono::Utc::now(),
    };

    let booking = transition_booking_status(&state.booking_deps, cmd).await?;

    Ok(Json(BookingResponse::from(booking)))
}

/// GET /bookings/:id - 予約詳細を取得
///
/// 予約の顧客本人か、対象自転車の所有事業者だけが閲覧できる。
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking =
        execute_get_booking(&state.booking_deps, caller, BookingId::from_uuid(booking_id)).await?;

    Ok(Json(BookingResponse::from(booking)))
}

/// GET /bookings/my - 顧客自身の予約一覧（新しい順）
pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let customer_id = require_customer(caller)?;

    let bookings = list_customer_bookings(&state.booking_deps, customer_id).await?;

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

/// GET /bookings/rental-service - 事業者の所有自転車に対する予約一覧（新しい順）
pub async fn list_rental_service_bookings(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let rental_service_id = match caller {
        Caller::RentalService(id) => id,
        Caller::Customer(_) => {
            return Err(ApiError::Booking(BookingApplicationError::Forbidden));
        }
    };

    let bookings = list_owner_bookings(&state.booking_deps, rental_service_id).await?;

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}
