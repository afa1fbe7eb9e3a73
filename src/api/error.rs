use crate::application::booking::BookingApplicationError;
use crate::application::catalog::CatalogApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層の型付きエラーをラップし、HTTPレスポンスへの
/// マッピングを提供する。コアのエラー種別はここで初めてステータス
/// コードに変換される（コア自身は汎用の500に畳み込まない）。
#[derive(Debug)]
pub enum ApiError {
    /// クエリ・ボディの解釈に失敗した
    BadRequest(String),
    /// 予約管理ユースケースのエラー
    Booking(BookingApplicationError),
    /// カタログ管理ユースケースのエラー
    Catalog(CatalogApplicationError),
}

impl From<BookingApplicationError> for ApiError {
    fn from(err: BookingApplicationError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Catalog(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            // 400 Bad Request - 入力の形が解釈できない
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.as_str()),

            ApiError::Booking(err) => return booking_error_response(err),
            ApiError::Catalog(err) => return catalog_error_response(err),
        };

        let body = Json(ErrorResponse::new(code, message));
        (status, body).into_response()
    }
}

fn booking_error_response(err: BookingApplicationError) -> Response {
    let (status, code, message) = match err {
        // 404 Not Found - リクエストされたリソースが存在しない
        BookingApplicationError::BikeNotFound => {
            (StatusCode::NOT_FOUND, "BIKE_NOT_FOUND", "Bike not found")
        }
        BookingApplicationError::BookingNotFound => (
            StatusCode::NOT_FOUND,
            "BOOKING_NOT_FOUND",
            "Booking not found",
        ),

        // 403 Forbidden - 呼び出し元に権限がない
        BookingApplicationError::Forbidden => (
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "Caller is not allowed to operate on this booking",
        ),

        // 409 Conflict - 並行する予約・遷移との競合
        BookingApplicationError::PeriodConflict => (
            StatusCode::CONFLICT,
            "PERIOD_CONFLICT",
            "Bike is already booked for an overlapping period",
        ),
        BookingApplicationError::ConcurrentUpdate => (
            StatusCode::CONFLICT,
            "CONCURRENT_UPDATE",
            "Booking was modified concurrently, retry with fresh state",
        ),

        // 422 Unprocessable Entity - ビジネスルール違反
        BookingApplicationError::BikeUnavailable => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "BIKE_UNAVAILABLE",
            "Bike is not available for booking",
        ),
        BookingApplicationError::InvalidPeriod => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_PERIOD",
            "Rental period end must be after start",
        ),
        BookingApplicationError::InvalidTransition(ref msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_TRANSITION",
            msg.as_str(),
        ),

        // 500 Internal Server Error - システム障害
        // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
        BookingApplicationError::BikeStoreError(ref e) => {
            tracing::error!("Bike store error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BIKE_STORE_ERROR",
                "Failed to access bike store",
            )
        }
        BookingApplicationError::BookingStoreError(ref e) => {
            tracing::error!("Booking store error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BOOKING_STORE_ERROR",
                "Failed to access booking store",
            )
        }
    };

    let body = Json(ErrorResponse::new(code, message));
    (status, body).into_response()
}

fn catalog_error_response(err: CatalogApplicationError) -> Response {
    let (status, code, message) = match err {
        CatalogApplicationError::BikeNotFound => {
            (StatusCode::NOT_FOUND, "BIKE_NOT_FOUND", "Bike not found")
        }
        CatalogApplicationError::Forbidden => (
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "Caller does not own this bike",
        ),
        CatalogApplicationError::BikeStoreError(ref e) => {
            tracing::error!("Bike store error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BIKE_STORE_ERROR",
                "Failed to access bike store",
            )
        }
        CatalogApplicationError::OwnerDirectoryError(ref e) => {
            tracing::error!("Owner directory error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OWNER_DIRECTORY_ERROR",
                "Failed to resolve owner profile",
            )
        }
    };

    let body = Json(ErrorResponse::new(code, message));
    (status, body).into_response()
}
