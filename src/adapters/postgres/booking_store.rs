use crate::domain::booking::{AvailabilityEffect, Booking, BookingStatus};
use crate::domain::value_objects::{
    BikeId, BookingId, CustomerId, GeoPoint, PaymentStatus, RentalPeriod, RentalServiceId,
};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, BookingStoreError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// sqlxのエラーをストアのI/Oエラーに包む
fn io_err(e: sqlx::Error) -> BookingStoreError {
    BookingStoreError::Io(Box::new(e))
}

/// 不正な永続データをI/Oエラーとして報告する
fn invalid_data(msg: impl Into<String>) -> BookingStoreError {
    BookingStoreError::Io(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        msg.into(),
    )))
}

/// PostgreSQLの行データをBookingに変換する
///
/// status / payment_status の文字列からの変換と、期間の
/// 値オブジェクト化でエラーハンドリングを行う。
fn map_row_to_booking(row: &PgRow) -> Result<Booking> {
    let status_str: &str = row.get("status");
    let status = BookingStatus::from_str(status_str).map_err(invalid_data)?;

    let payment_str: &str = row.get("payment_status");
    let payment_status = PaymentStatus::from_str(payment_str).map_err(invalid_data)?;

    let period = RentalPeriod::new(row.get("start_date"), row.get("end_date"))
        .map_err(|_| invalid_data("persisted period has end <= start"))?;

    Ok(Booking {
        booking_id: BookingId::from_uuid(row.get("booking_id")),
        customer_id: CustomerId::from_uuid(row.get("customer_id")),
        bike_id: BikeId::from_uuid(row.get("bike_id")),
        period,
        status,
        total_price: row.get("total_price"),
        payment_status,
        pickup: GeoPoint::new(row.get("pickup_longitude"), row.get("pickup_latitude")),
        dropoff: GeoPoint::new(row.get("dropoff_longitude"), row.get("dropoff_latitude")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// JOINを含むクエリでも曖昧にならないよう、常にテーブル名で修飾する
const SELECT_BOOKING_COLUMNS: &str = r#"
    bookings.booking_id,
    bookings.customer_id,
    bookings.bike_id,
    bookings.start_date,
    bookings.end_date,
    bookings.status,
    bookings.total_price,
    bookings.payment_status,
    bookings.pickup_longitude,
    bookings.pickup_latitude,
    bookings.dropoff_longitude,
    bookings.dropoff_latitude,
    bookings.created_at,
    bookings.updated_at
"#;

/// BookingStoreのPostgreSQL実装
///
/// 予約の書き込みと自転車の利用可否フラグの更新を単一トランザクションで
/// 行い、二重予約と並行遷移の競合を閉じる。
#[allow(dead_code)]
pub struct BookingStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl BookingStore {
    /// PostgreSQLコネクションプールから新しいBookingStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    /// IDで予約を取得
    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_BOOKING_COLUMNS} FROM bookings WHERE booking_id = $1"
        ))
        .bind(booking_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(io_err)?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    /// 自転車のアクティブ予約を取得
    ///
    /// (bike_id, status)の部分インデックスを使用する。
    async fn active_for_bike(&self, bike_id: BikeId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_BOOKING_COLUMNS}
            FROM bookings
            WHERE bike_id = $1
              AND status IN ('pending', 'confirmed', 'in_progress')
            ORDER BY start_date ASC
            "#
        ))
        .bind(bike_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(io_err)?;

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 新規予約の原子的な永続化
    ///
    /// 自転車行をFOR UPDATEでロックして同一自転車への作成を直列化し、
    /// ロック取得後にアクティブ予約との重なりを再チェックする。
    /// 挿入とis_available = FALSEへの更新は同一トランザクションでコミットされる。
    async fn insert_active(&self, booking: &Booking) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(io_err)?;

        let bike_row = sqlx::query("SELECT is_available FROM bikes WHERE bike_id = $1 FOR UPDATE")
            .bind(booking.bike_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(io_err)?;

        let Some(bike_row) = bike_row else {
            return Err(invalid_data("bike row disappeared before booking insert"));
        };

        // ロック下での確定的な重なりチェック（閉区間比較）
        let conflict = sqlx::query(
            r#"
            SELECT 1 AS hit
            FROM bookings
            WHERE bike_id = $1
              AND status IN ('pending', 'confirmed', 'in_progress')
              AND start_date <= $3
              AND end_date >= $2
            LIMIT 1
            "#,
        )
        .bind(booking.bike_id.value())
        .bind(booking.period.start())
        .bind(booking.period.end())
        .fetch_optional(&mut *tx)
        .await
        .map_err(io_err)?;

        if conflict.is_some() {
            return Err(BookingStoreError::PeriodConflict);
        }

        // 期間が重ならなくても、占有中の自転車には予約できない
        // （1台につきアクティブ予約は同時に1件まで）
        if !bike_row.get::<bool, _>("is_available") {
            return Err(BookingStoreError::BikeUnavailable);
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id,
                customer_id,
                bike_id,
                start_date,
                end_date,
                status,
                total_price,
                payment_status,
                pickup_longitude,
                pickup_latitude,
                dropoff_longitude,
                dropoff_latitude,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(booking.booking_id.value())
        .bind(booking.customer_id.value())
        .bind(booking.bike_id.value())
        .bind(booking.period.start())
        .bind(booking.period.end())
        .bind(booking.status.as_str())
        .bind(booking.total_price)
        .bind(booking.payment_status.as_str())
        .bind(booking.pickup.longitude)
        .bind(booking.pickup.latitude)
        .bind(booking.dropoff.longitude)
        .bind(booking.dropoff.latitude)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(io_err)?;

        sqlx::query("UPDATE bikes SET is_available = FALSE WHERE bike_id = $1")
            .bind(booking.bike_id.value())
            .execute(&mut *tx)
            .await
            .map_err(io_err)?;

        tx.commit().await.map_err(io_err)
    }

    /// 状態遷移の原子的な永続化
    ///
    /// 保存済み状態を期待値とするcompare-and-swapで上書きする。
    /// rows_affected == 0 は並行する遷移に敗れたことを意味する。
    async fn apply_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
        effect: Option<AvailabilityEffect>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(io_err)?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, payment_status = $3, updated_at = $4
            WHERE booking_id = $1 AND status = $5
            "#,
        )
        .bind(booking.booking_id.value())
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.updated_at)
        .bind(expected.as_str())
        .execute(&mut *tx)
        .await
        .map_err(io_err)?;

        if result.rows_affected() == 0 {
            return Err(BookingStoreError::StaleStatus);
        }

        if let Some(effect) = effect {
            let available = matches!(effect, AvailabilityEffect::MarkAvailable);
            sqlx::query("UPDATE bikes SET is_available = $2 WHERE bike_id = $1")
                .bind(booking.bike_id.value())
                .bind(available)
                .execute(&mut *tx)
                .await
                .map_err(io_err)?;
        }

        tx.commit().await.map_err(io_err)
    }

    /// 顧客の予約一覧（新しい順）
    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_BOOKING_COLUMNS}
            FROM bookings
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(io_err)?;

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 事業者の所有自転車に対する予約一覧（新しい順）
    async fn find_by_owner(&self, rental_service_id: RentalServiceId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_BOOKING_COLUMNS}
            FROM bookings
            JOIN bikes ON bikes.bike_id = bookings.bike_id
            WHERE bikes.rental_service_id = $1
            ORDER BY bookings.created_at DESC
            "#
        ))
        .bind(rental_service_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(io_err)?;

        rows.iter().map(map_row_to_booking).collect()
    }
}
