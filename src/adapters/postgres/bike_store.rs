use crate::domain::bike::Bike;
use crate::domain::value_objects::{
    BikeCondition, BikeId, BikeType, DailyRate, GeoPoint, RentalServiceId,
};
use crate::ports::bike_store::{BikeSearch, BikeStore as BikeStoreTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// PostgreSQLの行データをBikeに変換する
///
/// bike_type / condition の文字列からの変換と、price_per_dayの
/// 値オブジェクト化でエラーハンドリングを行う。
fn map_row_to_bike(row: &PgRow) -> Result<Bike> {
    let bike_type_str: &str = row.get("bike_type");
    let bike_type = BikeType::from_str(bike_type_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    let condition_str: &str = row.get("condition");
    let condition = BikeCondition::from_str(condition_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    let price_raw: i64 = row.get("price_per_day");
    let price_per_day = DailyRate::new(price_raw).map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("price_per_day out of range: {}", price_raw),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Bike {
        bike_id: BikeId::from_uuid(row.get("bike_id")),
        rental_service_id: RentalServiceId::from_uuid(row.get("rental_service_id")),
        model: row.get("model"),
        bike_type,
        condition,
        price_per_day,
        location: GeoPoint::new(row.get("longitude"), row.get("latitude")),
        is_available: row.get("is_available"),
        images: row.get("images"),
        features: row.get("features"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    })
}

/// BikeStoreのPostgreSQL実装
///
/// 近傍検索はPostGISのgeography距離クエリを使用する
/// （地理インデックスの実装はデータベース側に委ねる）。
#[allow(dead_code)]
pub struct BikeStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl BikeStore {
    /// PostgreSQLコネクションプールから新しいBikeStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BikeStoreTrait for BikeStore {
    /// IDで自転車を取得
    async fn get(&self, bike_id: BikeId) -> Result<Option<Bike>> {
        let row = sqlx::query(
            r#"
            SELECT
                bike_id,
                rental_service_id,
                model,
                bike_type,
                condition,
                price_per_day,
                longitude,
                latitude,
                is_available,
                images,
                features,
                description,
                created_at
            FROM bikes
            WHERE bike_id = $1
            "#,
        )
        .bind(bike_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_bike).transpose()
    }

    /// カタログ検索
    ///
    /// 省略された条件はNULLで束縛し、SQL側で無効化する。
    /// 距離条件はST_DWithin（メートル単位のgeography比較）。
    async fn search(&self, filter: &BikeSearch) -> Result<Vec<Bike>> {
        let (center_lon, center_lat, radius_meters) = match filter.near {
            Some(near) => (
                Some(near.center.longitude),
                Some(near.center.latitude),
                Some(near.radius_meters),
            ),
            None => (None, None, None),
        };

        let rows = sqlx::query(
            r#"
            SELECT
                bike_id,
                rental_service_id,
                model,
                bike_type,
                condition,
                price_per_day,
                longitude,
                latitude,
                is_available,
                images,
                features,
                description,
                created_at
            FROM bikes
            WHERE is_available = TRUE
              AND ($1::text IS NULL OR bike_type = $1)
              AND ($2::bigint IS NULL OR price_per_day >= $2)
              AND ($3::bigint IS NULL OR price_per_day <= $3)
              AND (
                $4::double precision IS NULL
                OR ST_DWithin(
                    ST_MakePoint(longitude, latitude)::geography,
                    ST_MakePoint($4, $5)::geography,
                    $6
                )
              )
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.bike_type.map(|t| t.as_str()))
        .bind(filter.min_price_per_day)
        .bind(filter.max_price_per_day)
        .bind(center_lon)
        .bind(center_lat)
        .bind(radius_meters)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_bike).collect()
    }

    /// 自転車を登録
    async fn insert(&self, bike: &Bike) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bikes (
                bike_id,
                rental_service_id,
                model,
                bike_type,
                condition,
                price_per_day,
                longitude,
                latitude,
                is_available,
                images,
                features,
                description,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(bike.bike_id.value())
        .bind(bike.rental_service_id.value())
        .bind(&bike.model)
        .bind(bike.bike_type.as_str())
        .bind(bike.condition.as_str())
        .bind(bike.price_per_day.value())
        .bind(bike.location.longitude)
        .bind(bike.location.latitude)
        .bind(bike.is_available)
        .bind(&bike.images)
        .bind(&bike.features)
        .bind(&bike.description)
        .bind(bike.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// カタログフィールドの上書き保存
    ///
    /// is_availableは予約ストアが同一トランザクションで管理するため、
    /// ここでは書き込まない。
    async fn update(&self, bike: &Bike) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bikes
            SET
                model = $2,
                bike_type = $3,
                condition = $4,
                price_per_day = $5,
                longitude = $6,
                latitude = $7,
                images = $8,
                features = $9,
                description = $10
            WHERE bike_id = $1
            "#,
        )
        .bind(bike.bike_id.value())
        .bind(&bike.model)
        .bind(bike.bike_type.as_str())
        .bind(bike.condition.as_str())
        .bind(bike.price_per_day.value())
        .bind(bike.location.longitude)
        .bind(bike.location.latitude)
        .bind(&bike.images)
        .bind(&bike.features)
        .bind(&bike.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 自転車を削除
    async fn delete(&self, bike_id: BikeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bikes WHERE bike_id = $1")
            .bind(bike_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
