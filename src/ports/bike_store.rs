use crate::domain::bike::Bike;
use crate::domain::value_objects::{BikeId, BikeType, GeoPoint};
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// カタログ検索の条件
///
/// 検索は常に予約可能な自転車（is_available = true）に限定される。
#[derive(Debug, Clone, Default)]
pub struct BikeSearch {
    /// 車種でフィルタリング
    pub bike_type: Option<BikeType>,
    /// 日額料金の下限
    pub min_price_per_day: Option<i64>,
    /// 日額料金の上限
    pub max_price_per_day: Option<i64>,
    /// 近傍検索（中心点と半径）
    pub near: Option<NearFilter>,
}

/// 近傍検索の条件
///
/// 半径はメートル単位。キロメートルからの換算は呼び出し側で行う。
#[derive(Debug, Clone, Copy)]
pub struct NearFilter {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

/// 自転車ストアポート
///
/// カタログの永続化を抽象化する。地理インデックスの実装は
/// ストア実装の責務で、ここでは距離クエリの契約だけを定める。
#[allow(dead_code)]
#[async_trait]
pub trait BikeStore: Send + Sync {
    /// IDで自転車を取得する
    async fn get(&self, bike_id: BikeId) -> Result<Option<Bike>>;

    /// カタログを検索する
    ///
    /// is_available = true の自転車だけを、created_at降順で返す。
    async fn search(&self, filter: &BikeSearch) -> Result<Vec<Bike>>;

    /// 自転車を登録する
    async fn insert(&self, bike: &Bike) -> Result<()>;

    /// 自転車のカタログフィールドを上書き保存する
    ///
    /// 更新可能フィールドの制限はドメイン層（`BikeUpdate`）が強制済み。
    /// is_availableはこの操作では書き込まれない（予約ストアの責務）。
    async fn update(&self, bike: &Bike) -> Result<()>;

    /// 自転車を削除する
    ///
    /// 削除対象が存在した場合にtrueを返す。
    async fn delete(&self, bike_id: BikeId) -> Result<bool>;
}
