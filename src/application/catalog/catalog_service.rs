use crate::domain::bike::{Bike, BikeDraft, BikeUpdate, apply_update, register_bike as new_bike};
use crate::domain::value_objects::{BikeId, BikeType, GeoPoint, RentalServiceId};
use crate::ports::bike_store::{BikeSearch, BikeStore, NearFilter};
use crate::ports::owner_directory::{OwnerDirectory, OwnerProfile};
use serde::Serialize;
use std::sync::Arc;

use super::errors::{CatalogApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub bike_store: Arc<dyn BikeStore>,
    pub owner_directory: Arc<dyn OwnerDirectory>,
}

/// カタログ検索条件（外部向け）
///
/// 半径はキロメートル単位で受け取り、ストアへはメートルに換算して渡す。
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub bike_type: Option<BikeType>,
    pub min_price_per_day: Option<i64>,
    pub max_price_per_day: Option<i64>,
    pub near: Option<(GeoPoint, f64)>,
}

/// 一覧の1件：自転車と所有者の最小プロフィール
#[derive(Debug, Clone, Serialize)]
pub struct BikeListing {
    pub bike: Bike,
    pub owner: Option<OwnerProfile>,
}

/// 所有者プロフィールを並行に解決するヘルパー関数
///
/// list_bikes, get_bikeで共通利用される。
async fn resolve_listing(
    owner_directory: &Arc<dyn OwnerDirectory>,
    bike: Bike,
) -> Result<BikeListing> {
    let owner = owner_directory
        .profile(bike.rental_service_id)
        .await
        .map_err(CatalogApplicationError::OwnerDirectoryError)?;

    Ok(BikeListing { bike, owner })
}

/// カタログを検索する（純粋な関数）
///
/// ビジネスルール：
/// - 予約可能な自転車（is_available = true）だけを返す
/// - 登録の新しい順に並べる
/// - 近傍検索の半径はキロメートルで指定され、メートルに換算される
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `filter` - 検索条件
///
/// # 戻り値
/// 所有者プロフィールを解決済みの一覧
pub async fn list_bikes(
    deps: &ServiceDependencies,
    filter: CatalogFilter,
) -> Result<Vec<BikeListing>> {
    // 1. 検索条件をストアの契約に変換（km → m）
    let search = BikeSearch {
        bike_type: filter.bike_type,
        min_price_per_day: filter.min_price_per_day,
        max_price_per_day: filter.max_price_per_day,
        near: filter.near.map(|(center, radius_km)| NearFilter {
            center,
            radius_meters: radius_km * 1000.0,
        }),
    };

    // 2. ストアで検索
    let bikes = deps
        .bike_store
        .search(&search)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?;

    // 3. 所有者プロフィールを並行に解決
    futures::future::try_join_all(
        bikes
            .into_iter()
            .map(|bike| resolve_listing(&deps.owner_directory, bike)),
    )
    .await
}

/// 自転車を1台取得する（純粋な関数）
pub async fn get_bike(deps: &ServiceDependencies, bike_id: BikeId) -> Result<BikeListing> {
    let bike = deps
        .bike_store
        .get(bike_id)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?
        .ok_or(CatalogApplicationError::BikeNotFound)?;

    resolve_listing(&deps.owner_directory, bike).await
}

/// 自転車を登録する（純粋な関数）
///
/// ビジネスルール：
/// - 所有者は登録した事業者
/// - 登録直後は予約可能
pub async fn register_bike(
    deps: &ServiceDependencies,
    rental_service_id: RentalServiceId,
    draft: BikeDraft,
) -> Result<Bike> {
    let bike = new_bike(rental_service_id, draft, chrono::Utc::now());

    deps.bike_store
        .insert(&bike)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?;

    Ok(bike)
}

/// 自転車を更新する（純粋な関数）
///
/// ビジネスルール：
/// - 所有事業者だけが更新できる
/// - 更新は許可リスト方式（`BikeUpdate`）。is_availableと所有者は
///   この経路からは変更できない
pub async fn update_bike(
    deps: &ServiceDependencies,
    rental_service_id: RentalServiceId,
    bike_id: BikeId,
    update: BikeUpdate,
) -> Result<Bike> {
    // 1. 対象の取得と所有者確認
    let bike = deps
        .bike_store
        .get(bike_id)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?
        .ok_or(CatalogApplicationError::BikeNotFound)?;

    if bike.rental_service_id != rental_service_id {
        return Err(CatalogApplicationError::Forbidden);
    }

    // 2. ドメイン層の純粋関数で許可リストを適用
    let updated = apply_update(&bike, update);

    // 3. 保存
    deps.bike_store
        .update(&updated)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?;

    Ok(updated)
}

/// 自転車を削除する（純粋な関数）
///
/// ビジネスルール：
/// - 所有事業者だけが削除できる
/// - 予約記録は削除されず、そのまま残る
pub async fn remove_bike(
    deps: &ServiceDependencies,
    rental_service_id: RentalServiceId,
    bike_id: BikeId,
) -> Result<()> {
    let bike = deps
        .bike_store
        .get(bike_id)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?
        .ok_or(CatalogApplicationError::BikeNotFound)?;

    if bike.rental_service_id != rental_service_id {
        return Err(CatalogApplicationError::Forbidden);
    }

    deps.bike_store
        .delete(bike_id)
        .await
        .map_err(CatalogApplicationError::BikeStoreError)?;

    Ok(())
}
