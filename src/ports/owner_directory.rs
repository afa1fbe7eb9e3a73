use crate::domain::value_objects::RentalServiceId;
use async_trait::async_trait;
use serde::Serialize;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 事業者プロフィール（一覧表示用の最小フィールド）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerProfile {
    pub rental_service_id: RentalServiceId,
    pub business_name: String,
    pub business_address: String,
}

/// 事業者ディレクトリポート
///
/// カタログコンテキストとアカウント管理コンテキストの境界を維持する。
/// カタログ側はRentalServiceIdのみを知り、アカウント詳細は知らない。
#[allow(dead_code)]
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// 事業者の最小プロフィールを取得する
    ///
    /// カタログ一覧・詳細で所有者情報を解決するために使用される。
    async fn profile(&self, rental_service_id: RentalServiceId) -> Result<Option<OwnerProfile>>;
}
