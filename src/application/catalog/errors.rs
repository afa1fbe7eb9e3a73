use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    /// 自転車が存在しない
    #[error("Bike not found")]
    BikeNotFound,

    /// 呼び出し元がこの自転車の所有者でない
    #[error("Caller does not own this bike")]
    Forbidden,

    /// BikeStoreのエラー
    #[error("Bike store error")]
    BikeStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// OwnerDirectoryのエラー
    #[error("Owner directory error")]
    OwnerDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogApplicationError>;
