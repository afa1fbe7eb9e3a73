use crate::domain::value_objects::RentalServiceId;
use crate::ports::owner_directory::{OwnerDirectory as OwnerDirectoryTrait, OwnerProfile, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// OwnerDirectoryのモック実装
///
/// アカウント管理コンテキストは本コアの外部にあるため、
/// プロフィールをインメモリで保持する実装を提供する。
/// 事業者プロフィールを登録可能。
#[allow(dead_code)]
pub struct OwnerDirectory {
    profiles: Mutex<HashMap<RentalServiceId, OwnerProfile>>,
}

#[allow(dead_code)]
impl OwnerDirectory {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// テスト・起動時シード用にプロフィールを登録
    pub fn add_profile(&self, profile: OwnerProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.rental_service_id, profile);
    }
}

impl Default for OwnerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OwnerDirectoryTrait for OwnerDirectory {
    /// 登録済みプロフィールから解決する
    async fn profile(&self, rental_service_id: RentalServiceId) -> Result<Option<OwnerProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .get(&rental_service_id)
            .cloned())
    }
}
