use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BikeCondition, BikeId, BikeType, DailyRate, GeoPoint, RentalServiceId};

/// 自転車エンティティ
///
/// `is_available`は予約サービスのみが予約ライフサイクルに応じて更新する
/// 非正規化フラグ。カタログ側の更新経路（`BikeUpdate`）からは変更できない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    pub bike_id: BikeId,
    pub rental_service_id: RentalServiceId,
    pub model: String,
    pub bike_type: BikeType,
    pub condition: BikeCondition,
    pub price_per_day: DailyRate,
    pub location: GeoPoint,
    pub is_available: bool,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 新規登録の内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeDraft {
    pub model: String,
    pub bike_type: BikeType,
    pub condition: BikeCondition,
    pub price_per_day: DailyRate,
    pub location: GeoPoint,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub description: Option<String>,
}

/// 許可リスト方式の更新内容
///
/// 更新可能なフィールドだけを列挙する。`is_available`と`rental_service_id`は
/// このパスからは変更不可（予約由来の不変条件を汎用更新で壊さないため）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BikeUpdate {
    pub model: Option<String>,
    pub bike_type: Option<BikeType>,
    pub condition: Option<BikeCondition>,
    pub price_per_day: Option<DailyRate>,
    pub location: Option<GeoPoint>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub description: Option<String>,
}

/// 純粋関数：自転車を登録する
///
/// ビジネスルール：
/// - 登録直後は予約可能（is_available = true）
/// - 所有者は登録した事業者
///
/// 副作用なし。新しいBikeを返す。
pub fn register_bike(
    rental_service_id: RentalServiceId,
    draft: BikeDraft,
    registered_at: DateTime<Utc>,
) -> Bike {
    Bike {
        bike_id: BikeId::new(),
        rental_service_id,
        model: draft.model,
        bike_type: draft.bike_type,
        condition: draft.condition,
        price_per_day: draft.price_per_day,
        location: draft.location,
        is_available: true,
        images: draft.images,
        features: draft.features,
        description: draft.description,
        created_at: registered_at,
    }
}

/// 純粋関数：許可リスト方式で自転車を更新する
///
/// 指定されたフィールドだけを上書きし、それ以外は現状を維持する。
/// `is_available`・`rental_service_id`・`created_at`はこの関数では変化しない。
///
/// 副作用なし。新しいBikeを返す。
pub fn apply_update(bike: &Bike, update: BikeUpdate) -> Bike {
    Bike {
        model: update.model.unwrap_or_else(|| bike.model.clone()),
        bike_type: update.bike_type.unwrap_or(bike.bike_type),
        condition: update.condition.unwrap_or(bike.condition),
        price_per_day: update.price_per_day.unwrap_or(bike.price_per_day),
        location: update.location.unwrap_or(bike.location),
        images: update.images.unwrap_or_else(|| bike.images.clone()),
        features: update.features.unwrap_or_else(|| bike.features.clone()),
        description: update.description.or_else(|| bike.description.clone()),
        ..bike.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bike() -> Bike {
        register_bike(
            RentalServiceId::new(),
            BikeDraft {
                model: "Trailblazer 900".to_string(),
                bike_type: BikeType::Mountain,
                condition: BikeCondition::Good,
                price_per_day: DailyRate::new(1500).unwrap(),
                location: GeoPoint::new(139.767, 35.681),
                images: vec!["front.jpg".to_string()],
                features: vec!["disc brakes".to_string()],
                description: Some("Hardtail for trails".to_string()),
            },
            Utc::now(),
        )
    }

    // TDD: register_bike() のテスト
    #[test]
    fn test_register_bike_is_available_by_default() {
        let bike = sample_bike();
        assert!(bike.is_available);
    }

    #[test]
    fn test_register_bike_keeps_owner() {
        let owner = RentalServiceId::new();
        let draft = BikeDraft {
            model: "City 3".to_string(),
            bike_type: BikeType::Hybrid,
            condition: BikeCondition::Excellent,
            price_per_day: DailyRate::new(800).unwrap(),
            location: GeoPoint::new(135.5, 34.7),
            images: vec![],
            features: vec![],
            description: None,
        };

        let bike = register_bike(owner, draft, Utc::now());
        assert_eq!(bike.rental_service_id, owner);
    }

    // TDD: apply_update() のテスト
    #[test]
    fn test_apply_update_overwrites_listed_fields() {
        let bike = sample_bike();
        let update = BikeUpdate {
            model: Some("Trailblazer 950".to_string()),
            price_per_day: Some(DailyRate::new(1800).unwrap()),
            ..BikeUpdate::default()
        };

        let updated = apply_update(&bike, update);

        assert_eq!(updated.model, "Trailblazer 950");
        assert_eq!(updated.price_per_day.value(), 1800);
        // 指定しなかったフィールドは維持される
        assert_eq!(updated.bike_type, bike.bike_type);
        assert_eq!(updated.features, bike.features);
    }

    #[test]
    fn test_apply_update_never_touches_availability_or_owner() {
        let mut bike = sample_bike();
        bike.is_available = false;

        let update = BikeUpdate {
            model: Some("Renamed".to_string()),
            ..BikeUpdate::default()
        };

        let updated = apply_update(&bike, update);

        // 予約サービスが下ろしたフラグは汎用更新では立ち上がらない
        assert!(!updated.is_available);
        assert_eq!(updated.rental_service_id, bike.rental_service_id);
        assert_eq!(updated.created_at, bike.created_at);
    }

    #[test]
    fn test_apply_update_empty_update_is_identity() {
        let bike = sample_bike();
        let updated = apply_update(&bike, BikeUpdate::default());
        assert_eq!(updated, bike);
    }
}
