#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 自転車ID - カタログ管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BikeId(Uuid);

impl BikeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BikeId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約ID - 予約管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 顧客ID - アカウント管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

/// レンタル事業者ID - アカウント管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalServiceId(Uuid);

impl RentalServiceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for RentalServiceId {
    fn default() -> Self {
        Self::new()
    }
}

/// 認証済み呼び出し元
///
/// 上流の認証ゲートウェイが解決したIDとロールをコアに渡すための型。
/// コア自身は認証を実装しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Caller {
    Customer(CustomerId),
    RentalService(RentalServiceId),
}

/// 地理座標（経度・緯度）
///
/// 近傍検索と受け渡し地点の表現に使用される。
/// 座標ペアの存在は境界層のデシリアライズが保証する。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// 日額料金エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// 正の値でない
    NotPositive,
}

/// 日額料金（通貨の最小単位）
///
/// 不変条件：料金は正の値。
/// 型システムでこの制約を強制し、0以下の料金を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyRate(i64);

impl DailyRate {
    /// 新規作成
    ///
    /// # エラー
    /// 0以下の場合は`RateError::NotPositive`を返す
    pub fn new(amount: i64) -> Result<Self, RateError> {
        if amount <= 0 {
            return Err(RateError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// 現在の金額
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for DailyRate {
    type Error = RateError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// 貸出期間エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// 終了日時が開始日時より後でない
    EndNotAfterStart,
}

/// 貸出期間
///
/// 不変条件：end > start。
/// 型システムでこの制約を強制し、不正な期間を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RentalPeriod {
    /// 新規作成
    ///
    /// # エラー
    /// `end <= start`の場合は`PeriodError::EndNotAfterStart`を返す
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PeriodError> {
        if end <= start {
            return Err(PeriodError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// 車種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeType {
    Mountain,
    Road,
    Hybrid,
    Electric,
}

impl BikeType {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeType::Mountain => "mountain",
            BikeType::Road => "road",
            BikeType::Hybrid => "hybrid",
            BikeType::Electric => "electric",
        }
    }
}

impl std::str::FromStr for BikeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mountain" => Ok(BikeType::Mountain),
            "road" => Ok(BikeType::Road),
            "hybrid" => Ok(BikeType::Hybrid),
            "electric" => Ok(BikeType::Electric),
            _ => Err(format!("Invalid bike type: {}", s)),
        }
    }
}

/// 車両状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeCondition {
    Excellent,
    Good,
    Fair,
    NeedsMaintenance,
}

impl BikeCondition {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeCondition::Excellent => "excellent",
            BikeCondition::Good => "good",
            BikeCondition::Fair => "fair",
            BikeCondition::NeedsMaintenance => "needs_maintenance",
        }
    }
}

impl std::str::FromStr for BikeCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(BikeCondition::Excellent),
            "good" => Ok(BikeCondition::Good),
            "fair" => Ok(BikeCondition::Fair),
            "needs_maintenance" => Ok(BikeCondition::NeedsMaintenance),
            _ => Err(format!("Invalid bike condition: {}", s)),
        }
    }
}

/// 支払い状態
///
/// 予約状態とは独立したライフサイクルを持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // TDD: RentalPeriod のテスト
    #[test]
    fn test_rental_period_new_success() {
        let start = Utc::now();
        let end = start + Duration::days(2);

        let period = RentalPeriod::new(start, end);
        assert!(period.is_ok());

        let period = period.unwrap();
        assert_eq!(period.start(), start);
        assert_eq!(period.end(), end);
    }

    #[test]
    fn test_rental_period_rejects_end_equal_to_start() {
        let start = Utc::now();

        let result = RentalPeriod::new(start, start);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), PeriodError::EndNotAfterStart);
    }

    #[test]
    fn test_rental_period_rejects_end_before_start() {
        let start = Utc::now();
        let end = start - Duration::hours(1);

        let result = RentalPeriod::new(start, end);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), PeriodError::EndNotAfterStart);
    }

    // TDD: DailyRate のテスト
    #[test]
    fn test_daily_rate_new_success() {
        let rate = DailyRate::new(1500);
        assert!(rate.is_ok());
        assert_eq!(rate.unwrap().value(), 1500);
    }

    #[test]
    fn test_daily_rate_rejects_zero() {
        let result = DailyRate::new(0);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), RateError::NotPositive);
    }

    #[test]
    fn test_daily_rate_rejects_negative() {
        let result = DailyRate::new(-10);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), RateError::NotPositive);
    }

    #[test]
    fn test_daily_rate_try_from() {
        assert!(DailyRate::try_from(1).is_ok());
        assert!(DailyRate::try_from(0).is_err());
    }

    // ID value objects のテスト
    #[test]
    fn test_bike_id_creation() {
        let id1 = BikeId::new();
        let id2 = BikeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_booking_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = BookingId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_customer_id_creation() {
        let id1 = CustomerId::new();
        let id2 = CustomerId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rental_service_id_creation() {
        let id1 = RentalServiceId::new();
        let id2 = RentalServiceId::new();
        assert_ne!(id1, id2);
    }

    // Caller のワイヤ表現テスト
    #[test]
    fn test_caller_serializes_with_role_tag() {
        let customer_id = CustomerId::new();
        let json = serde_json::to_value(Caller::Customer(customer_id)).unwrap();
        assert_eq!(json["role"], "customer");
        assert_eq!(json["id"], customer_id.value().to_string());

        let rental_service_id = RentalServiceId::new();
        let json = serde_json::to_value(Caller::RentalService(rental_service_id)).unwrap();
        assert_eq!(json["role"], "rental_service");
    }

    // enum のパーステスト
    #[test]
    fn test_bike_type_round_trip() {
        for s in ["mountain", "road", "hybrid", "electric"] {
            let parsed: BikeType = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("tandem".parse::<BikeType>().is_err());
    }

    #[test]
    fn test_bike_condition_round_trip() {
        for s in ["excellent", "good", "fair", "needs_maintenance"] {
            let parsed: BikeCondition = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("broken".parse::<BikeCondition>().is_err());
    }

    #[test]
    fn test_payment_status_round_trip() {
        for s in ["pending", "paid", "refunded"] {
            let parsed: PaymentStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("charged".parse::<PaymentStatus>().is_err());
    }
}
