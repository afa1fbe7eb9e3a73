use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use uuid::Uuid;

use super::types::ErrorResponse;
use crate::domain::value_objects::{Caller, CustomerId, RentalServiceId};

/// 上流の認証ゲートウェイが注入する呼び出し元IDのヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";
/// 上流の認証ゲートウェイが注入する呼び出し元ロールのヘッダー
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// 認証済み呼び出し元のエクストラクター
///
/// 認証そのものは上流のゲートウェイの責務で、
/// コアは検証済みのIDとロールをヘッダーで受け取るだけ。
/// ヘッダーが欠けている・解釈できない場合は401を返す。
pub struct CallerIdentity(pub Caller);

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("UNAUTHORIZED", message)),
    )
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("missing caller id header"))?;

        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| unauthorized("caller id header is not a valid UUID"))?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("missing caller role header"))?;

        let caller = match role {
            "customer" => Caller::Customer(CustomerId::from_uuid(user_id)),
            "rental_service" => Caller::RentalService(RentalServiceId::from_uuid(user_id)),
            _ => return Err(unauthorized("unknown caller role")),
        };

        Ok(CallerIdentity(caller))
    }
}
