//! API request handlers for the catalog service.
//! Each module corresponds to one resource of the `/api/v1` surface.

// Catalog handlers, no user required
pub mod health;
pub mod products; // SKU lookup, variants, images, related products, coordinates
pub mod reviews; // Reviews and Q&A

// User scoped handlers
pub mod addresses;
pub mod cart;
pub mod checkout; // Payment methods, coupons and points
pub mod favorites;
pub mod history;

pub(crate) use addresses::{
    change_shipping_address, create_shipping_address, delete_shipping_address,
    get_shipping_addresses,
};
pub(crate) use cart::{add_cart_item, change_cart_item, delete_cart_item, get_cart_items};
pub(crate) use checkout::{
    clear_coupon, get_checkout_info, get_payment_methods, select_coupon, use_points,
};
pub(crate) use favorites::{add_favorite_sku, delete_favorite_sku, get_favorite_skus};
pub(crate) use health::health_check;
pub(crate) use history::{add_viewed_sku, get_viewed_history};
pub(crate) use products::{
    get_product_images, get_related_products, get_staff_coordinates, get_target_product_skus,
    get_variant_options,
};
pub(crate) use reviews::{get_user_qandas, get_user_reviews};

use crate::db::models::ApiResponse;
use crate::errors::{ApiError, ErrorMessages};
use axum::{
    extract::{rejection::JsonRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info, warn};

/// Header set by the gateway with the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

pub(crate) const FETCHED: &str = "取得しました";
pub(crate) const DELETED: &str = "削除しました";

/// Response shape shared by every handler
pub(crate) type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

/// Id of the caller taken from the `X-User-Id` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CurrentUser(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiResult<()>;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id >= 1)
            .map(CurrentUser)
            .ok_or_else(|| {
                warn!("Rejected request without a valid {} header", USER_ID_HEADER);
                error_response(ApiError::Unauthorized)
            })
    }
}

pub(crate) fn success<T>(data: T, msg: &str) -> ApiResult<T> {
    (StatusCode::OK, Json(ApiResponse::success(data, msg)))
}

/// Maps an error to its envelope. Infrastructure failures are logged in full
pub(crate) fn error_response<T>(err: ApiError) -> ApiResult<T> {
    if err.is_internal() {
        error!("Request failed: {}", err);
    } else {
        info!("Request rejected: {}", err);
    }
    (
        err.status_code(),
        Json(ApiResponse::error(err.error_code(), err.user_message())),
    )
}

pub(crate) fn respond<T>(result: crate::Result<T>, msg: &str) -> ApiResult<T> {
    match result {
        Ok(data) => success(data, msg),
        Err(err) => error_response(err),
    }
}

/// Unwraps a JSON body extracted as raw `Value`, keeping the raw value for the audit log
pub(crate) fn parse_body<T: DeserializeOwned>(
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> crate::Result<(T, Value)> {
    let Json(raw) = payload.map_err(|rejection| {
        warn!("Malformed request body: {}", rejection);
        ApiError::InvalidParameter(ErrorMessages::InvalidBody.to_string())
    })?;
    let parsed = serde_json::from_value(raw.clone())
        .map_err(|_| ApiError::InvalidParameter(ErrorMessages::InvalidBody.to_string()))?;
    Ok((parsed, raw))
}

/// Answers unknown routes with the not found envelope
pub(crate) async fn handle_not_found() -> ApiResult<()> {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(
            crate::db::models::ErrorCode::NotFound,
            ErrorMessages::RouteNotFound.to_string(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> std::result::Result<CurrentUser, ApiResult<()>> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_current_user_header() {
        assert_eq!(extract(Some("42")).await.unwrap(), CurrentUser(42));
        assert_eq!(extract(Some(" 7 ")).await.unwrap(), CurrentUser(7));

        for header in [None, Some(""), Some("abc"), Some("0"), Some("-5")] {
            let (status, _) = extract(header).await.unwrap_err();
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_respond_maps_errors() {
        let (status, Json(body)) = respond::<()>(Err(ApiError::CartEmpty), FETCHED);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["code"], "CART_EMPTY");
        assert_eq!(value["msg"], "カートに商品がありません。");
        assert!(value["data"].is_null());

        let (status, Json(body)) = respond(Ok(vec![1, 2]), FETCHED);
        assert_eq!(status, StatusCode::OK);
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, Json(body)) =
            error_response::<()>(ApiError::Custom("connection refused".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["code"], "INTERNAL_ERROR");
        assert_eq!(value["msg"], ErrorMessages::Unexpected.to_string());
    }

    #[test]
    fn test_parse_body() {
        let (parsed, raw): (crate::db::models::ApplyCouponRequest, Value) =
            parse_body(Ok(Json(serde_json::json!({"coupon_code": "WELCOME"})))).unwrap();
        assert_eq!(parsed.coupon_code.as_deref(), Some("WELCOME"));
        assert_eq!(raw["coupon_code"], "WELCOME");

        let err = parse_body::<crate::db::models::ApplyCouponRequest>(Ok(Json(
            serde_json::json!({"coupon_code": 5}),
        )))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }
}
