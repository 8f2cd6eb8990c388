use super::{parse_body, respond, ApiResult, CurrentUser, FETCHED};
use crate::db::models::{
    ApplyCouponRequest, CheckoutInfoResponse, PaymentMethodInfo, UsePointsRequest,
};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::audit_log;
use crate::validation::{parse_points, require_coupon_code};
use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

const COUPON_PATH: &str = "/api/v1/checkout/coupon";

/// # Endpoint: GET /api/v1/payments/methods
pub(crate) async fn get_payment_methods(
    State(db): State<DbClient>,
) -> ApiResult<Vec<PaymentMethodInfo>> {
    info!("Fetching payment methods");
    respond(db.get_payment_methods().await, FETCHED)
}

/// Coupons, points and totals of the caller's checkout
///
/// # Endpoint: GET /api/v1/checkout
pub(crate) async fn get_checkout_info(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<CheckoutInfoResponse> {
    info!("Fetching checkout info for user: {}", user_id);
    respond(db.get_checkout_info(user_id).await, FETCHED)
}

/// # Endpoint: POST /api/v1/checkout/coupon
pub(crate) async fn select_coupon(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CheckoutInfoResponse> {
    let result = async {
        let (request, raw) = parse_body::<ApplyCouponRequest>(payload)?;
        audit_log("POST", COUPON_PATH, user_id, Some(&raw));

        let code = require_coupon_code(request.coupon_code.as_deref())
            .map_err(ApiError::InvalidParameter)?;
        db.select_coupon(user_id, &code).await
    }
    .await;

    respond(result, "クーポンを適用しました")
}

/// # Endpoint: DELETE /api/v1/checkout/coupon
pub(crate) async fn clear_coupon(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<CheckoutInfoResponse> {
    audit_log("DELETE", COUPON_PATH, user_id, None);
    respond(db.clear_coupon(user_id).await, "クーポンを解除しました")
}

/// Reserves points for the checkout, zero releases them
///
/// # Endpoint: POST /api/v1/checkout/points
pub(crate) async fn use_points(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<CheckoutInfoResponse> {
    let result = async {
        let (request, raw) = parse_body::<UsePointsRequest>(payload)?;
        audit_log("POST", "/api/v1/checkout/points", user_id, Some(&raw));

        let points = parse_points(request.points_to_use.as_ref()).map_err(ApiError::InvalidParameter)?;
        db.use_points(user_id, points).await
    }
    .await;

    respond(result, "ポイントを適用しました")
}
