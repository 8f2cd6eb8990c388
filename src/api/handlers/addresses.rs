use super::{parse_body, respond, ApiResult, CurrentUser, DELETED, FETCHED};
use crate::db::models::{ShippingAddressInfo, ShippingAddressInput, ShippingAddressListResponse};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::audit_log;
use crate::validation::{parse_address_id, validate_shipping_address};
use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

/// # Endpoint: GET /api/v1/addresses
pub(crate) async fn get_shipping_addresses(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<ShippingAddressListResponse> {
    info!("Fetching shipping addresses for user: {}", user_id);

    let result = db
        .get_shipping_addresses(user_id)
        .await
        .map(|addresses| ShippingAddressListResponse { addresses });

    respond(result, FETCHED)
}

/// # Endpoint: POST /api/v1/addresses
pub(crate) async fn create_shipping_address(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ShippingAddressInfo> {
    let result = async {
        let (input, raw) = parse_body::<ShippingAddressInput>(payload)?;
        audit_log("POST", "/api/v1/addresses", user_id, Some(&raw));

        let params = validate_shipping_address(&input).map_err(ApiError::InvalidParameter)?;
        db.create_shipping_address(user_id, params).await
    }
    .await;

    respond(result, "配送先住所を追加しました")
}

/// # Endpoint: PUT /api/v1/addresses/:address_id
pub(crate) async fn change_shipping_address(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(address_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ShippingAddressInfo> {
    let path = format!("/api/v1/addresses/{}", address_id);

    let result = async {
        let (input, raw) = parse_body::<ShippingAddressInput>(payload)?;
        audit_log("PUT", &path, user_id, Some(&raw));

        let address_id = parse_address_id(&address_id).map_err(ApiError::InvalidParameter)?;
        let params = validate_shipping_address(&input).map_err(ApiError::InvalidParameter)?;
        db.change_shipping_address(user_id, address_id, params).await
    }
    .await;

    respond(result, "配送先住所を変更しました")
}

/// # Endpoint: DELETE /api/v1/addresses/:address_id
pub(crate) async fn delete_shipping_address(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(address_id): Path<String>,
) -> ApiResult<()> {
    audit_log(
        "DELETE",
        &format!("/api/v1/addresses/{}", address_id),
        user_id,
        None,
    );

    let result = async {
        let address_id = parse_address_id(&address_id).map_err(ApiError::InvalidParameter)?;
        db.delete_shipping_address(user_id, address_id).await
    }
    .await;

    respond(result, DELETED)
}
