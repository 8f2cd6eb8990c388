use super::{respond, ApiResult, CurrentUser, DELETED, FETCHED};
use crate::db::models::{CartItemQuery, CartResponse};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::audit_log;
use crate::validation::{parse_quantity, require_sku_id, validate_sku_id};
use axum::extract::{Path, Query, State};
use serde_json::json;
use tracing::info;

const CART_ITEMS_PATH: &str = "/api/v1/cart/items";

/// Validated `sku_id` and `quantity` of the add and change calls
fn cart_item_params(query: &CartItemQuery) -> crate::Result<(String, i32)> {
    let sku_id = require_sku_id(query.sku_id.as_deref()).map_err(ApiError::InvalidParameter)?;
    let quantity = parse_quantity(query.quantity.as_deref()).map_err(ApiError::InvalidParameter)?;
    Ok((sku_id, quantity))
}

/// # Endpoint: GET /api/v1/cart/items
pub(crate) async fn get_cart_items(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<CartResponse> {
    info!("Fetching cart for user: {}", user_id);
    respond(db.get_cart_items(user_id).await, FETCHED)
}

/// Adds a quantity of a SKU, stacking on an existing line
///
/// # Endpoint: POST /api/v1/cart/items?sku_id&quantity
pub(crate) async fn add_cart_item(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<CartItemQuery>,
) -> ApiResult<()> {
    let body = json!({ "sku_id": query.sku_id, "quantity": query.quantity });
    audit_log("POST", CART_ITEMS_PATH, user_id, Some(&body));

    let result = async {
        let (sku_id, quantity) = cart_item_params(&query)?;
        db.add_cart_item(user_id, &sku_id, quantity).await.map(|_| ())
    }
    .await;

    respond(result, "カートに追加しました")
}

/// Sets the quantity of a line already in the cart
///
/// # Endpoint: PUT /api/v1/cart/items?sku_id&quantity
pub(crate) async fn change_cart_item(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<CartItemQuery>,
) -> ApiResult<()> {
    let body = json!({ "sku_id": query.sku_id, "quantity": query.quantity });
    audit_log("PUT", CART_ITEMS_PATH, user_id, Some(&body));

    let result = async {
        let (sku_id, quantity) = cart_item_params(&query)?;
        db.change_cart_item(user_id, &sku_id, quantity).await
    }
    .await;

    respond(result, "カートを変更しました")
}

/// # Endpoint: DELETE /api/v1/cart/items/:sku_id
pub(crate) async fn delete_cart_item(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(sku_id): Path<String>,
) -> ApiResult<()> {
    audit_log(
        "DELETE",
        &format!("{}/{}", CART_ITEMS_PATH, sku_id),
        user_id,
        None,
    );

    let result = async {
        let sku_id = validate_sku_id(&sku_id).map_err(ApiError::InvalidParameter)?;
        db.delete_cart_item(user_id, &sku_id).await
    }
    .await;

    respond(result, DELETED)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKU: &str = "0b6e3f7a-1c2d-4e5f-8a9b-0c1d2e3f4a5b";

    fn query(sku_id: Option<&str>, quantity: Option<&str>) -> CartItemQuery {
        CartItemQuery {
            sku_id: sku_id.map(str::to_string),
            quantity: quantity.map(str::to_string),
        }
    }

    #[test]
    fn test_cart_item_params() {
        assert_eq!(
            cart_item_params(&query(Some(SKU), None)).unwrap(),
            (SKU.to_string(), 1)
        );
        assert_eq!(
            cart_item_params(&query(Some(SKU), Some("3"))).unwrap(),
            (SKU.to_string(), 3)
        );

        let missing = cart_item_params(&query(None, Some("3"))).unwrap_err();
        assert_eq!(missing.user_message(), "sku_idは必須です。");

        let zero = cart_item_params(&query(Some(SKU), Some("0"))).unwrap_err();
        assert_eq!(
            zero.user_message(),
            "quantityパラメータは1以上の数値で指定してください。"
        );
    }
}
