use super::{respond, ApiResult, CurrentUser, FETCHED};
use crate::db::models::{FavoriteSkuListResponse, ListQuery};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::audit_log;
use crate::validation::{
    parse_limit, parse_page, validate_sku_id, FavoriteSort, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use axum::extract::{Path, Query, State};
use tracing::info;

/// # Endpoint: GET /api/v1/favorites?page&limit&sort
pub(crate) async fn get_favorite_skus(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<FavoriteSkuListResponse> {
    info!("Fetching favorites for user: {}", user_id);

    let result = async {
        let page = parse_page(query.page.as_deref()).map_err(ApiError::InvalidParameter)?;
        let limit = parse_limit(query.limit.as_deref(), DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
            .map_err(ApiError::InvalidParameter)?;
        let sort =
            FavoriteSort::parse(query.sort.as_deref()).map_err(ApiError::InvalidParameter)?;

        db.get_favorite_skus(user_id, page, limit, sort).await
    }
    .await;

    respond(result, FETCHED)
}

/// # Endpoint: POST /api/v1/favorites/:sku_id
pub(crate) async fn add_favorite_sku(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(sku_id): Path<String>,
) -> ApiResult<()> {
    audit_log("POST", &format!("/api/v1/favorites/{}", sku_id), user_id, None);

    let result = async {
        let sku_id = validate_sku_id(&sku_id).map_err(ApiError::InvalidParameter)?;
        db.add_favorite_sku(user_id, &sku_id).await
    }
    .await;

    respond(result, "お気に入りに追加しました")
}

/// # Endpoint: DELETE /api/v1/favorites/:sku_id
pub(crate) async fn delete_favorite_sku(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(sku_id): Path<String>,
) -> ApiResult<()> {
    audit_log("DELETE", &format!("/api/v1/favorites/{}", sku_id), user_id, None);

    let result = async {
        let sku_id = validate_sku_id(&sku_id).map_err(ApiError::InvalidParameter)?;
        db.delete_favorite_sku(user_id, &sku_id).await
    }
    .await;

    respond(result, "お気に入りから削除しました")
}
