use super::{respond, ApiResult, CurrentUser, FETCHED};
use crate::db::models::{ListQuery, ViewedSkuListResponse};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::audit_log;
use crate::validation::{parse_limit, parse_page, validate_sku_id, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use axum::extract::{Path, Query, State};
use tracing::info;

/// Records a SKU page view
///
/// # Endpoint: POST /api/v1/history/:sku_id
pub(crate) async fn add_viewed_sku(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Path(sku_id): Path<String>,
) -> ApiResult<()> {
    audit_log("POST", &format!("/api/v1/history/{}", sku_id), user_id, None);

    let result = async {
        let sku_id = validate_sku_id(&sku_id).map_err(ApiError::InvalidParameter)?;
        db.add_viewed_sku(user_id, &sku_id).await
    }
    .await;

    respond(result, "閲覧履歴を記録しました")
}

/// # Endpoint: GET /api/v1/history?page&limit
pub(crate) async fn get_viewed_history(
    State(db): State<DbClient>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<ViewedSkuListResponse> {
    info!("Fetching view history for user: {}", user_id);

    let result = async {
        let page = parse_page(query.page.as_deref()).map_err(ApiError::InvalidParameter)?;
        let limit = parse_limit(query.limit.as_deref(), DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
            .map_err(ApiError::InvalidParameter)?;
        db.get_viewed_history(user_id, page, limit).await
    }
    .await;

    respond(result, FETCHED)
}
