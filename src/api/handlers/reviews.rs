use super::{respond, ApiResult, FETCHED};
use crate::db::models::{ListQuery, QaListResponse, ReviewListResponse};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::validation::{
    parse_limit, parse_page, parse_rating, validate_product_code, QaSort, ReviewSort,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use axum::extract::{Path, Query, State};
use tracing::info;

/// Handler for the approved reviews of a product
///
/// # Endpoint: GET /api/v1/products/:product_code/reviews?page&limit&rating&sort
pub(crate) async fn get_user_reviews(
    State(db): State<DbClient>,
    Path(code): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ReviewListResponse> {
    info!("Fetching reviews for product: {}", code);

    let result = async {
        let code = validate_product_code(&code).map_err(ApiError::InvalidParameter)?;
        let page = parse_page(query.page.as_deref()).map_err(ApiError::InvalidParameter)?;
        let limit = parse_limit(query.limit.as_deref(), DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
            .map_err(ApiError::InvalidParameter)?;
        let rating = parse_rating(query.rating.as_deref()).map_err(ApiError::InvalidParameter)?;
        let sort = ReviewSort::parse(query.sort.as_deref()).map_err(ApiError::InvalidParameter)?;

        db.get_user_reviews(&code, page, limit, rating, sort).await
    }
    .await;

    respond(result, FETCHED)
}

/// Handler for answered questions of a product
///
/// # Endpoint: GET /api/v1/products/:product_code/questions?page&limit&sort
pub(crate) async fn get_user_qandas(
    State(db): State<DbClient>,
    Path(code): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<QaListResponse> {
    info!("Fetching Q&A for product: {}", code);

    let result = async {
        let code = validate_product_code(&code).map_err(ApiError::InvalidParameter)?;
        let page = parse_page(query.page.as_deref()).map_err(ApiError::InvalidParameter)?;
        let limit = parse_limit(query.limit.as_deref(), DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
            .map_err(ApiError::InvalidParameter)?;
        let sort = QaSort::parse(query.sort.as_deref()).map_err(ApiError::InvalidParameter)?;

        db.get_user_qandas(&code, page, limit, sort).await
    }
    .await;

    respond(result, FETCHED)
}
