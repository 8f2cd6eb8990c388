use super::{respond, ApiResult, FETCHED};
use crate::db::models::{
    CoordinateSetTeaserListResponse, LimitQuery, ProductSkus, ProductVariantResponse,
    RelatedProductListResponse, SkuImageInfo, SkuLookupQuery,
};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::validation::{
    parse_limit, validate_product_id, validate_sku_id, validate_sku_lookup, INVALID_PRODUCT_ID,
};
use axum::extract::{Path, Query, State};
use tracing::info;

const RELATED_DEFAULT_LIMIT: i64 = 5;
const RELATED_MAX_LIMIT: i64 = 10;
const COORDINATE_DEFAULT_LIMIT: i64 = 4;
const COORDINATE_MAX_LIMIT: i64 = 5;

fn product_code(raw: &str) -> crate::Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(ApiError::InvalidParameter(INVALID_PRODUCT_ID.to_string()));
    }
    Ok(code.to_string())
}

/// Handler for the product page lookup by SKU id, product id or both
///
/// # Endpoint: GET /api/v1/products/sku?skuId=&productId=
pub(crate) async fn get_target_product_skus(
    State(db): State<DbClient>,
    Query(query): Query<SkuLookupQuery>,
) -> ApiResult<ProductSkus> {
    info!(
        "Fetching product SKUs (sku: {:?}, product: {:?})",
        query.sku_id, query.product_id
    );

    let result = async {
        let lookup = validate_sku_lookup(query.sku_id.as_deref(), query.product_id.as_deref())
            .map_err(ApiError::InvalidParameter)?;
        db.get_target_product_skus(lookup).await
    }
    .await;

    respond(result, FETCHED)
}

/// Handler for the variant option groups of a product
///
/// # Endpoint: GET /api/v1/products/:product_id/variants
///
/// Responses are cached in Redis per default SKU
pub(crate) async fn get_variant_options(
    State(db): State<DbClient>,
    Path(product_id): Path<String>,
) -> ApiResult<ProductVariantResponse> {
    info!("Fetching variant options for product: {}", product_id);

    let result = async {
        let product_id = validate_product_id(&product_id).map_err(ApiError::InvalidParameter)?;
        db.get_variant_options(&product_id).await
    }
    .await;

    respond(result, FETCHED)
}

/// # Endpoint: GET /api/v1/skus/:sku_id/images
pub(crate) async fn get_product_images(
    State(db): State<DbClient>,
    Path(sku_id): Path<String>,
) -> ApiResult<Vec<SkuImageInfo>> {
    info!("Fetching images for SKU: {}", sku_id);

    let result = async {
        let sku_id = validate_sku_id(&sku_id).map_err(ApiError::InvalidParameter)?;
        db.get_product_images(&sku_id).await
    }
    .await;

    respond(result, FETCHED)
}

/// Handler for products sharing the category of a product, plus its sibling categories
///
/// # Endpoint: GET /api/v1/products/:product_code/related?limit=
pub(crate) async fn get_related_products(
    State(db): State<DbClient>,
    Path(code): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<RelatedProductListResponse> {
    info!("Fetching related products for: {}", code);

    let result = async {
        let limit = parse_limit(query.limit.as_deref(), RELATED_DEFAULT_LIMIT, RELATED_MAX_LIMIT)
            .map_err(ApiError::InvalidParameter)?;
        let code = product_code(&code)?;
        db.get_related_products(&code, limit).await
    }
    .await;

    respond(result, FETCHED)
}

/// # Endpoint: GET /api/v1/products/:product_code/coordinates?limit=
pub(crate) async fn get_staff_coordinates(
    State(db): State<DbClient>,
    Path(code): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<CoordinateSetTeaserListResponse> {
    info!("Fetching staff coordinates for: {}", code);

    let result = async {
        let limit = parse_limit(
            query.limit.as_deref(),
            COORDINATE_DEFAULT_LIMIT,
            COORDINATE_MAX_LIMIT,
        )
        .map_err(ApiError::InvalidParameter)?;
        let code = product_code(&code)?;
        db.get_staff_coordinates(&code, limit).await
    }
    .await;

    respond(result, FETCHED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_code_trims() {
        assert_eq!(product_code(" ABC-1234 ").unwrap(), "ABC-1234");
        assert!(matches!(
            product_code("   "),
            Err(ApiError::InvalidParameter(msg)) if msg == INVALID_PRODUCT_ID
        ));
    }
}
