use crate::db::models::{
    Category, CoordinateSetTeaserInfo, CoordinateSetTeaserListResponse, ProductHeader,
    ProductSkus, ProductVariantResponse, RelatedCategoryInfo, RelatedProductInfo,
    RelatedProductListResponse, RelatedProductRow, SkuImageInfo, TargetSkuInfo,
    VariantOptionRow,
};
use crate::db::redis::variant_cache_key;
use crate::db::sku::{find_sku_product, SkuDetails, SALE_PRICE_TYPE_ID};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::catalog::group_variant_options;
use crate::services::misc::{format_optional_price_range, truncate_chars};
use crate::validation::SkuLookup;
use crate::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::sql_types::{BigInt, Int4, Text, Timestamp};
use diesel::{sql_query, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{error, info, warn};

/// Characters of the product description shown next to a SKU
pub const DESCRIPTION_PREVIEW_CHARS: usize = 20;

/// Loads a live product by id
async fn find_product(conn: &mut AsyncPgConnection, product: &str) -> Result<ProductHeader> {
    use crate::schema::products::dsl::*;

    products
        .filter(id.eq(product))
        .filter(deleted_at.is_null())
        .select(ProductHeader::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or(ApiError::ProductNotFound)
}

/// Loads a live product by its product code
async fn find_product_by_code(conn: &mut AsyncPgConnection, code: &str) -> Result<ProductHeader> {
    use crate::schema::products::dsl::*;

    products
        .filter(product_code.eq(code))
        .filter(deleted_at.is_null())
        .select(ProductHeader::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or(ApiError::ProductNotFound)
}

/// Renders a product header together with one of its SKUs
async fn build_product_skus(
    conn: &mut AsyncPgConnection,
    product: ProductHeader,
    sku_id: String,
    now: NaiveDateTime,
) -> Result<ProductSkus> {
    let details = SkuDetails::load(conn, std::slice::from_ref(&sku_id), now).await?;

    Ok(ProductSkus {
        description: truncate_chars(
            product.description.as_deref().unwrap_or_default(),
            DESCRIPTION_PREVIEW_CHARS,
        ),
        target_sku_info: TargetSkuInfo {
            price: details.price(&sku_id),
            primary_image: details.primary_image(&sku_id),
            attributes: details.attributes(&sku_id),
            sku_id,
        },
        id: product.id,
        product_code: product.product_code,
        name: product.name,
        is_taxable: product.is_taxable,
        meta_title: product.meta_title,
        meta_description: product.meta_description,
    })
}

/// DbClient helper functions for the product and SKU pages
impl DbClient {
    /// Resolves the SKU shown on a product page
    ///
    /// A given `sku_id` wins and must belong to `product_id` when both are present,
    /// otherwise the product's default SKU is used.
    pub async fn get_target_product_skus(&self, lookup: SkuLookup) -> Result<ProductSkus> {
        let conn = &mut self.get_db_conn().await?;
        let now = Utc::now().naive_utc();

        let (product_id, sku_id) = match (lookup.sku_id, lookup.product_id) {
            (Some(sku_id), expected_product) => {
                let owner = find_sku_product(conn, &sku_id).await?;
                if expected_product.is_some_and(|expected| expected != owner) {
                    return Err(ApiError::SkuNotFound);
                }
                (owner, sku_id)
            }
            (None, Some(product_id)) => {
                let product = find_product(conn, &product_id).await?;
                let default_sku = product.default_sku_id.ok_or(ApiError::ProductNotFound)?;
                (product_id, default_sku)
            }
            (None, None) => {
                return Err(ApiError::InvalidParameter(
                    crate::validation::INVALID_PRODUCT_ID.to_string(),
                ))
            }
        };

        info!("Fetching product {} with SKU {}", product_id, sku_id);
        let product = find_product(conn, &product_id).await?;
        build_product_skus(conn, product, sku_id, now).await
    }

    /// Variant axes of a product with the SKUs behind every option
    ///
    /// Responses are cached in Redis under the product's default SKU.
    pub async fn get_variant_options(&self, product_id: &str) -> Result<ProductVariantResponse> {
        let conn = &mut self.get_db_conn().await?;
        let product = find_product(conn, product_id).await?;
        let default_sku = product
            .default_sku_id
            .clone()
            .ok_or(ApiError::ProductNotFound)?;
        let cache_key = variant_cache_key(&default_sku);

        if let Ok(cached) = self.get_cache(&cache_key).await {
            match serde_json::from_str::<ProductVariantResponse>(&cached) {
                Ok(response) => {
                    info!("Cache hit for variant options of product {}", product_id);
                    return Ok(response);
                }
                Err(err) => {
                    warn!("Discarding unreadable cache entry {}: {}", cache_key, err);
                    if let Err(err) = self.delete_cache(&cache_key).await {
                        warn!("Failed to delete cache entry {}: {}", cache_key, err);
                    }
                }
            }
        }

        info!("Building variant options for product {}", product_id);
        let rows = sql_query(
            "SELECT a.id AS attribute_id, a.name AS attribute_name, a.attribute_code,
                    ao.id AS option_id, ao.value AS option_value, ao.option_code,
                    s.id AS sku_id
             FROM products p
             JOIN category_attributes ca
               ON ca.category_id = p.category_id AND ca.is_variant_attribute
             JOIN attributes a ON a.id = ca.attribute_id
             JOIN product_skus s ON s.product_id = p.id AND s.deleted_at IS NULL
             JOIN sku_values sv ON sv.sku_id = s.id AND sv.attribute_id = a.id
             JOIN attribute_options ao ON ao.id = sv.option_id
             WHERE p.id = $1
             ORDER BY ca.sort_order, a.id, ao.sort_order, ao.id, s.id",
        )
        .bind::<Text, _>(product_id)
        .load::<VariantOptionRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch variant options: {}", e);
            ApiError::from(e)
        })?;

        let response = ProductVariantResponse {
            product_info: build_product_skus(conn, product, default_sku, Utc::now().naive_utc())
                .await?,
            variants: group_variant_options(rows),
        };

        match serde_json::to_string(&response) {
            Ok(payload) => {
                if let Err(err) = self
                    .set_cache(&cache_key, &payload, self.variant_cache_ttl_secs)
                    .await
                {
                    warn!("Failed to cache variant options {}: {}", cache_key, err);
                }
            }
            Err(err) => warn!("Failed to serialize variant options: {}", err),
        }

        Ok(response)
    }

    /// Image pairs of a SKU ordered for a gallery
    pub async fn get_product_images(&self, sku: &str) -> Result<Vec<SkuImageInfo>> {
        use crate::schema::sku_images::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        find_sku_product(conn, sku).await?;

        let rows = sku_images
            .filter(sku_id.eq(sku))
            .order((sort_order.asc(), id.asc()))
            .select((id, main_image_url, thumbnail_url, alt_text, sort_order))
            .load::<(i32, String, String, Option<String>, i32)>(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(image_id, main_url, thumb_url, alt, order)| SkuImageInfo {
                    id: image_id,
                    main_image_url: main_url,
                    thumbnail_url: thumb_url,
                    alt_text: alt,
                    sort_order: order,
                },
            )
            .collect())
    }

    /// Other products of the same category and the category's neighbours
    pub async fn get_related_products(
        &self,
        code: &str,
        limit: i64,
    ) -> Result<RelatedProductListResponse> {
        let conn = &mut self.get_db_conn().await?;
        let product = find_product_by_code(conn, code).await?;
        let now = Utc::now().naive_utc();

        info!("Fetching products related to {}", code);
        let rows = sql_query(format!(
            "SELECT p.id AS product_id, p.product_code, p.name AS product_name,
                    (SELECT CAST(MIN(pr.price) AS DOUBLE PRECISION)
                       FROM prices pr JOIN product_skus s ON s.id = pr.sku_id
                      WHERE s.product_id = p.id AND s.deleted_at IS NULL AND pr.is_active) AS min_price,
                    (SELECT CAST(MAX(pr.price) AS DOUBLE PRECISION)
                       FROM prices pr JOIN product_skus s ON s.id = pr.sku_id
                      WHERE s.product_id = p.id AND s.deleted_at IS NULL AND pr.is_active) AS max_price,
                    EXISTS (SELECT 1
                              FROM prices pr JOIN product_skus s ON s.id = pr.sku_id
                             WHERE s.product_id = p.id AND s.deleted_at IS NULL AND pr.is_active
                               AND pr.price_type_id = {sale}
                               AND pr.start_date <= $3 AND pr.end_date >= $3) AS is_on_sale,
                    (SELECT si.thumbnail_url FROM sku_images si
                      WHERE si.sku_id = p.default_sku_id
                      ORDER BY (si.image_type = 'main') DESC, si.sort_order, si.id
                      LIMIT 1) AS thumbnail_image_url,
                    rs.average_rating, rs.review_count,
                    rs.rating_1_count, rs.rating_2_count, rs.rating_3_count,
                    rs.rating_4_count, rs.rating_5_count
             FROM products p
             LEFT JOIN review_summaries rs ON rs.product_id = p.id
             WHERE p.category_id = $1 AND p.id <> $2 AND p.deleted_at IS NULL
             ORDER BY p.name, p.id
             LIMIT $4",
            sale = SALE_PRICE_TYPE_ID,
        ))
        .bind::<Int4, _>(product.category_id)
        .bind::<Text, _>(&product.id)
        .bind::<Timestamp, _>(now)
        .bind::<BigInt, _>(limit)
        .load::<RelatedProductRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch related products: {}", e);
            ApiError::from(e)
        })?;

        let related_products = rows
            .into_iter()
            .map(|row| RelatedProductInfo {
                price_range_formatted: format_optional_price_range(row.min_price, row.max_price),
                review_summary: row.summary.into_info(),
                product_id: row.product_id,
                product_code: row.product_code,
                product_name: row.product_name,
                is_on_sale: row.is_on_sale,
                thumbnail_image_url: row.thumbnail_image_url,
            })
            .collect();

        let related_categories = self
            .related_category(conn, product.category_id)
            .await?;

        Ok(RelatedProductListResponse {
            related_products,
            related_categories,
        })
    }

    async fn related_category(
        &self,
        conn: &mut AsyncPgConnection,
        category: i32,
    ) -> Result<RelatedCategoryInfo> {
        use crate::schema::categories::dsl::*;

        let current = categories
            .filter(id.eq(category))
            .select(Category::as_select())
            .first(conn)
            .await?;

        // Siblings share the parent, top level categories are siblings of each other
        let mut siblings = categories
            .filter(id.ne(current.id))
            .select(name)
            .order(id.asc())
            .into_boxed();
        siblings = match current.parent_id {
            Some(parent) => siblings.filter(parent_id.eq(parent)),
            None => siblings.filter(parent_id.is_null()),
        };
        let category_links = siblings.load::<String>(conn).await?;

        Ok(RelatedCategoryInfo {
            category_id: current.id,
            category_name: current.name,
            category_level: current.level,
            category_parent_id: current.parent_id,
            category_links,
        })
    }

    /// Staff coordinate sets featuring a product
    pub async fn get_staff_coordinates(
        &self,
        code: &str,
        limit: i64,
    ) -> Result<CoordinateSetTeaserListResponse> {
        use crate::schema::{coordinate_set_items, coordinate_sets};

        let conn = &mut self.get_db_conn().await?;
        let product = find_product_by_code(conn, code).await?;

        info!("Fetching coordinate sets for product {}", code);
        let rows = coordinate_sets::table
            .inner_join(coordinate_set_items::table)
            .filter(coordinate_set_items::product_id.eq(&product.id))
            .order((coordinate_sets::sort_order.asc(), coordinate_sets::id.asc()))
            .select((
                coordinate_sets::id,
                coordinate_sets::theme_image_url,
                coordinate_sets::contributor_nickname,
                coordinate_sets::contributor_avatar_url,
                coordinate_sets::contributor_store_name,
            ))
            .limit(limit)
            .load::<(String, Option<String>, String, Option<String>, Option<String>)>(conn)
            .await?;

        let coordinates = rows
            .into_iter()
            .map(
                |(set_id, theme, nickname, avatar, store)| CoordinateSetTeaserInfo {
                    set_id,
                    set_theme_image_url: theme,
                    contributor_nickname: nickname,
                    contributor_avatar_url: avatar,
                    contributor_store_name: store,
                },
            )
            .collect();

        Ok(CoordinateSetTeaserListResponse { coordinates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{
        days_from_now, seed_product, seed_regular_price, seed_sale_price, seed_sku,
        test_client, test_client_with_redis,
    };
    use crate::services::catalog::REGULAR_PRICE_TYPE;

    fn lookup_sku(sku_id: &str) -> SkuLookup {
        SkuLookup {
            sku_id: Some(sku_id.to_string()),
            product_id: None,
        }
    }

    #[tokio::test]
    async fn test_sale_price_applies_only_inside_window() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        seed_regular_price(conn, &product.sku_id, 5000.0).await;
        seed_sale_price(conn, &product.sku_id, 3980.0, days_from_now(-1), days_from_now(1)).await;

        let ended = seed_sku(conn, &product.product_id).await;
        seed_regular_price(conn, &ended, 5000.0).await;
        seed_sale_price(conn, &ended, 2980.0, days_from_now(-30), days_from_now(-1)).await;

        let on_sale = client
            .get_target_product_skus(lookup_sku(&product.sku_id))
            .await
            .unwrap();
        let price = on_sale.target_sku_info.price.unwrap();
        assert_eq!(price.amount, 3980.0);
        assert_eq!(price.price_type, "sale");
        assert_eq!(price.original_amount, Some(5000.0));
        assert_eq!(on_sale.id, product.product_id);

        let regular = client
            .get_target_product_skus(lookup_sku(&ended))
            .await
            .unwrap();
        let price = regular.target_sku_info.price.unwrap();
        assert_eq!(price.amount, 5000.0);
        assert_eq!(price.price_type, REGULAR_PRICE_TYPE);
        assert_eq!(price.original_amount, None);
    }

    #[tokio::test]
    async fn test_default_sku_and_ownership() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        let stranger = seed_product(conn).await;

        let by_product = client
            .get_target_product_skus(SkuLookup {
                sku_id: None,
                product_id: Some(product.product_id.clone()),
            })
            .await
            .unwrap();
        assert_eq!(by_product.target_sku_info.sku_id, product.sku_id);
        assert!(by_product.target_sku_info.price.is_none());
        assert_eq!(by_product.description, "テスト用の商品説明です");

        assert!(matches!(
            client
                .get_target_product_skus(SkuLookup {
                    sku_id: Some(stranger.sku_id),
                    product_id: Some(product.product_id),
                })
                .await,
            Err(ApiError::SkuNotFound)
        ));
    }

    #[tokio::test]
    async fn test_variant_options_are_cached_per_default_sku() {
        let Some(client) = test_client_with_redis() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        let cache_key = variant_cache_key(&product.sku_id);

        let built = client.get_variant_options(&product.product_id).await.unwrap();
        assert_eq!(built.product_info.target_sku_info.sku_id, product.sku_id);

        let stored = client.get_cache(&cache_key).await.unwrap();
        let mut cached: ProductVariantResponse = serde_json::from_str(&stored).unwrap();
        assert_eq!(cached.product_info.id, product.product_id);

        // A hit answers from Redis without rebuilding
        cached.product_info.name = "キャッシュ済み".to_string();
        client
            .set_cache(&cache_key, &serde_json::to_string(&cached).unwrap(), 60)
            .await
            .unwrap();
        let hit = client.get_variant_options(&product.product_id).await.unwrap();
        assert_eq!(hit.product_info.name, "キャッシュ済み");

        // Unreadable entries are dropped and rebuilt
        client.set_cache(&cache_key, "not json", 60).await.unwrap();
        let rebuilt = client.get_variant_options(&product.product_id).await.unwrap();
        assert_eq!(rebuilt.product_info.name, "テスト商品");

        client.delete_cache(&cache_key).await.unwrap();
    }
}
