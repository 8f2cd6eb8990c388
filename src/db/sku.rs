//! Lookups shared by every endpoint that renders SKUs: existence, price, image,
//! attributes and stock.

use crate::db::models::{
    AttributeInfo, ImageInfo, PriceInfo, SkuAttributeRow, SkuPriceRow, SkuPrimaryImageRow,
};
use crate::errors::ApiError;
use crate::services::catalog::effective_price;
use crate::Result;
use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::sql_types::{Array, Text, Timestamp};
use diesel::{sql_query, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;
use tracing::error;

pub const REGULAR_PRICE_TYPE_ID: i32 = 1;
pub const SALE_PRICE_TYPE_ID: i32 = 2;

/// Returns the product id of a live SKU, `SkuNotFound` otherwise
pub async fn find_sku_product(conn: &mut AsyncPgConnection, sku: &str) -> Result<String> {
    use crate::schema::product_skus::dsl::*;

    product_skus
        .filter(id.eq(sku))
        .filter(deleted_at.is_null())
        .select(product_id)
        .first::<String>(conn)
        .await
        .optional()?
        .ok_or(ApiError::SkuNotFound)
}

/// Sum of `quantity - reserved_quantity` over every inventory location of a SKU
pub async fn available_stock(conn: &mut AsyncPgConnection, sku: &str) -> Result<i64> {
    use crate::schema::inventory::dsl::*;

    let available = inventory
        .filter(sku_id.eq(sku))
        .select(sum(quantity - reserved_quantity))
        .get_result::<Option<i64>>(conn)
        .await?;

    Ok(available.unwrap_or(0))
}

/// Available stock of several SKUs, SKUs without inventory rows are absent
pub async fn available_stocks(
    conn: &mut AsyncPgConnection,
    sku_ids: &[String],
) -> Result<HashMap<String, i64>> {
    use crate::schema::inventory::dsl::*;

    let rows = inventory
        .filter(sku_id.eq_any(sku_ids))
        .group_by(sku_id)
        .select((sku_id, sum(quantity - reserved_quantity)))
        .load::<(String, Option<i64>)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(sku, available)| (sku, available.unwrap_or(0)))
        .collect())
}

/// Price, primary image and attributes of a set of SKUs
#[derive(Debug, Default)]
pub struct SkuDetails {
    prices: HashMap<String, PriceInfo>,
    images: HashMap<String, ImageInfo>,
    attributes: HashMap<String, Vec<AttributeInfo>>,
}

impl SkuDetails {
    pub async fn load(
        conn: &mut AsyncPgConnection,
        sku_ids: &[String],
        now: NaiveDateTime,
    ) -> Result<Self> {
        if sku_ids.is_empty() {
            return Ok(Self::default());
        }

        let price_rows = load_price_rows(conn, sku_ids, now).await?;
        let image_rows = load_primary_image_rows(conn, sku_ids).await?;
        let attribute_rows = load_attribute_rows(conn, sku_ids).await?;

        let prices = price_rows
            .iter()
            .filter_map(|row| effective_price(row).map(|price| (row.sku_id.clone(), price)))
            .collect();

        let images = image_rows
            .into_iter()
            .map(|row| {
                (
                    row.sku_id,
                    ImageInfo {
                        id: row.id,
                        url: row.main_image_url,
                        alt_text: row.alt_text,
                    },
                )
            })
            .collect();

        let mut attributes: HashMap<String, Vec<AttributeInfo>> = HashMap::new();
        for row in attribute_rows {
            attributes.entry(row.sku_id).or_default().push(AttributeInfo {
                attribute_id: row.attribute_id,
                attribute_name: row.attribute_name,
                attribute_code: row.attribute_code,
                value_string: row.value_string,
            });
        }

        Ok(Self {
            prices,
            images,
            attributes,
        })
    }

    pub fn price(&self, sku_id: &str) -> Option<PriceInfo> {
        self.prices.get(sku_id).cloned()
    }

    pub fn primary_image(&self, sku_id: &str) -> Option<ImageInfo> {
        self.images.get(sku_id).cloned()
    }

    pub fn attributes(&self, sku_id: &str) -> Vec<AttributeInfo> {
        self.attributes.get(sku_id).cloned().unwrap_or_default()
    }
}

/// Latest active regular price and in-window sale price of each SKU
pub async fn load_price_rows(
    conn: &mut AsyncPgConnection,
    sku_ids: &[String],
    now: NaiveDateTime,
) -> Result<Vec<SkuPriceRow>> {
    let query = format!(
        "SELECT s.id AS sku_id,
                CAST(rp.price AS DOUBLE PRECISION) AS regular_price,
                CAST(sp.price AS DOUBLE PRECISION) AS sale_price,
                sp.type_code AS sale_type_code
         FROM product_skus s
         LEFT JOIN LATERAL (
             SELECT p.price FROM prices p
             WHERE p.sku_id = s.id AND p.price_type_id = {regular} AND p.is_active
             ORDER BY p.updated_at DESC, p.id DESC
             LIMIT 1
         ) rp ON TRUE
         LEFT JOIN LATERAL (
             SELECT p.price, pt.type_code FROM prices p
             JOIN price_types pt ON pt.id = p.price_type_id
             WHERE p.sku_id = s.id AND p.price_type_id = {sale} AND p.is_active
               AND p.start_date <= $2 AND p.end_date >= $2
             ORDER BY p.updated_at DESC, p.id DESC
             LIMIT 1
         ) sp ON TRUE
         WHERE s.id = ANY($1)",
        regular = REGULAR_PRICE_TYPE_ID,
        sale = SALE_PRICE_TYPE_ID,
    );

    sql_query(query)
        .bind::<Array<Text>, _>(sku_ids.to_vec())
        .bind::<Timestamp, _>(now)
        .load::<SkuPriceRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch SKU prices: {}", e);
            e.into()
        })
}

/// The `main` image of each SKU, else its first image by sort order
async fn load_primary_image_rows(
    conn: &mut AsyncPgConnection,
    sku_ids: &[String],
) -> Result<Vec<SkuPrimaryImageRow>> {
    sql_query(
        "SELECT DISTINCT ON (sku_id) sku_id, id, main_image_url, alt_text
         FROM sku_images
         WHERE sku_id = ANY($1)
         ORDER BY sku_id, (image_type = 'main') DESC, sort_order, id",
    )
    .bind::<Array<Text>, _>(sku_ids.to_vec())
    .load::<SkuPrimaryImageRow>(conn)
    .await
    .map_err(|e| {
        error!("Failed to fetch SKU images: {}", e);
        e.into()
    })
}

/// Attribute values of each SKU ordered by attribute sort order
///
/// The displayed value falls back from the option value to the string, number and
/// boolean columns, then to an empty string.
async fn load_attribute_rows(
    conn: &mut AsyncPgConnection,
    sku_ids: &[String],
) -> Result<Vec<SkuAttributeRow>> {
    sql_query(
        "SELECT sv.sku_id, a.id AS attribute_id, a.name AS attribute_name, a.attribute_code,
                COALESCE(ao.value, sv.value_string, CAST(sv.value_number AS TEXT),
                         CAST(sv.value_boolean AS TEXT), '') AS value_string
         FROM sku_values sv
         JOIN attributes a ON a.id = sv.attribute_id
         LEFT JOIN attribute_options ao ON ao.id = sv.option_id
         WHERE sv.sku_id = ANY($1)
         ORDER BY sv.sku_id, a.sort_order, a.id",
    )
    .bind::<Array<Text>, _>(sku_ids.to_vec())
    .load::<SkuAttributeRow>(conn)
    .await
    .map_err(|e| {
        error!("Failed to fetch SKU attributes: {}", e);
        e.into()
    })
}
