use crate::db::models::{
    NewViewedSku, PaginationInfo, ViewedSkuInfo, ViewedSkuListResponse, ViewedSkuRow,
};
use crate::db::sku::{find_sku_product, SkuDetails};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::misc::{
    format_jp_datetime, format_optional_price_range, page_offset, total_pages,
};
use crate::Result;
use chrono::Utc;
use diesel::sql_types::{BigInt, Int8};
use diesel::{sql_query, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::{error, info};

/// DbClient helper functions for the user_viewed_skus table
impl DbClient {
    /// Records a SKU in the user's history, a SKU is recorded once
    pub async fn add_viewed_sku(&self, user: i64, sku: &str) -> Result<()> {
        use crate::schema::user_viewed_skus::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        find_sku_product(conn, sku).await?;

        let inserted = diesel::insert_into(user_viewed_skus)
            .values(NewViewedSku {
                user_id: user,
                sku_id: sku,
                viewed_at: Utc::now().naive_utc(),
            })
            .on_conflict((user_id, sku_id))
            .do_nothing()
            .execute(conn)
            .await?;

        if inserted == 0 {
            return Err(ApiError::AlreadyViewed);
        }
        info!("User {} viewed SKU {}", user, sku);
        Ok(())
    }

    /// The user's history, most recent first
    pub async fn get_viewed_history(
        &self,
        user: i64,
        page: i64,
        limit: i64,
    ) -> Result<ViewedSkuListResponse> {
        let conn = &mut self.get_db_conn().await?;

        let total_count = {
            use crate::schema::user_viewed_skus::dsl::*;
            user_viewed_skus
                .filter(user_id.eq(user))
                .count()
                .get_result::<i64>(conn)
                .await?
        };

        let rows = sql_query(
            "SELECT v.sku_id, s.product_id, p.name AS product_name, p.product_code, v.viewed_at,
                    (SELECT CAST(MIN(pr.price) AS DOUBLE PRECISION) FROM prices pr
                      WHERE pr.sku_id = v.sku_id AND pr.is_active) AS min_price,
                    (SELECT CAST(MAX(pr.price) AS DOUBLE PRECISION) FROM prices pr
                      WHERE pr.sku_id = v.sku_id AND pr.is_active) AS max_price,
                    rs.average_rating, rs.review_count,
                    rs.rating_1_count, rs.rating_2_count, rs.rating_3_count,
                    rs.rating_4_count, rs.rating_5_count
             FROM user_viewed_skus v
             JOIN product_skus s ON s.id = v.sku_id
             JOIN products p ON p.id = s.product_id
             LEFT JOIN review_summaries rs ON rs.product_id = p.id
             WHERE v.user_id = $1
             ORDER BY v.viewed_at DESC, v.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind::<Int8, _>(user)
        .bind::<BigInt, _>(limit)
        .bind::<BigInt, _>(page_offset(page, limit))
        .load::<ViewedSkuRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch view history: {}", e);
            ApiError::from(e)
        })?;

        let sku_ids: Vec<String> = rows.iter().map(|row| row.sku_id.clone()).collect();
        let details = SkuDetails::load(conn, &sku_ids, Utc::now().naive_utc()).await?;

        let history = rows
            .into_iter()
            .map(|row| ViewedSkuInfo {
                price_range_formatted: format_optional_price_range(row.min_price, row.max_price),
                primary_image: details.primary_image(&row.sku_id),
                review_summary: row.summary.into_info(),
                viewed_at_formatted: format_jp_datetime(&row.viewed_at),
                sku_id: row.sku_id,
                product_id: row.product_id,
                product_name: row.product_name,
                product_code: row.product_code,
            })
            .collect();

        Ok(ViewedSkuListResponse {
            history,
            pagination: PaginationInfo {
                current_page: page,
                limit,
                total_count,
                total_pages: total_pages(total_count, limit),
            },
        })
    }
}
