use crate::db::models::{
    FavoriteSkuInfo, FavoriteSkuListResponse, NewFavoriteSku, PaginationInfo,
};
use crate::db::sku::{find_sku_product, SkuDetails};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::misc::{format_jp_datetime, page_offset, total_pages};
use crate::validation::FavoriteSort;
use crate::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::info;

/// DbClient helper functions for the user_favorite_skus table
impl DbClient {
    pub async fn get_favorite_skus(
        &self,
        user: i64,
        page: i64,
        limit: i64,
        sort: FavoriteSort,
    ) -> Result<FavoriteSkuListResponse> {
        use crate::schema::{product_skus, products, user_favorite_skus};

        let conn = &mut self.get_db_conn().await?;

        let total_count = user_favorite_skus::table
            .filter(user_favorite_skus::user_id.eq(user))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let base = user_favorite_skus::table
            .inner_join(product_skus::table.inner_join(products::table))
            .filter(user_favorite_skus::user_id.eq(user))
            .select((
                user_favorite_skus::sku_id,
                product_skus::product_id,
                products::name,
                products::product_code,
                user_favorite_skus::created_at,
            ))
            .limit(limit)
            .offset(page_offset(page, limit));

        let rows = match sort {
            FavoriteSort::Newest => {
                base.order((
                    user_favorite_skus::created_at.desc(),
                    user_favorite_skus::id.desc(),
                ))
                .load::<(String, String, String, Option<String>, NaiveDateTime)>(conn)
                .await?
            }
            FavoriteSort::Oldest => {
                base.order((
                    user_favorite_skus::created_at.asc(),
                    user_favorite_skus::id.asc(),
                ))
                .load::<(String, String, String, Option<String>, NaiveDateTime)>(conn)
                .await?
            }
        };

        info!("Found {} favorites for user {}", rows.len(), user);

        let sku_ids: Vec<String> = rows.iter().map(|row| row.0.clone()).collect();
        let details = SkuDetails::load(conn, &sku_ids, Utc::now().naive_utc()).await?;

        let favorites = rows
            .into_iter()
            .map(
                |(sku_id, product_id, product_name, product_code, added_at)| FavoriteSkuInfo {
                    price: details.price(&sku_id),
                    attributes: details.attributes(&sku_id),
                    added_at_formatted: format_jp_datetime(&added_at),
                    sku_id,
                    product_id,
                    product_name,
                    product_code,
                },
            )
            .collect();

        Ok(FavoriteSkuListResponse {
            favorites,
            pagination: PaginationInfo {
                current_page: page,
                limit,
                total_count,
                total_pages: total_pages(total_count, limit),
            },
        })
    }

    pub async fn add_favorite_sku(&self, user: i64, sku: &str) -> Result<()> {
        use crate::schema::user_favorite_skus::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        find_sku_product(conn, sku).await?;

        let inserted = diesel::insert_into(user_favorite_skus)
            .values(NewFavoriteSku {
                user_id: user,
                sku_id: sku,
                created_at: Utc::now().naive_utc(),
            })
            .on_conflict((user_id, sku_id))
            .do_nothing()
            .execute(conn)
            .await?;

        if inserted == 0 {
            return Err(ApiError::AlreadyFavorited);
        }
        info!("User {} added SKU {} to favorites", user, sku);
        Ok(())
    }

    pub async fn delete_favorite_sku(&self, user: i64, sku: &str) -> Result<()> {
        use crate::schema::user_favorite_skus::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        find_sku_product(conn, sku).await?;

        let deleted = diesel::delete(
            user_favorite_skus
                .filter(user_id.eq(user))
                .filter(sku_id.eq(sku)),
        )
        .execute(conn)
        .await?;

        if deleted == 0 {
            return Err(ApiError::FavoriteNotFound);
        }
        info!("User {} removed SKU {} from favorites", user, sku);
        Ok(())
    }
}
