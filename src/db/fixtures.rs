//! Seed rows for query tests running against `TEST_DATABASE_URL`.
//!
//! Every helper generates fresh ids and codes, so tests can share one migrated database
//! and run in parallel without cleaning up.

use crate::db::sku::{REGULAR_PRICE_TYPE_ID, SALE_PRICE_TYPE_ID};
use crate::db::DbClient;
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Int4, Nullable, Text, Timestamp};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

/// Client for the test database, None when `TEST_DATABASE_URL` is unset
///
/// Redis falls back to an address nothing listens on, so the variant cache simply misses.
pub fn test_client() -> Option<DbClient> {
    dotenv::dotenv().ok();
    let db_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let redis_url =
        std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:1".to_string());
    DbClient::with_config(&db_url, &redis_url, 4).ok()
}

/// Like `test_client`, but only when `TEST_REDIS_URL` is set as well
pub fn test_client_with_redis() -> Option<DbClient> {
    std::env::var("TEST_REDIS_URL").ok()?;
    test_client()
}

/// Id for tables without a sequence, also used as a user id
pub fn unique_id() -> i32 {
    1_000_000_000 + (Uuid::new_v4().as_u128() % 1_000_000_000) as i32
}

pub fn unique_user() -> i64 {
    i64::from(unique_id())
}

pub fn days_from_now(days: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::days(days)
}

#[derive(Debug, Clone)]
pub struct ProductFixture {
    pub category_id: i32,
    pub product_id: String,
    pub product_code: String,
    pub sku_id: String,
}

/// An active product in its own category, with one SKU set as default
pub async fn seed_product(conn: &mut AsyncPgConnection) -> ProductFixture {
    let category_id = unique_id();
    let product_id = Uuid::new_v4().to_string();
    let product_code = format!("T{}", category_id);

    sql_query("INSERT INTO categories (id, name) VALUES ($1, $2)")
        .bind::<Int4, _>(category_id)
        .bind::<Text, _>(format!("テストカテゴリ{}", category_id))
        .execute(conn)
        .await
        .unwrap();

    sql_query(
        "INSERT INTO products (id, name, description, product_code, category_id, status)
         VALUES ($1, 'テスト商品', 'テスト用の商品説明です', $2, $3, 'active')",
    )
    .bind::<Text, _>(&product_id)
    .bind::<Text, _>(&product_code)
    .bind::<Int4, _>(category_id)
    .execute(conn)
    .await
    .unwrap();

    let sku_id = seed_sku(conn, &product_id).await;
    sql_query("UPDATE products SET default_sku_id = $1 WHERE id = $2")
        .bind::<Text, _>(&sku_id)
        .bind::<Text, _>(&product_id)
        .execute(conn)
        .await
        .unwrap();

    ProductFixture {
        category_id,
        product_id,
        product_code,
        sku_id,
    }
}

pub async fn seed_sku(conn: &mut AsyncPgConnection, product_id: &str) -> String {
    let sku_id = Uuid::new_v4().to_string();
    sql_query("INSERT INTO product_skus (id, product_id, sku_code) VALUES ($1, $2, $3)")
        .bind::<Text, _>(&sku_id)
        .bind::<Text, _>(product_id)
        .bind::<Text, _>(format!("SKU-{}", sku_id))
        .execute(conn)
        .await
        .unwrap();
    sku_id
}

pub async fn seed_regular_price(conn: &mut AsyncPgConnection, sku_id: &str, price: f64) {
    seed_price(conn, sku_id, REGULAR_PRICE_TYPE_ID, price, None, None).await;
}

pub async fn seed_sale_price(
    conn: &mut AsyncPgConnection,
    sku_id: &str,
    price: f64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) {
    seed_price(conn, sku_id, SALE_PRICE_TYPE_ID, price, Some(start), Some(end)).await;
}

async fn seed_price(
    conn: &mut AsyncPgConnection,
    sku_id: &str,
    price_type_id: i32,
    price: f64,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) {
    sql_query(
        "INSERT INTO prices (id, sku_id, price_type_id, price, start_date, end_date)
         VALUES ($1, $2, $3, CAST($4 AS NUMERIC), $5, $6)",
    )
    .bind::<BigInt, _>(i64::from(unique_id()))
    .bind::<Text, _>(sku_id)
    .bind::<Int4, _>(price_type_id)
    .bind::<Double, _>(price)
    .bind::<Nullable<Timestamp>, _>(start)
    .bind::<Nullable<Timestamp>, _>(end)
    .execute(conn)
    .await
    .unwrap();
}

/// Stock at a new warehouse, available stock grows by `quantity - reserved`
pub async fn seed_stock(conn: &mut AsyncPgConnection, sku_id: &str, quantity: i32, reserved: i32) {
    let location_id = unique_id();
    sql_query(
        "INSERT INTO inventory_locations (id, location_code, name, location_type)
         VALUES ($1, $2, 'テスト倉庫', 'warehouse')",
    )
    .bind::<Int4, _>(location_id)
    .bind::<Text, _>(format!("LOC{}", location_id))
    .execute(conn)
    .await
    .unwrap();

    sql_query(
        "INSERT INTO inventory (id, sku_id, location_id, quantity, reserved_quantity)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind::<BigInt, _>(i64::from(unique_id()))
    .bind::<Text, _>(sku_id)
    .bind::<Int4, _>(location_id)
    .bind::<Int4, _>(quantity)
    .bind::<Int4, _>(reserved)
    .execute(conn)
    .await
    .unwrap();
}
