use crate::db::models::{CartItemInfo, CartResponse, NewCartItem};
use crate::db::sku::{available_stock, available_stocks, find_sku_product, SkuDetails};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::misc::{format_yen, stock_status};
use crate::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;

/// One cart line joined with its product, prices are looked up separately
#[derive(Debug, Clone)]
pub struct CartLine {
    pub sku_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub quantity: i32,
}

/// Rejects a quantity the SKU cannot cover
fn check_stock(requested: i64, available: i64) -> Result<i32> {
    if available <= 0 {
        return Err(ApiError::InsufficientStock);
    }
    if requested > available {
        return Err(ApiError::ExceedsAvailableStock {
            requested,
            available,
        });
    }
    i32::try_from(requested).map_err(|_| ApiError::ExceedsAvailableStock {
        requested,
        available,
    })
}

/// Cart lines of a user, most recently touched first
pub async fn load_cart_lines(conn: &mut AsyncPgConnection, user: i64) -> Result<Vec<CartLine>> {
    use crate::schema::{product_skus, products, user_cart_items};

    let rows = user_cart_items::table
        .inner_join(product_skus::table.inner_join(products::table))
        .filter(user_cart_items::user_id.eq(user))
        .order((user_cart_items::updated_at.desc(), user_cart_items::id.desc()))
        .select((
            user_cart_items::sku_id,
            product_skus::product_id,
            products::name,
            products::product_code,
            user_cart_items::quantity,
        ))
        .load::<(String, String, String, Option<String>, i32)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(sku_id, product_id, product_name, product_code, quantity)| CartLine {
                sku_id,
                product_id,
                product_name,
                product_code,
                quantity,
            },
        )
        .collect())
}

/// Subtotal of the cart at current prices, together with whether it is empty
pub async fn cart_subtotal(
    conn: &mut AsyncPgConnection,
    user: i64,
    now: NaiveDateTime,
) -> Result<(f64, bool)> {
    let lines = load_cart_lines(conn, user).await?;
    let sku_ids: Vec<String> = lines.iter().map(|line| line.sku_id.clone()).collect();
    let details = SkuDetails::load(conn, &sku_ids, now).await?;

    let subtotal = lines
        .iter()
        .map(|line| {
            details
                .price(&line.sku_id)
                .map_or(0.0, |price| price.amount * f64::from(line.quantity))
        })
        .sum();
    Ok((subtotal, lines.is_empty()))
}

/// DbClient helper functions for the user_cart_items table
impl DbClient {
    pub async fn get_cart_items(&self, user: i64) -> Result<CartResponse> {
        let conn = &mut self.get_db_conn().await?;

        let lines = load_cart_lines(conn, user).await?;
        let sku_ids: Vec<String> = lines.iter().map(|line| line.sku_id.clone()).collect();
        let details = SkuDetails::load(conn, &sku_ids, Utc::now().naive_utc()).await?;
        let stocks = available_stocks(conn, &sku_ids).await?;

        info!("Found {} cart lines for user {}", lines.len(), user);

        let mut total_items_count = 0i64;
        let mut total_amount = 0.0;
        let items = lines
            .into_iter()
            .map(|line| {
                let price = details.price(&line.sku_id);
                let subtotal = price
                    .as_ref()
                    .map_or(0.0, |p| p.amount * f64::from(line.quantity));
                total_items_count += i64::from(line.quantity);
                total_amount += subtotal;

                CartItemInfo {
                    primary_image: details.primary_image(&line.sku_id),
                    attributes: details.attributes(&line.sku_id),
                    stock_status: stock_status(stocks.get(&line.sku_id).copied().unwrap_or(0))
                        .to_string(),
                    subtotal_formatted: format_yen(subtotal),
                    price,
                    sku_id: line.sku_id,
                    product_id: line.product_id,
                    product_name: line.product_name,
                    product_code: line.product_code,
                    quantity: line.quantity,
                }
            })
            .collect();

        Ok(CartResponse {
            items,
            total_items_count,
            total_amount,
            total_amount_formatted: format_yen(total_amount),
        })
    }

    /// Adds `add_quantity` of a SKU, stacking on a line already in the cart
    pub async fn add_cart_item(&self, user: i64, sku: &str, add_quantity: i32) -> Result<i32> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let new_quantity = conn
            .transaction::<_, ApiError, _>(|conn| {
                async move {
                    use crate::schema::user_cart_items::dsl::*;

                    find_sku_product(conn, sku).await?;
                    let available = available_stock(conn, sku).await?;
                    check_stock(i64::from(add_quantity), available)?;

                    // Increment in place so concurrent adds of the same SKU both count
                    let now = Utc::now().naive_utc();
                    let new_quantity = diesel::insert_into(user_cart_items)
                        .values(NewCartItem {
                            user_id: user,
                            sku_id: sku,
                            quantity: add_quantity,
                            created_at: now,
                            updated_at: now,
                        })
                        .on_conflict((user_id, sku_id))
                        .do_update()
                        .set((quantity.eq(quantity + add_quantity), updated_at.eq(now)))
                        .returning(quantity)
                        .get_result::<i32>(conn)
                        .await?;

                    check_stock(i64::from(new_quantity), available)?;

                    Ok(new_quantity)
                }
                .scope_boxed()
            })
            .await?;

        info!("User {} now has {} of SKU {} in cart", user, new_quantity, sku);
        Ok(new_quantity)
    }

    /// Sets the quantity of a line already in the cart
    pub async fn change_cart_item(&self, user: i64, sku: &str, new_quantity: i32) -> Result<()> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction::<_, ApiError, _>(|conn| {
            async move {
                use crate::schema::user_cart_items::dsl::*;

                find_sku_product(conn, sku).await?;

                let line = user_cart_items
                    .filter(user_id.eq(user))
                    .filter(sku_id.eq(sku))
                    .select(id)
                    .for_update()
                    .first::<i64>(conn)
                    .await
                    .optional()?
                    .ok_or(ApiError::CartItemNotFound)?;

                let available = available_stock(conn, sku).await?;
                let checked = check_stock(i64::from(new_quantity), available)?;

                diesel::update(user_cart_items.filter(id.eq(line)))
                    .set((
                        quantity.eq(checked),
                        updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        info!("User {} set SKU {} quantity to {}", user, sku, new_quantity);
        Ok(())
    }

    pub async fn delete_cart_item(&self, user: i64, sku: &str) -> Result<()> {
        use crate::schema::user_cart_items::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        find_sku_product(conn, sku).await?;

        let deleted = diesel::delete(user_cart_items.filter(user_id.eq(user)).filter(sku_id.eq(sku)))
            .execute(conn)
            .await?;

        if deleted == 0 {
            return Err(ApiError::CartItemNotFound);
        }
        info!("User {} removed SKU {} from cart", user, sku);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{seed_product, seed_regular_price, seed_stock, test_client, unique_user};

    #[test]
    fn test_check_stock() {
        assert!(matches!(check_stock(1, 0), Err(ApiError::InsufficientStock)));
        assert!(matches!(check_stock(1, -3), Err(ApiError::InsufficientStock)));
        assert!(matches!(
            check_stock(6, 5),
            Err(ApiError::ExceedsAvailableStock {
                requested: 6,
                available: 5
            })
        ));
        assert_eq!(check_stock(5, 5).unwrap(), 5);
    }

    async fn cart_quantity(client: &DbClient, user: i64, sku: &str) -> Option<i32> {
        client
            .get_cart_items(user)
            .await
            .unwrap()
            .items
            .into_iter()
            .find(|item| item.sku_id == sku)
            .map(|item| item.quantity)
    }

    #[tokio::test]
    async fn test_add_stacks_until_available_stock() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        seed_regular_price(conn, &product.sku_id, 1200.0).await;
        seed_stock(conn, &product.sku_id, 4, 1).await;
        seed_stock(conn, &product.sku_id, 3, 1).await;
        let user = unique_user();

        assert_eq!(client.add_cart_item(user, &product.sku_id, 2).await.unwrap(), 2);
        assert_eq!(client.add_cart_item(user, &product.sku_id, 3).await.unwrap(), 5);

        let err = client.add_cart_item(user, &product.sku_id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::ExceedsAvailableStock {
                requested: 6,
                available: 5
            }
        ));
        assert_eq!(err.user_message(), "購入可能数を超えています。(在庫: 5点)");
        assert_eq!(cart_quantity(&client, user, &product.sku_id).await, Some(5));

        let cart = client.get_cart_items(user).await.unwrap();
        assert_eq!(cart.total_items_count, 5);
        assert_eq!(cart.total_amount, 6000.0);
    }

    #[tokio::test]
    async fn test_add_without_stock() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        seed_stock(conn, &product.sku_id, 2, 2).await;
        let user = unique_user();

        assert!(matches!(
            client.add_cart_item(user, &product.sku_id, 1).await,
            Err(ApiError::InsufficientStock)
        ));
        assert_eq!(cart_quantity(&client, user, &product.sku_id).await, None);
    }

    #[tokio::test]
    async fn test_concurrent_adds_both_count() {
        let Some(client) = test_client() else {
            return;
        };
        let product = {
            let conn = &mut client.get_db_conn().await.unwrap();
            let product = seed_product(conn).await;
            seed_stock(conn, &product.sku_id, 10, 0).await;
            product
        };
        let user = unique_user();

        let (first, second) = tokio::join!(
            client.add_cart_item(user, &product.sku_id, 1),
            client.add_cart_item(user, &product.sku_id, 1)
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(cart_quantity(&client, user, &product.sku_id).await, Some(2));
    }

    #[tokio::test]
    async fn test_change_sets_quantity_of_existing_line() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        seed_stock(conn, &product.sku_id, 6, 0).await;
        let user = unique_user();

        assert!(matches!(
            client.change_cart_item(user, &product.sku_id, 1).await,
            Err(ApiError::CartItemNotFound)
        ));

        client.add_cart_item(user, &product.sku_id, 4).await.unwrap();
        client.change_cart_item(user, &product.sku_id, 1).await.unwrap();
        assert_eq!(cart_quantity(&client, user, &product.sku_id).await, Some(1));

        assert!(matches!(
            client.change_cart_item(user, &product.sku_id, 7).await,
            Err(ApiError::ExceedsAvailableStock {
                requested: 7,
                available: 6
            })
        ));
        assert_eq!(cart_quantity(&client, user, &product.sku_id).await, Some(1));

        client.delete_cart_item(user, &product.sku_id).await.unwrap();
        assert!(matches!(
            client.delete_cart_item(user, &product.sku_id).await,
            Err(ApiError::CartItemNotFound)
        ));
    }
}
