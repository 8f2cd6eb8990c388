use crate::db::models::{
    NewShippingAddress, ShippingAddress, ShippingAddressChangeset, ShippingAddressInfo,
    ShippingAddressParams,
};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::Result;
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;

/// DbClient helper functions for the user_shipping_addresses table
impl DbClient {
    pub async fn get_shipping_addresses(&self, user: i64) -> Result<Vec<ShippingAddressInfo>> {
        use crate::schema::user_shipping_addresses::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let addresses = user_shipping_addresses
            .filter(user_id.eq(user))
            .order((is_default.desc(), updated_at.desc(), id.desc()))
            .select(ShippingAddress::as_select())
            .load(conn)
            .await?;

        Ok(addresses.into_iter().map(Into::into).collect())
    }

    /// Stores a new address, taking over the default flag when requested
    pub async fn create_shipping_address(
        &self,
        user: i64,
        params: ShippingAddressParams,
    ) -> Result<ShippingAddressInfo> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let address = conn
            .transaction::<_, ApiError, _>(|conn| {
                async move {
                    use crate::schema::user_shipping_addresses::dsl::*;

                    if params.is_default {
                        diesel::update(
                            user_shipping_addresses
                                .filter(user_id.eq(user))
                                .filter(is_default.eq(true)),
                        )
                        .set(is_default.eq(false))
                        .execute(conn)
                        .await?;
                    }

                    let created = diesel::insert_into(user_shipping_addresses)
                        .values(NewShippingAddress::new(user, params, Utc::now().naive_utc()))
                        .returning(ShippingAddress::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(created)
                }
                .scope_boxed()
            })
            .await?;

        info!("User {} added shipping address {}", user, address.id);
        Ok(address.into())
    }

    /// Replaces an address the user owns
    pub async fn change_shipping_address(
        &self,
        user: i64,
        address: i64,
        params: ShippingAddressParams,
    ) -> Result<ShippingAddressInfo> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let updated = conn
            .transaction::<_, ApiError, _>(|conn| {
                async move {
                    use crate::schema::user_shipping_addresses::dsl::*;

                    user_shipping_addresses
                        .filter(id.eq(address))
                        .filter(user_id.eq(user))
                        .select(id)
                        .for_update()
                        .first::<i64>(conn)
                        .await
                        .optional()?
                        .ok_or(ApiError::AddressNotFound)?;

                    if params.is_default {
                        diesel::update(
                            user_shipping_addresses
                                .filter(user_id.eq(user))
                                .filter(id.ne(address))
                                .filter(is_default.eq(true)),
                        )
                        .set(is_default.eq(false))
                        .execute(conn)
                        .await?;
                    }

                    let changed = diesel::update(user_shipping_addresses.filter(id.eq(address)))
                        .set(ShippingAddressChangeset::new(params, Utc::now().naive_utc()))
                        .returning(ShippingAddress::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(changed)
                }
                .scope_boxed()
            })
            .await?;

        info!("User {} changed shipping address {}", user, address);
        Ok(updated.into())
    }

    pub async fn delete_shipping_address(&self, user: i64, address: i64) -> Result<()> {
        use crate::schema::user_shipping_addresses::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let deleted = diesel::delete(
            user_shipping_addresses
                .filter(id.eq(address))
                .filter(user_id.eq(user)),
        )
        .execute(conn)
        .await?;

        if deleted == 0 {
            return Err(ApiError::AddressNotFound);
        }
        info!("User {} deleted shipping address {}", user, address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{test_client, unique_user};

    fn params(city: &str, is_default: bool) -> ShippingAddressParams {
        ShippingAddressParams {
            postal_code: "150-0001".to_string(),
            prefecture: "東京都".to_string(),
            city: city.to_string(),
            address_line1: "神宮前1-2-3".to_string(),
            address_line2: None,
            recipient_name: "山田 花子".to_string(),
            phone_number: "03-1234-5678".to_string(),
            is_default,
        }
    }

    fn defaults(addresses: &[ShippingAddressInfo]) -> Vec<i64> {
        addresses
            .iter()
            .filter(|a| a.is_default)
            .map(|a| a.address_id)
            .collect()
    }

    #[tokio::test]
    async fn test_single_default_address_per_user() {
        let Some(client) = test_client() else {
            return;
        };
        let user = unique_user();
        let other_user = unique_user();

        let other = client
            .create_shipping_address(other_user, params("目黒区", true))
            .await
            .unwrap();
        let first = client
            .create_shipping_address(user, params("渋谷区", true))
            .await
            .unwrap();
        let second = client
            .create_shipping_address(user, params("港区", true))
            .await
            .unwrap();

        let addresses = client.get_shipping_addresses(user).await.unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0].address_id, second.address_id);
        assert_eq!(defaults(&addresses), vec![second.address_id]);

        let changed = client
            .change_shipping_address(user, first.address_id, params("新宿区", true))
            .await
            .unwrap();
        assert_eq!(changed.city, "新宿区");

        let addresses = client.get_shipping_addresses(user).await.unwrap();
        assert_eq!(defaults(&addresses), vec![first.address_id]);

        // Other users keep their own default
        let others = client.get_shipping_addresses(other_user).await.unwrap();
        assert_eq!(defaults(&others), vec![other.address_id]);
    }

    #[tokio::test]
    async fn test_foreign_address_is_not_found() {
        let Some(client) = test_client() else {
            return;
        };
        let owner = unique_user();
        let address = client
            .create_shipping_address(owner, params("渋谷区", false))
            .await
            .unwrap();

        let stranger = unique_user();
        assert!(matches!(
            client
                .change_shipping_address(stranger, address.address_id, params("港区", true))
                .await,
            Err(ApiError::AddressNotFound)
        ));
        assert!(matches!(
            client
                .delete_shipping_address(stranger, address.address_id)
                .await,
            Err(ApiError::AddressNotFound)
        ));

        client
            .delete_shipping_address(owner, address.address_id)
            .await
            .unwrap();
        assert!(client.get_shipping_addresses(owner).await.unwrap().is_empty());
    }
}
