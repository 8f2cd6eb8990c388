use super::DbClient;
use crate::errors::ApiError;
use crate::Result;
use redis::AsyncCommands;

/// Cache key of the variant options response built for a product's default SKU
pub fn variant_cache_key(default_sku_id: &str) -> String {
    format!("skuid:{}", default_sku_id)
}

impl DbClient {
    pub async fn set_cache(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut redis_conn = self.get_async_redis_conn().await.map_err(|err| {
            tracing::error!("Redis connection error: {}", err);
            ApiError::from(err)
        })?;

        redis_conn
            .set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|err| {
                tracing::error!("Redis SET failed: {}", err);
                ApiError::from(err)
            })?;
        tracing::info!("Cache set for key: {}", key);
        Ok(())
    }

    pub async fn get_cache(&self, key: &str) -> Result<String> {
        let mut redis_conn = self.get_async_redis_conn().await.map_err(|err| {
            tracing::error!("Redis connection error: {}", err);
            ApiError::from(err)
        })?;

        let value: Option<String> = redis_conn.get(key).await.map_err(|err| {
            tracing::error!("Redis GET failed: {}", err);
            ApiError::from(err)
        })?;

        value.ok_or_else(|| ApiError::NotFound(key.to_string()))
    }

    pub async fn delete_cache(&self, key: &str) -> Result<()> {
        let mut redis_conn = self.get_async_redis_conn().await?;
        redis_conn.del::<_, ()>(key).await.map_err(|err| {
            tracing::error!("Redis DEL failed: {}", err);
            ApiError::from(err)
        })?;
        tracing::info!("Cache cleared for key: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_cache_key() {
        assert_eq!(
            variant_cache_key("0b6e3f7a-1c2d-4e5f-8a9b-0c1d2e3f4a5b"),
            "skuid:0b6e3f7a-1c2d-4e5f-8a9b-0c1d2e3f4a5b"
        );
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        dotenv::dotenv().ok();
        let Ok(redis_url) = std::env::var("TEST_REDIS_URL") else {
            return;
        };
        let client = DbClient::new("postgres://localhost/unused", &redis_url).unwrap();

        client.set_cache("catalog-test-key", "value", 30).await.unwrap();
        assert_eq!(client.get_cache("catalog-test-key").await.unwrap(), "value");

        client.delete_cache("catalog-test-key").await.unwrap();
        assert!(matches!(
            client.get_cache("catalog-test-key").await,
            Err(ApiError::NotFound(_))
        ));
    }
}
