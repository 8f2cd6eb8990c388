use crate::db::models::ErrorCode;
use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    #[error(transparent)]
    RedisError(#[from] redis::RedisError),

    #[error(transparent)]
    DbPool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("Redis record not found: {0}")]
    NotFound(String),

    #[error("Unexpected Error: {0}")]
    Custom(String),

    /// Carries the user facing message for the offending parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing or invalid user id header")]
    Unauthorized,

    #[error("Product not found")]
    ProductNotFound,

    #[error("SKU not found")]
    SkuNotFound,

    #[error("SKU already favorited")]
    AlreadyFavorited,

    #[error("Favorite not found")]
    FavoriteNotFound,

    #[error("SKU already recorded in view history")]
    AlreadyViewed,

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("SKU has no available stock")]
    InsufficientStock,

    #[error("Requested quantity {requested} exceeds available stock {available}")]
    ExceedsAvailableStock { requested: i64, available: i64 },

    #[error("Shipping address not found")]
    AddressNotFound,

    #[error("Coupon not found")]
    CouponNotFound,

    #[error("Coupon is not active")]
    CouponInactive,

    #[error("Coupon is outside of its validity period")]
    CouponExpired,

    #[error("Coupon minimum purchase amount {0} not met")]
    CouponMinPurchaseNotMet(f64),

    #[error("Insufficient points")]
    InsufficientPoints,

    #[error("Cart is empty")]
    CartEmpty,
}

/// Generic error messages for the API Responses
pub enum ErrorMessages {
    Unexpected,
    Database,
    InvalidBody,
    RouteNotFound,
}

// Use the ErrorMessages enum to display error messages for the API Responses
impl fmt::Display for ErrorMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessages::Unexpected => "予期しないエラーが発生しました。しばらくしてから再度お試しください。",
            ErrorMessages::Database => "データベースエラーが発生しました。しばらくしてから再度お試しください。",
            ErrorMessages::InvalidBody => "リクエストボディの形式が不正です。",
            ErrorMessages::RouteNotFound => "リソースが見つかりません。",
        };
        write!(f, "{message}")
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ProductNotFound
            | ApiError::SkuNotFound
            | ApiError::FavoriteNotFound
            | ApiError::CartItemNotFound
            | ApiError::AddressNotFound
            | ApiError::CouponNotFound => StatusCode::NOT_FOUND,
            ApiError::AlreadyFavorited
            | ApiError::AlreadyViewed
            | ApiError::InsufficientStock
            | ApiError::ExceedsAvailableStock { .. } => StatusCode::CONFLICT,
            ApiError::CouponInactive
            | ApiError::CouponExpired
            | ApiError::CouponMinPurchaseNotMet(_)
            | ApiError::InsufficientPoints
            | ApiError::CartEmpty => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Diesel(_)
            | ApiError::RedisError(_)
            | ApiError::DbPool(_)
            | ApiError::Serde(_)
            | ApiError::NotFound(_)
            | ApiError::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            ApiError::Unauthorized => ErrorCode::Unauthorized,
            ApiError::SkuNotFound => ErrorCode::SkuNotFound,
            ApiError::ProductNotFound
            | ApiError::FavoriteNotFound
            | ApiError::CartItemNotFound
            | ApiError::AddressNotFound => ErrorCode::NotFound,
            ApiError::AlreadyFavorited | ApiError::AlreadyViewed => ErrorCode::AlreadyExists,
            ApiError::InsufficientStock | ApiError::ExceedsAvailableStock { .. } => {
                ErrorCode::InsufficientStock
            }
            ApiError::CouponNotFound => ErrorCode::CouponNotFound,
            ApiError::CouponInactive => ErrorCode::CouponInvalid,
            ApiError::CouponExpired => ErrorCode::CouponExpired,
            ApiError::CouponMinPurchaseNotMet(_) => ErrorCode::CouponMinPurchaseNotMet,
            ApiError::InsufficientPoints => ErrorCode::InsufficientPoints,
            ApiError::CartEmpty => ErrorCode::CartEmpty,
            ApiError::Diesel(_)
            | ApiError::RedisError(_)
            | ApiError::DbPool(_)
            | ApiError::Serde(_)
            | ApiError::NotFound(_)
            | ApiError::Custom(_) => ErrorCode::InternalError,
        }
    }

    /// Message shown to the client. Infrastructure failures never leak their details
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidParameter(message) => message.clone(),
            ApiError::Unauthorized => "認証が必要です。".to_string(),
            ApiError::ProductNotFound => "商品が見つかりません。".to_string(),
            ApiError::SkuNotFound => "SKUが見つかりません。".to_string(),
            ApiError::AlreadyFavorited => "既にお気に入りに追加済みです。".to_string(),
            ApiError::FavoriteNotFound => "お気に入りが見つかりません。".to_string(),
            ApiError::AlreadyViewed => "既に閲覧履歴を記録しました".to_string(),
            ApiError::CartItemNotFound => "カートに商品が見つかりません。".to_string(),
            ApiError::InsufficientStock => "在庫がありません。".to_string(),
            ApiError::ExceedsAvailableStock { available, .. } => {
                format!("購入可能数を超えています。(在庫: {available}点)")
            }
            ApiError::AddressNotFound => "配送先住所が見つかりません。".to_string(),
            ApiError::CouponNotFound => "クーポンが見つかりません。".to_string(),
            ApiError::CouponInactive => "このクーポンは利用できません。".to_string(),
            ApiError::CouponExpired => "クーポンの有効期限外です。".to_string(),
            ApiError::CouponMinPurchaseNotMet(min) => format!(
                "クーポンの最低購入金額({})に達していません。",
                crate::services::misc::format_yen(*min)
            ),
            ApiError::InsufficientPoints => "保有ポイントが不足しています。".to_string(),
            ApiError::CartEmpty => "カートに商品がありません。".to_string(),
            ApiError::Diesel(_) | ApiError::DbPool(_) => ErrorMessages::Database.to_string(),
            ApiError::RedisError(_)
            | ApiError::Serde(_)
            | ApiError::NotFound(_)
            | ApiError::Custom(_) => ErrorMessages::Unexpected.to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        assert_eq!(
            ApiError::InvalidParameter("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::SkuNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::AlreadyFavorited.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::CouponExpired.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Diesel(diesel::result::Error::NotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::SkuNotFound.error_code(), ErrorCode::SkuNotFound);
        assert_eq!(ApiError::CartItemNotFound.error_code(), ErrorCode::NotFound);
        assert_eq!(ApiError::AlreadyViewed.error_code(), ErrorCode::AlreadyExists);
        assert_eq!(
            ApiError::ExceedsAvailableStock {
                requested: 3,
                available: 2
            }
            .error_code(),
            ErrorCode::InsufficientStock
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ApiError::ExceedsAvailableStock {
                requested: 5,
                available: 2
            }
            .user_message(),
            "購入可能数を超えています。(在庫: 2点)"
        );
        assert_eq!(
            ApiError::CouponMinPurchaseNotMet(3000.0).user_message(),
            "クーポンの最低購入金額(3,000円)に達していません。"
        );
        assert_eq!(
            ApiError::Custom("connection reset".to_string()).user_message(),
            ErrorMessages::Unexpected.to_string()
        );
    }
}
