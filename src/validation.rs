use crate::db::models::{ShippingAddressInput, ShippingAddressParams};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const MIN_PRODUCT_CODE_LEN: usize = 7;

pub const INVALID_PRODUCT_ID: &str = "不正な商品識別子です。";
pub const INVALID_SKU_ID: &str = "不正なSKU ID形式です。";

/// Treats a missing or blank query value as absent
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validates a 1-based page number, defaulting to the first page
pub fn parse_page(value: Option<&str>) -> Result<i64, String> {
    match present(value) {
        None => Ok(1),
        Some(raw) => match raw.parse::<i64>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err("pageパラメータは1以上の数値で指定してください。".to_string()),
        },
    }
}

/// Validates a page size within `1..=max`
pub fn parse_limit(value: Option<&str>, default: i64, max: i64) -> Result<i64, String> {
    match present(value) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if (1..=max).contains(&limit) => Ok(limit),
            _ => Err(format!(
                "limitパラメータは1から{}の間で指定してください。",
                max
            )),
        },
    }
}

/// Validates the optional star rating filter
pub fn parse_rating(value: Option<&str>) -> Result<Option<i32>, String> {
    match present(value) {
        None => Ok(None),
        Some(raw) => match raw.parse::<i32>() {
            Ok(rating) if (1..=5).contains(&rating) => Ok(Some(rating)),
            _ => Err("ratingパラメータは1から5の間で指定してください。".to_string()),
        },
    }
}

/// Validates a cart quantity, defaulting to one
pub fn parse_quantity(value: Option<&str>) -> Result<i32, String> {
    match present(value) {
        None => Ok(1),
        Some(raw) => match raw.parse::<i32>() {
            Ok(quantity) if quantity >= 1 => Ok(quantity),
            _ => Err("quantityパラメータは1以上の数値で指定してください。".to_string()),
        },
    }
}

/// Validates a UUID shaped identifier
pub fn validate_uuid(value: &str, message: &str) -> Result<String, String> {
    let value = value.trim();
    Uuid::parse_str(value)
        .map(|_| value.to_string())
        .map_err(|_| message.to_string())
}

pub fn validate_sku_id(value: &str) -> Result<String, String> {
    validate_uuid(value, INVALID_SKU_ID)
}

pub fn validate_product_id(value: &str) -> Result<String, String> {
    validate_uuid(value, INVALID_PRODUCT_ID)
}

/// Validates the required `sku_id` query value of the cart calls
pub fn require_sku_id(value: Option<&str>) -> Result<String, String> {
    match present(value) {
        None => Err("sku_idは必須です。".to_string()),
        Some(raw) => validate_sku_id(raw),
    }
}

/// Target of the SKU lookup
#[derive(Debug, Clone, PartialEq)]
pub struct SkuLookup {
    pub sku_id: Option<String>,
    pub product_id: Option<String>,
}

/// Validates the SKU lookup query, at least one id is required
pub fn validate_sku_lookup(
    sku_id: Option<&str>,
    product_id: Option<&str>,
) -> Result<SkuLookup, String> {
    let sku_id = present(sku_id);
    let product_id = present(product_id);
    if sku_id.is_none() && product_id.is_none() {
        return Err(INVALID_PRODUCT_ID.to_string());
    }

    Ok(SkuLookup {
        sku_id: sku_id.map(validate_sku_id).transpose()?,
        product_id: product_id
            .map(|id| validate_uuid(id, INVALID_SKU_ID))
            .transpose()?,
    })
}

/// Validates the product code used by the review and Q&A lists
pub fn validate_product_code(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("不正な商品識別子です".to_string());
    }
    if value.chars().count() < MIN_PRODUCT_CODE_LEN {
        return Err(
            "不正な商品識別子です。商品コードは7桁以上で指定してください。".to_string(),
        );
    }
    Ok(value.to_string())
}

pub fn parse_address_id(value: &str) -> Result<i64, String> {
    match value.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err("address_idは1以上の数値で指定してください。".to_string()),
    }
}

/// Accepts a non-negative JSON integer. Values beyond `i64` saturate, the balance check rejects them
pub fn parse_points(value: Option<&Value>) -> Result<i64, String> {
    let points = value.and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_u64().map(|p| i64::try_from(p).unwrap_or(i64::MAX)))
    });
    match points {
        Some(points) if points >= 0 => Ok(points),
        _ => Err("points_to_useは0以上の数値で指定してください。".to_string()),
    }
}

pub fn require_coupon_code(value: Option<&str>) -> Result<String, String> {
    present(value)
        .map(ToOwned::to_owned)
        .ok_or_else(|| "coupon_codeは必須です。".to_string())
}

fn required_text(field: &str, value: Option<&str>, max: usize) -> Result<String, String> {
    let value = present(value).ok_or_else(|| format!("{}は必須です。", field))?;
    if value.chars().count() > max {
        return Err(format!("{}は{}文字以内で指定してください。", field, max));
    }
    Ok(value.to_string())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, String> {
    match present(value) {
        None => Ok(None),
        Some(value) if value.chars().count() > max => Err(format!(
            "{}は{}文字以内で指定してください。",
            field, max
        )),
        Some(value) => Ok(Some(value.to_string())),
    }
}

/// Validates a shipping address body field by field
pub fn validate_shipping_address(
    input: &ShippingAddressInput,
) -> Result<ShippingAddressParams, String> {
    Ok(ShippingAddressParams {
        postal_code: required_text("postal_code", input.postal_code.as_deref(), 10)?,
        prefecture: required_text("prefecture", input.prefecture.as_deref(), 50)?,
        city: required_text("city", input.city.as_deref(), 100)?,
        address_line1: required_text("address_line1", input.address_line1.as_deref(), 255)?,
        address_line2: optional_text("address_line2", input.address_line2.as_deref(), 255)?,
        recipient_name: required_text("recipient_name", input.recipient_name.as_deref(), 100)?,
        phone_number: required_text("phone_number", input.phone_number.as_deref(), 20)?,
        is_default: input.is_default,
    })
}

/// Orderings of the review list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    Newest,
    Oldest,
    HighestRating,
    LowestRating,
    MostHelpful,
}

impl ReviewSort {
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match present(value) {
            None | Some("newest") => Ok(Self::Newest),
            Some("oldest") => Ok(Self::Oldest),
            Some("highest_rating") => Ok(Self::HighestRating),
            Some("lowest_rating") => Ok(Self::LowestRating),
            Some("most_helpful") => Ok(Self::MostHelpful),
            Some(_) => Err("不正なsortパラメータです。('newest', 'oldest', 'highest_rating', 'lowest_rating', 'most_helpful' のいずれかを指定)".to_string()),
        }
    }
}

/// Orderings of the Q&A list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaSort {
    Newest,
    Oldest,
    MostHelpful,
}

impl QaSort {
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match present(value) {
            None | Some("newest") => Ok(Self::Newest),
            Some("oldest") => Ok(Self::Oldest),
            Some("most_helpful") => Ok(Self::MostHelpful),
            Some(_) => Err(
                "不正なsortパラメータです。('newest', 'oldest', 'most_helpful' のいずれかを指定)"
                    .to_string(),
            ),
        }
    }
}

/// Orderings of the favorites list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteSort {
    Newest,
    Oldest,
}

impl FavoriteSort {
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match present(value) {
            None | Some("newest") => Ok(Self::Newest),
            Some("oldest") => Ok(Self::Oldest),
            Some(_) => Err(
                "不正なsortパラメータです。('newest', 'oldest' のいずれかを指定)".to_string(),
            ),
        }
    }
}
