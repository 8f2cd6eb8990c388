use serde::Deserialize;

// Query and body inputs keep raw strings so validation can answer with its own messages
// instead of the extractor's rejection text.

/// Query of the SKU lookup, either id may be given
#[derive(Debug, Default, Deserialize)]
pub struct SkuLookupQuery {
    #[serde(rename = "skuId")]
    pub sku_id: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// Paging and ordering shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CartItemQuery {
    pub sku_id: Option<String>,
    pub quantity: Option<String>,
}

/// Body of the address create and change calls
#[derive(Debug, Default, Deserialize)]
pub struct ShippingAddressInput {
    pub postal_code: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub recipient_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Address fields after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingAddressParams {
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyCouponRequest {
    pub coupon_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsePointsRequest {
    pub points_to_use: Option<serde_json::Value>,
}
