use serde::{Deserialize, Serialize};

/// Machine readable error codes carried in the `code` field of failed responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidParameter,
    Unauthorized,
    NotFound,
    SkuNotFound,
    AlreadyExists,
    InsufficientStock,
    CouponNotFound,
    CouponInvalid,
    CouponExpired,
    CouponMinPurchaseNotMet,
    InsufficientPoints,
    CartEmpty,
    InternalError,
}

/// Envelope of a successful call: `{"code":200,"data":...,"msg":...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub code: u16,
    pub data: T,
    pub msg: String,
}

/// Envelope of a failed call, `data` is always null
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub data: Option<serde_json::Value>,
    pub msg: String,
}

/// Main API response enum
/// Encompasses all possible API response types
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(SuccessResponse<T>),
    Error(ErrorResponse),
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, msg: impl Into<String>) -> Self {
        Self::Success(SuccessResponse {
            code: 200,
            data,
            msg: msg.into(),
        })
    }

    pub fn error(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Error(ErrorResponse {
            code,
            data: None,
            msg: msg.into(),
        })
    }
}

/// Conversion implementations for ApiResponse
impl<T> From<ErrorResponse> for ApiResponse<T> {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

/// Price shown for a SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    /// Effective unit price
    pub amount: f64,
    /// Effective unit price as display text, e.g. "7,980円"
    pub formatted_amount: String,
    /// `original` for the regular price, otherwise the sale price type code
    #[serde(rename = "type")]
    pub price_type: String,
    /// Display name of the price type
    pub type_name: String,
    /// Regular price while a sale is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_original_amount: Option<String>,
}

/// Representative image of a SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: i32,
    pub url: String,
    pub alt_text: Option<String>,
}

/// One attribute value of a SKU, e.g. color = レッド
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub attribute_id: i32,
    pub attribute_name: String,
    pub attribute_code: String,
    pub value_string: String,
}

/// Details of the SKU a product page is showing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSkuInfo {
    pub sku_id: String,
    pub price: Option<PriceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_image: Option<ImageInfo>,
    pub attributes: Vec<AttributeInfo>,
}

/// Product header together with one of its SKUs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSkus {
    pub id: String,
    pub product_code: Option<String>,
    pub name: String,
    /// Description cut to 20 characters
    pub description: String,
    pub is_taxable: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub target_sku_info: TargetSkuInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOption {
    pub option_id: i32,
    pub option_value: String,
    pub option_code: String,
    /// SKUs of the product carrying this option, sorted
    pub linked_sku_ids: Vec<String>,
}

/// Selectable values of one variant attribute (color, size, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOptionGroup {
    pub attribute_id: i32,
    pub attribute_name: String,
    pub attribute_code: String,
    pub options: Vec<VariantOption>,
}

/// Response of the variant options lookup, cached in Redis per default SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariantResponse {
    pub product_info: ProductSkus,
    pub variants: Vec<VariantOptionGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkuImageInfo {
    pub id: i32,
    pub main_image_url: String,
    pub thumbnail_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

/// Aggregated review figures of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummaryInfo {
    pub average_rating: f64,
    pub review_count: i32,
    pub rating_1_count: i32,
    pub rating_2_count: i32,
    pub rating_3_count: i32,
    pub rating_4_count: i32,
    pub rating_5_count: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedProductInfo {
    pub product_id: String,
    pub product_code: Option<String>,
    pub product_name: String,
    /// e.g. "2,990円 ~ 3,990円"
    pub price_range_formatted: String,
    pub is_on_sale: bool,
    pub review_summary: Option<ReviewSummaryInfo>,
    pub thumbnail_image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedCategoryInfo {
    pub category_id: i32,
    pub category_name: String,
    pub category_level: i32,
    pub category_parent_id: Option<i32>,
    /// Names of the sibling categories
    pub category_links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedProductListResponse {
    pub related_products: Vec<RelatedProductInfo>,
    pub related_categories: RelatedCategoryInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoordinateSetTeaserInfo {
    pub set_id: String,
    pub set_theme_image_url: Option<String>,
    pub contributor_nickname: String,
    pub contributor_avatar_url: Option<String>,
    pub contributor_store_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoordinateSetTeaserListResponse {
    pub coordinates: Vec<CoordinateSetTeaserInfo>,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewInfo {
    pub id: i64,
    pub nickname: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: String,
    pub created_at_formatted: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub image_urls: Vec<String>,
    pub helpful_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub summary: Option<ReviewSummaryInfo>,
    pub reviews: Vec<ReviewInfo>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub id: i64,
    pub question_text: String,
    pub created_at_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerInfo {
    pub id: i64,
    pub answerer_name: String,
    pub answer_text: String,
    pub helpful_count: i64,
    pub created_at_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QaInfo {
    pub question: QuestionInfo,
    pub answer: AnswerInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QaListResponse {
    pub qa_list: Vec<QaInfo>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteSkuInfo {
    pub sku_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub price: Option<PriceInfo>,
    pub attributes: Vec<AttributeInfo>,
    pub added_at_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteSkuListResponse {
    pub favorites: Vec<FavoriteSkuInfo>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewedSkuInfo {
    pub sku_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub price_range_formatted: String,
    pub primary_image: Option<ImageInfo>,
    pub review_summary: Option<ReviewSummaryInfo>,
    pub viewed_at_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewedSkuListResponse {
    pub history: Vec<ViewedSkuInfo>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemInfo {
    pub sku_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_code: Option<String>,
    pub quantity: i32,
    pub price: Option<PriceInfo>,
    pub subtotal_formatted: String,
    pub primary_image: Option<ImageInfo>,
    pub attributes: Vec<AttributeInfo>,
    /// `available`, `low_stock` or `out_of_stock`
    pub stock_status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItemInfo>,
    /// Sum of all quantities
    pub total_items_count: i64,
    pub total_amount: f64,
    pub total_amount_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingAddressInfo {
    pub address_id: i64,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
    pub is_default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShippingAddressListResponse {
    pub addresses: Vec<ShippingAddressInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodInfo {
    pub method_id: i32,
    pub method_code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableCouponInfo {
    pub coupon_id: i64,
    pub coupon_code: String,
    pub name: String,
    pub description: Option<String>,
    /// e.g. "10% OFF (最大2,000円引)" or "500円引き"
    pub discount_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPointInfo {
    pub available_points: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppliedCouponInfo {
    pub coupon_id: i64,
    pub coupon_code: String,
    pub name: String,
    pub discount_amount: f64,
    pub formatted_discount_amount: String,
}

/// Amounts of the order being checked out
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentCheckoutState {
    pub cart_subtotal_formatted: String,
    pub applied_coupon_info: Option<AppliedCouponInfo>,
    pub coupon_discount_amount_formatted: String,
    pub used_points: i32,
    pub points_discount_amount_formatted: String,
    pub shipping_fee_formatted: String,
    pub total_amount_formatted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutInfoResponse {
    pub available_coupons: Vec<AvailableCouponInfo>,
    pub user_points: UserPointInfo,
    pub current_checkout_state: CurrentCheckoutState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(vec![1, 2], "取得しました");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"code": 200, "data": [1, 2], "msg": "取得しました"})
        );
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<()> =
            ApiResponse::error(ErrorCode::SkuNotFound, "SKUが見つかりません。");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"code": "SKU_NOT_FOUND", "data": null, "msg": "SKUが見つかりません。"})
        );
    }

    #[test]
    fn test_price_info_omits_original_amount_when_regular() {
        let price = PriceInfo {
            amount: 1000.0,
            formatted_amount: "1,000円".to_string(),
            price_type: "original".to_string(),
            type_name: "通常価格".to_string(),
            original_amount: None,
            formatted_original_amount: None,
        };
        let value = serde_json::to_value(&price).unwrap();
        assert_eq!(value["type"], "original");
        assert!(value.get("original_amount").is_none());
    }
}
