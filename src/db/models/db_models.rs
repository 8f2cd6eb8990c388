use crate::schema::{
    categories, checkout_sessions, payment_methods, products, review_summaries, user_cart_items,
    user_favorite_skus, user_shipping_addresses, user_viewed_skus,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Float8, Int4, Int8, Nullable, Text, Timestamp};

use super::{
    PaymentMethodInfo, ReviewSummaryInfo, ShippingAddressInfo, ShippingAddressParams,
};

/// Product columns needed to render a product header
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
pub struct ProductHeader {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_code: Option<String>,
    pub category_id: i32,
    pub default_sku_id: Option<String>,
    pub is_taxable: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub level: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_favorite_skus)]
pub struct NewFavoriteSku<'a> {
    pub user_id: i64,
    pub sku_id: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_viewed_skus)]
pub struct NewViewedSku<'a> {
    pub user_id: i64,
    pub sku_id: &'a str,
    pub viewed_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_cart_items)]
pub struct NewCartItem<'a> {
    pub user_id: i64,
    pub sku_id: &'a str,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = user_shipping_addresses, primary_key(id))]
pub struct ShippingAddress {
    pub id: i64,
    pub user_id: i64,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ShippingAddress> for ShippingAddressInfo {
    fn from(address: ShippingAddress) -> Self {
        ShippingAddressInfo {
            address_id: address.id,
            postal_code: address.postal_code,
            prefecture: address.prefecture,
            city: address.city,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            recipient_name: address.recipient_name,
            phone_number: address.phone_number,
            is_default: address.is_default,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_shipping_addresses)]
pub struct NewShippingAddress {
    pub user_id: i64,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewShippingAddress {
    pub fn new(user_id: i64, params: ShippingAddressParams, now: NaiveDateTime) -> Self {
        NewShippingAddress {
            user_id,
            postal_code: params.postal_code,
            prefecture: params.prefecture,
            city: params.city,
            address_line1: params.address_line1,
            address_line2: params.address_line2,
            recipient_name: params.recipient_name,
            phone_number: params.phone_number,
            is_default: params.is_default,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full replacement of an address, a missing second line clears the column
#[derive(Debug, AsChangeset)]
#[diesel(table_name = user_shipping_addresses, treat_none_as_null = true)]
pub struct ShippingAddressChangeset {
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub recipient_name: String,
    pub phone_number: String,
    pub is_default: bool,
    pub updated_at: NaiveDateTime,
}

impl ShippingAddressChangeset {
    pub fn new(params: ShippingAddressParams, now: NaiveDateTime) -> Self {
        ShippingAddressChangeset {
            postal_code: params.postal_code,
            prefecture: params.prefecture,
            city: params.city,
            address_line1: params.address_line1,
            address_line2: params.address_line2,
            recipient_name: params.recipient_name,
            phone_number: params.phone_number,
            is_default: params.is_default,
            updated_at: now,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = payment_methods)]
pub struct PaymentMethod {
    pub id: i32,
    pub method_code: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<PaymentMethod> for PaymentMethodInfo {
    fn from(method: PaymentMethod) -> Self {
        PaymentMethodInfo {
            method_id: method.id,
            method_code: method.method_code,
            name: method.name,
            description: method.description,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = review_summaries)]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub review_count: i32,
    pub rating_1_count: i32,
    pub rating_2_count: i32,
    pub rating_3_count: i32,
    pub rating_4_count: i32,
    pub rating_5_count: i32,
}

impl From<ReviewSummary> for ReviewSummaryInfo {
    fn from(summary: ReviewSummary) -> Self {
        ReviewSummaryInfo {
            average_rating: summary.average_rating,
            review_count: summary.review_count,
            rating_1_count: summary.rating_1_count,
            rating_2_count: summary.rating_2_count,
            rating_3_count: summary.rating_3_count,
            rating_4_count: summary.rating_4_count,
            rating_5_count: summary.rating_5_count,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = checkout_sessions)]
pub struct CheckoutSession {
    pub user_id: i64,
    pub applied_coupon_id: Option<i64>,
    pub used_points: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = checkout_sessions)]
pub struct NewCheckoutSession {
    pub user_id: i64,
    pub applied_coupon_id: Option<i64>,
    pub used_points: i32,
    pub updated_at: NaiveDateTime,
}

/// Regular price and the currently running sale price of a SKU
#[derive(Debug, Clone, QueryableByName)]
pub struct SkuPriceRow {
    #[diesel(sql_type = Text)]
    pub sku_id: String,
    #[diesel(sql_type = Nullable<Float8>)]
    pub regular_price: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub sale_price: Option<f64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub sale_type_code: Option<String>,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SkuPrimaryImageRow {
    #[diesel(sql_type = Text)]
    pub sku_id: String,
    #[diesel(sql_type = Int4)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub main_image_url: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SkuAttributeRow {
    #[diesel(sql_type = Text)]
    pub sku_id: String,
    #[diesel(sql_type = Int4)]
    pub attribute_id: i32,
    #[diesel(sql_type = Text)]
    pub attribute_name: String,
    #[diesel(sql_type = Text)]
    pub attribute_code: String,
    #[diesel(sql_type = Text)]
    pub value_string: String,
}

/// One (attribute, option, SKU) triple of a product's variant axes
#[derive(Debug, Clone, QueryableByName)]
pub struct VariantOptionRow {
    #[diesel(sql_type = Int4)]
    pub attribute_id: i32,
    #[diesel(sql_type = Text)]
    pub attribute_name: String,
    #[diesel(sql_type = Text)]
    pub attribute_code: String,
    #[diesel(sql_type = Int4)]
    pub option_id: i32,
    #[diesel(sql_type = Text)]
    pub option_value: String,
    #[diesel(sql_type = Text)]
    pub option_code: String,
    #[diesel(sql_type = Text)]
    pub sku_id: String,
}

/// Review summary columns pulled in through a LEFT JOIN
#[derive(Debug, Clone, QueryableByName)]
pub struct JoinedReviewSummary {
    #[diesel(sql_type = Nullable<Float8>)]
    pub average_rating: Option<f64>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub review_count: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub rating_1_count: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub rating_2_count: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub rating_3_count: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub rating_4_count: Option<i32>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub rating_5_count: Option<i32>,
}

impl JoinedReviewSummary {
    /// None when the product has no summary row
    pub fn into_info(self) -> Option<ReviewSummaryInfo> {
        let review_count = self.review_count?;
        Some(ReviewSummaryInfo {
            average_rating: self.average_rating.unwrap_or_default(),
            review_count,
            rating_1_count: self.rating_1_count.unwrap_or_default(),
            rating_2_count: self.rating_2_count.unwrap_or_default(),
            rating_3_count: self.rating_3_count.unwrap_or_default(),
            rating_4_count: self.rating_4_count.unwrap_or_default(),
            rating_5_count: self.rating_5_count.unwrap_or_default(),
        })
    }
}

#[derive(Debug, QueryableByName)]
pub struct RelatedProductRow {
    #[diesel(sql_type = Text)]
    pub product_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub product_code: Option<String>,
    #[diesel(sql_type = Text)]
    pub product_name: String,
    #[diesel(sql_type = Nullable<Float8>)]
    pub min_price: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub max_price: Option<f64>,
    #[diesel(sql_type = Bool)]
    pub is_on_sale: bool,
    #[diesel(sql_type = Nullable<Text>)]
    pub thumbnail_image_url: Option<String>,
    #[diesel(embed)]
    pub summary: JoinedReviewSummary,
}

#[derive(Debug, QueryableByName)]
pub struct ReviewRow {
    #[diesel(sql_type = Int8)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub nickname: String,
    #[diesel(sql_type = Int4)]
    pub rating: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub title: Option<String>,
    #[diesel(sql_type = Text)]
    pub comment: String,
    #[diesel(sql_type = Timestamp)]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = BigInt)]
    pub helpful_count: i64,
}

#[derive(Debug, QueryableByName)]
pub struct QaRow {
    #[diesel(sql_type = Int8)]
    pub question_id: i64,
    #[diesel(sql_type = Text)]
    pub question_text: String,
    #[diesel(sql_type = Timestamp)]
    pub question_created_at: NaiveDateTime,
    #[diesel(sql_type = Int8)]
    pub answer_id: i64,
    #[diesel(sql_type = Text)]
    pub answerer_name: String,
    #[diesel(sql_type = Text)]
    pub answer_text: String,
    #[diesel(sql_type = Timestamp)]
    pub answer_created_at: NaiveDateTime,
    #[diesel(sql_type = BigInt)]
    pub helpful_count: i64,
}

#[derive(Debug, QueryableByName)]
pub struct ViewedSkuRow {
    #[diesel(sql_type = Text)]
    pub sku_id: String,
    #[diesel(sql_type = Text)]
    pub product_id: String,
    #[diesel(sql_type = Text)]
    pub product_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub product_code: Option<String>,
    #[diesel(sql_type = Timestamp)]
    pub viewed_at: NaiveDateTime,
    #[diesel(sql_type = Nullable<Float8>)]
    pub min_price: Option<f64>,
    #[diesel(sql_type = Nullable<Float8>)]
    pub max_price: Option<f64>,
    #[diesel(embed)]
    pub summary: JoinedReviewSummary,
}

/// Coupon with its money columns cast to floating point
#[derive(Debug, Clone, QueryableByName)]
pub struct Coupon {
    #[diesel(sql_type = Int8)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub coupon_code: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Text)]
    pub discount_type: String,
    #[diesel(sql_type = Float8)]
    pub discount_value: f64,
    #[diesel(sql_type = Nullable<Float8>)]
    pub max_discount_amount: Option<f64>,
    #[diesel(sql_type = Float8)]
    pub min_purchase_amount: f64,
    #[diesel(sql_type = Bool)]
    pub is_active: bool,
    #[diesel(sql_type = Timestamp)]
    pub start_date: NaiveDateTime,
    #[diesel(sql_type = Timestamp)]
    pub end_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(review_count: Option<i32>) -> JoinedReviewSummary {
        JoinedReviewSummary {
            average_rating: review_count.map(|_| 4.5),
            review_count,
            rating_1_count: review_count.map(|_| 0),
            rating_2_count: review_count.map(|_| 0),
            rating_3_count: review_count.map(|_| 1),
            rating_4_count: review_count.map(|_| 0),
            rating_5_count: review_count.map(|_| 1),
        }
    }

    #[test]
    fn test_joined_summary_missing_row_is_none() {
        assert!(joined(None).into_info().is_none());
    }

    #[test]
    fn test_joined_summary_present() {
        let info = joined(Some(2)).into_info().unwrap();
        assert_eq!(info.review_count, 2);
        assert_eq!(info.average_rating, 4.5);
        assert_eq!(info.rating_5_count, 1);
    }
}
