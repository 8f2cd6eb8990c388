// src/api/index.rs

use axum::Json;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Static JSON response for the index endpoint
static INDEX_JSON: OnceLock<Value> = OnceLock::new();

fn endpoint(method: &str, path: &str, description: &str, params: Value) -> Value {
    json!({
        "path": path,
        "method": method,
        "description": description,
        "params": params
    })
}

fn paging_params() -> Value {
    json!({
        "page": { "type": "integer", "required": false, "description": "Page number starting from 1, defaults to 1" },
        "limit": { "type": "integer", "required": false, "description": "Page size between 1 and 100, defaults to 10" }
    })
}

/// Handler for the index endpoint that provides API documentation
///
/// # Endpoint: GET /
///
/// # Returns
/// * `Json<Value>` - JSON response containing API endpoint documentation
pub fn index() -> Json<Value> {
    let value = INDEX_JSON.get_or_init(|| {
        let mut review_params = paging_params();
        review_params["rating"] = json!({ "type": "integer", "required": false, "description": "Only reviews with this rating, 1 to 5" });
        review_params["sort"] = json!({ "type": "string", "required": false, "description": "newest, oldest, highest_rating, lowest_rating or most_helpful" });

        let mut qa_params = paging_params();
        qa_params["sort"] = json!({ "type": "string", "required": false, "description": "newest, oldest or most_helpful" });

        let mut favorite_params = paging_params();
        favorite_params["sort"] = json!({ "type": "string", "required": false, "description": "newest or oldest" });

        let cart_params = json!({
            "sku_id": { "type": "string", "required": true, "description": "SKU UUID" },
            "quantity": { "type": "integer", "required": false, "description": "Quantity of at least 1, defaults to 1" }
        });

        let address_params = json!({
            "postal_code": { "type": "string", "required": true, "description": "Up to 10 characters" },
            "prefecture": { "type": "string", "required": true, "description": "Up to 50 characters" },
            "city": { "type": "string", "required": true, "description": "Up to 100 characters" },
            "address_line1": { "type": "string", "required": true, "description": "Up to 255 characters" },
            "address_line2": { "type": "string", "required": false, "description": "Up to 255 characters" },
            "recipient_name": { "type": "string", "required": true, "description": "Up to 100 characters" },
            "phone_number": { "type": "string", "required": true, "description": "Up to 20 characters" },
            "is_default": { "type": "boolean", "required": false, "description": "Make this the default address" }
        });

        json!({
            "user_header": "User scoped endpoints require the X-User-Id header",
            "endpoints": [
                endpoint("GET", "/", "API endpoint documentation", json!({})),
                endpoint("GET", "/health", "Database and Redis health report", json!({})),
                endpoint("GET", "/api/v1/products/sku", "Product page data for a SKU", json!({
                    "skuId": { "type": "string", "required": false, "description": "SKU UUID" },
                    "productId": { "type": "string", "required": false, "description": "Product UUID, its default SKU is used without skuId" }
                })),
                endpoint("GET", "/api/v1/products/:product_id/variants", "Variant option groups of a product", json!({})),
                endpoint("GET", "/api/v1/skus/:sku_id/images", "Images of a SKU", json!({})),
                endpoint("GET", "/api/v1/products/:product_code/related", "Related products and categories", json!({
                    "limit": { "type": "integer", "required": false, "description": "Between 1 and 10, defaults to 5" }
                })),
                endpoint("GET", "/api/v1/products/:product_code/coordinates", "Staff coordinate sets featuring the product", json!({
                    "limit": { "type": "integer", "required": false, "description": "Between 1 and 5, defaults to 4" }
                })),
                endpoint("GET", "/api/v1/products/:product_code/reviews", "Approved reviews of a product", review_params),
                endpoint("GET", "/api/v1/products/:product_code/questions", "Answered questions of a product", qa_params),
                endpoint("GET", "/api/v1/favorites", "Favorite SKUs of the user", favorite_params),
                endpoint("POST", "/api/v1/favorites/:sku_id", "Add a SKU to favorites", json!({})),
                endpoint("DELETE", "/api/v1/favorites/:sku_id", "Remove a SKU from favorites", json!({})),
                endpoint("GET", "/api/v1/history", "SKU view history of the user", paging_params()),
                endpoint("POST", "/api/v1/history/:sku_id", "Record a SKU view", json!({})),
                endpoint("GET", "/api/v1/cart/items", "Cart contents and totals", json!({})),
                endpoint("POST", "/api/v1/cart/items", "Add a SKU to the cart", cart_params.clone()),
                endpoint("PUT", "/api/v1/cart/items", "Set the quantity of a cart line", cart_params),
                endpoint("DELETE", "/api/v1/cart/items/:sku_id", "Remove a cart line", json!({})),
                endpoint("GET", "/api/v1/addresses", "Shipping addresses of the user", json!({})),
                endpoint("POST", "/api/v1/addresses", "Add a shipping address", address_params.clone()),
                endpoint("PUT", "/api/v1/addresses/:address_id", "Change a shipping address", address_params),
                endpoint("DELETE", "/api/v1/addresses/:address_id", "Delete a shipping address", json!({})),
                endpoint("GET", "/api/v1/payments/methods", "Active payment methods", json!({})),
                endpoint("GET", "/api/v1/checkout", "Coupons, points and totals of the checkout", json!({})),
                endpoint("POST", "/api/v1/checkout/coupon", "Apply a coupon", json!({
                    "coupon_code": { "type": "string", "required": true, "description": "Coupon code" }
                })),
                endpoint("DELETE", "/api/v1/checkout/coupon", "Remove the applied coupon", json!({})),
                endpoint("POST", "/api/v1/checkout/points", "Use points for the checkout", json!({
                    "points_to_use": { "type": "integer", "required": true, "description": "Points to use, 0 releases them" }
                })),
            ]
        })
    });

    Json(value.clone())
}
