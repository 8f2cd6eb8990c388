use chrono::NaiveDateTime;

/// Stock level under which a SKU is reported as running low
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Formats a number with thousands separators and at most two decimals
///
/// # Arguments
/// * `amount` - Value to format
///
/// # Returns
/// * `String` - e.g. `1,234` or `1,234.5`, decimals only when non-zero
pub fn format_number(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut text = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if amount < 0.0 && cents > 0 {
        text.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            text.push(',');
        }
        text.push(ch);
    }

    if fraction > 0 {
        let decimals = format!("{:02}", fraction);
        text.push('.');
        text.push_str(decimals.trim_end_matches('0'));
    }
    text
}

/// Formats an amount of yen for display
///
/// # Arguments
/// * `amount` - Amount in yen
///
/// # Returns
/// * `String` - e.g. `1,234円`
pub fn format_yen(amount: f64) -> String {
    format!("{}円", format_number(amount))
}

/// Formats a price range, collapsing it when both ends are equal
///
/// # Arguments
/// * `min` - Lowest price
/// * `max` - Highest price
///
/// # Returns
/// * `String` - `1,000円` or `1,000円 ~ 2,000円`
pub fn format_price_range(min: f64, max: f64) -> String {
    if (max - min).abs() < f64::EPSILON {
        format_yen(min)
    } else {
        format!("{} ~ {}", format_yen(min), format_yen(max))
    }
}

/// Price range of nullable aggregate columns, empty when no price exists
pub fn format_optional_price_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format_price_range(min, max),
        (Some(single), None) | (None, Some(single)) => format_yen(single),
        (None, None) => String::new(),
    }
}

/// Cuts a string after `max` characters and marks the cut with an ellipsis
///
/// # Arguments
/// * `value` - Text to shorten
/// * `max` - Number of characters to keep
///
/// # Returns
/// * `String` - The text itself when it already fits
pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max).collect();
    cut.push('…');
    cut
}

/// `2023年10月26日`
pub fn format_jp_date(value: &NaiveDateTime) -> String {
    value.format("%Y年%-m月%-d日").to_string()
}

/// `2023年10月26日 14:03:05`
pub fn format_jp_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y年%m月%d日 %H:%M:%S").to_string()
}

/// Classifies available stock for display
pub fn stock_status(available: i64) -> &'static str {
    if available <= 0 {
        "out_of_stock"
    } else if available < LOW_STOCK_THRESHOLD {
        "low_stock"
    } else {
        "available"
    }
}

/// Number of pages needed for `total` rows
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Row offset of a 1-based page
///
/// Pages past the addressable range saturate, so the query simply returns no rows
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit.max(0))
}

/// Human readable coupon value
///
/// # Arguments
/// * `discount_type` - `percentage` or `fixed`
/// * `discount_value` - Percent or yen, depending on the type
/// * `max_discount_amount` - Cap of a percentage coupon
///
/// # Returns
/// * `String` - e.g. `10% OFF (最大2,000円引)` or `500円引き`
pub fn coupon_discount_text(
    discount_type: &str,
    discount_value: f64,
    max_discount_amount: Option<f64>,
) -> String {
    if discount_type == "percentage" {
        match max_discount_amount {
            Some(cap) => format!(
                "{}% OFF (最大{}引)",
                format_number(discount_value),
                format_yen(cap)
            ),
            None => format!("{}% OFF", format_number(discount_value)),
        }
    } else {
        format!("{}引き", format_yen(discount_value))
    }
}
