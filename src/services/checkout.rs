use crate::db::models::Coupon;
use crate::errors::ApiError;
use crate::Result;
use chrono::NaiveDateTime;

/// Flat shipping fee waived from a subtotal threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    pub fee: f64,
    pub free_threshold: f64,
}

impl ShippingPolicy {
    pub fn fee_for(&self, subtotal: f64, cart_empty: bool) -> f64 {
        if cart_empty || subtotal >= self.free_threshold {
            0.0
        } else {
            self.fee
        }
    }
}

/// Amounts of a checkout, all in yen
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutTotals {
    pub subtotal: f64,
    pub coupon_discount: f64,
    pub used_points: i32,
    pub points_discount: f64,
    pub shipping_fee: f64,
    pub total: f64,
}

/// Checks that a coupon may be applied to a cart of the given subtotal
pub fn validate_coupon(coupon: &Coupon, subtotal: f64, now: NaiveDateTime) -> Result<()> {
    if !coupon.is_active {
        return Err(ApiError::CouponInactive);
    }
    if now < coupon.start_date || now > coupon.end_date {
        return Err(ApiError::CouponExpired);
    }
    if subtotal < coupon.min_purchase_amount {
        return Err(ApiError::CouponMinPurchaseNotMet(coupon.min_purchase_amount));
    }
    Ok(())
}

/// Discount granted by a coupon, never more than the subtotal
///
/// Percentage discounts are rounded down to whole yen before the cap applies.
pub fn coupon_discount(coupon: &Coupon, subtotal: f64) -> f64 {
    let discount = if coupon.discount_type == "percentage" {
        let raw = (subtotal * coupon.discount_value / 100.0).floor();
        match coupon.max_discount_amount {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    } else {
        coupon.discount_value
    };
    discount.clamp(0.0, subtotal.max(0.0))
}

/// Computes the amounts shown on the checkout page
///
/// # Arguments
/// * `subtotal` - Sum of the cart lines at their effective price
/// * `cart_empty` - Whether the cart holds no lines
/// * `coupon` - Coupon stored on the session, ignored when it no longer validates
/// * `requested_points` - Points stored on the session, one point is one yen
/// * `now` - Reference time for the coupon window
/// * `policy` - Shipping fee rules
///
/// # Returns
/// * `CheckoutTotals` - Discounts, shipping and the amount to pay
pub fn compute_totals(
    subtotal: f64,
    cart_empty: bool,
    coupon: Option<&Coupon>,
    requested_points: i32,
    now: NaiveDateTime,
    policy: ShippingPolicy,
) -> CheckoutTotals {
    let coupon_discount = coupon
        .filter(|c| validate_coupon(c, subtotal, now).is_ok())
        .map(|c| coupon_discount(c, subtotal))
        .unwrap_or(0.0);

    let remaining = (subtotal - coupon_discount).max(0.0);
    // Points are whole yen, a fractional remainder is only partly covered
    let points_discount = f64::from(requested_points.max(0)).min(remaining.floor());
    let shipping_fee = policy.fee_for(subtotal, cart_empty);
    let total = (subtotal - coupon_discount - points_discount).max(0.0) + shipping_fee;

    CheckoutTotals {
        subtotal,
        coupon_discount,
        used_points: points_discount as i32,
        points_discount,
        shipping_fee,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const POLICY: ShippingPolicy = ShippingPolicy {
        fee: 550.0,
        free_threshold: 5000.0,
    };

    fn at(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn coupon(discount_type: &str, value: f64, cap: Option<f64>, min: f64) -> Coupon {
        Coupon {
            id: 1,
            coupon_code: "WELCOME".to_string(),
            name: "ようこそクーポン".to_string(),
            description: None,
            discount_type: discount_type.to_string(),
            discount_value: value,
            max_discount_amount: cap,
            min_purchase_amount: min,
            is_active: true,
            start_date: at(1, 1),
            end_date: at(12, 31),
        }
    }

    #[test]
    fn test_validate_coupon() {
        let now = at(6, 1);
        let valid = coupon("fixed", 500.0, None, 3000.0);
        assert!(validate_coupon(&valid, 3000.0, now).is_ok());

        assert!(matches!(
            validate_coupon(&valid, 2999.0, now),
            Err(ApiError::CouponMinPurchaseNotMet(min)) if min == 3000.0
        ));

        let mut inactive = valid.clone();
        inactive.is_active = false;
        assert!(matches!(
            validate_coupon(&inactive, 5000.0, now),
            Err(ApiError::CouponInactive)
        ));

        let mut expired = valid.clone();
        expired.end_date = at(5, 31);
        assert!(matches!(
            validate_coupon(&expired, 5000.0, now),
            Err(ApiError::CouponExpired)
        ));
    }

    #[test]
    fn test_percentage_discount_is_capped() {
        let capped = coupon("percentage", 10.0, Some(2000.0), 0.0);
        assert_eq!(coupon_discount(&capped, 12000.0), 1200.0);
        assert_eq!(coupon_discount(&capped, 50000.0), 2000.0);

        let uncapped = coupon("percentage", 15.0, None, 0.0);
        assert_eq!(coupon_discount(&uncapped, 999.0), 149.0);
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let fixed = coupon("fixed", 500.0, None, 0.0);
        assert_eq!(coupon_discount(&fixed, 3000.0), 500.0);
        assert_eq!(coupon_discount(&fixed, 300.0), 300.0);
    }

    #[test]
    fn test_totals_with_coupon_and_points() {
        let fixed = coupon("fixed", 500.0, None, 0.0);
        let totals = compute_totals(4000.0, false, Some(&fixed), 300, at(6, 1), POLICY);

        assert_eq!(totals.coupon_discount, 500.0);
        assert_eq!(totals.points_discount, 300.0);
        assert_eq!(totals.used_points, 300);
        assert_eq!(totals.shipping_fee, 550.0);
        assert_eq!(totals.total, 4000.0 - 500.0 - 300.0 + 550.0);
    }

    #[test]
    fn test_points_limited_to_remaining_amount() {
        let fixed = coupon("fixed", 1000.0, None, 0.0);
        let totals = compute_totals(6000.0, false, Some(&fixed), 9000, at(6, 1), POLICY);

        assert_eq!(totals.points_discount, 5000.0);
        assert_eq!(totals.used_points, 5000);
        assert_eq!(totals.shipping_fee, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn test_points_cover_whole_yen_of_fractional_subtotal() {
        let totals = compute_totals(1234.5, false, None, 2000, at(6, 1), POLICY);

        assert_eq!(totals.used_points, 1234);
        assert_eq!(totals.points_discount, 1234.0);
        assert_eq!(totals.total, 0.5 + 550.0);
    }

    #[test]
    fn test_invalid_coupon_contributes_nothing() {
        let strict = coupon("fixed", 500.0, None, 10000.0);
        let totals = compute_totals(4000.0, false, Some(&strict), 0, at(6, 1), POLICY);
        assert_eq!(totals.coupon_discount, 0.0);
        assert_eq!(totals.total, 4550.0);
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let totals = compute_totals(0.0, true, None, 0, at(6, 1), POLICY);
        assert_eq!(totals.shipping_fee, 0.0);
        assert_eq!(totals.total, 0.0);
    }
}
