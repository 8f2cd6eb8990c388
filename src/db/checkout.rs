use crate::db::cart::cart_subtotal;
use crate::db::models::{
    AppliedCouponInfo, AvailableCouponInfo, CheckoutInfoResponse, CheckoutSession, Coupon,
    CurrentCheckoutState, NewCheckoutSession, PaymentMethod, PaymentMethodInfo, UserPointInfo,
};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::checkout::{compute_totals, validate_coupon, ShippingPolicy};
use crate::services::misc::{coupon_discount_text, format_yen};
use crate::{Result, CONFIG};
use chrono::{NaiveDateTime, Utc};
use diesel::sql_types::{Int8, Text, Timestamp};
use diesel::{sql_query, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{error, info};

const COUPON_COLUMNS: &str = "id, coupon_code, name, description, discount_type,
    CAST(discount_value AS DOUBLE PRECISION) AS discount_value,
    CAST(max_discount_amount AS DOUBLE PRECISION) AS max_discount_amount,
    CAST(min_purchase_amount AS DOUBLE PRECISION) AS min_purchase_amount,
    is_active, start_date, end_date";

fn shipping_policy() -> ShippingPolicy {
    ShippingPolicy {
        fee: CONFIG.shipping_fee,
        free_threshold: CONFIG.free_shipping_threshold,
    }
}

async fn find_coupon_by_code(conn: &mut AsyncPgConnection, code: &str) -> Result<Option<Coupon>> {
    sql_query(format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE coupon_code = $1"
    ))
    .bind::<Text, _>(code)
    .get_result::<Coupon>(conn)
    .await
    .optional()
    .map_err(Into::into)
}

async fn find_coupon_by_id(conn: &mut AsyncPgConnection, coupon: i64) -> Result<Option<Coupon>> {
    sql_query(format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"))
        .bind::<Int8, _>(coupon)
        .get_result::<Coupon>(conn)
        .await
        .optional()
        .map_err(Into::into)
}

async fn user_available_points(conn: &mut AsyncPgConnection, user: i64) -> Result<i32> {
    use crate::schema::user_points::dsl::*;

    let points = user_points
        .filter(user_id.eq(user))
        .select(available_points)
        .first::<i32>(conn)
        .await
        .optional()?;
    Ok(points.unwrap_or(0))
}

async fn checkout_state(
    conn: &mut AsyncPgConnection,
    user: i64,
    points: i32,
    now: NaiveDateTime,
) -> Result<CurrentCheckoutState> {
    let session = {
        use crate::schema::checkout_sessions::dsl::*;
        checkout_sessions
            .filter(user_id.eq(user))
            .select(CheckoutSession::as_select())
            .first(conn)
            .await
            .optional()?
    };

    let coupon = match session.as_ref().and_then(|s| s.applied_coupon_id) {
        Some(coupon_id) => find_coupon_by_id(conn, coupon_id).await?,
        None => None,
    };
    // Points spent elsewhere since they were reserved no longer count
    let requested_points = session.map_or(0, |s| s.used_points).min(points);

    let (subtotal, cart_empty) = cart_subtotal(conn, user, now).await?;
    let totals = compute_totals(
        subtotal,
        cart_empty,
        coupon.as_ref(),
        requested_points,
        now,
        shipping_policy(),
    );

    let applied_coupon_info = coupon.map(|c| AppliedCouponInfo {
        coupon_id: c.id,
        coupon_code: c.coupon_code,
        name: c.name,
        discount_amount: totals.coupon_discount,
        formatted_discount_amount: format_yen(totals.coupon_discount),
    });

    Ok(CurrentCheckoutState {
        cart_subtotal_formatted: format_yen(totals.subtotal),
        applied_coupon_info,
        coupon_discount_amount_formatted: format_yen(totals.coupon_discount),
        used_points: totals.used_points,
        points_discount_amount_formatted: format_yen(totals.points_discount),
        shipping_fee_formatted: format_yen(totals.shipping_fee),
        total_amount_formatted: format_yen(totals.total),
    })
}

/// DbClient helper functions for payment methods, coupons, points and checkout sessions
impl DbClient {
    pub async fn get_payment_methods(&self) -> Result<Vec<PaymentMethodInfo>> {
        use crate::schema::payment_methods::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let methods = payment_methods
            .filter(is_active.eq(true))
            .order((sort_order.asc(), id.asc()))
            .select(PaymentMethod::as_select())
            .load(conn)
            .await?;

        Ok(methods.into_iter().map(Into::into).collect())
    }

    /// Coupons, points and the amounts of the user's current checkout
    pub async fn get_checkout_info(&self, user: i64) -> Result<CheckoutInfoResponse> {
        let conn = &mut self.get_db_conn().await?;
        let now = Utc::now().naive_utc();

        let available_coupons = sql_query(format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE is_active AND start_date <= $1 AND end_date >= $1
             ORDER BY end_date, id"
        ))
        .bind::<Timestamp, _>(now)
        .load::<Coupon>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch available coupons: {}", e);
            ApiError::from(e)
        })?
        .into_iter()
        .map(|coupon| AvailableCouponInfo {
            discount_text: coupon_discount_text(
                &coupon.discount_type,
                coupon.discount_value,
                coupon.max_discount_amount,
            ),
            coupon_id: coupon.id,
            coupon_code: coupon.coupon_code,
            name: coupon.name,
            description: coupon.description,
        })
        .collect();

        let points = user_available_points(conn, user).await?;
        let current_checkout_state = checkout_state(conn, user, points, now).await?;

        Ok(CheckoutInfoResponse {
            available_coupons,
            user_points: UserPointInfo {
                available_points: points,
            },
            current_checkout_state,
        })
    }

    /// Applies a coupon to the user's checkout after checking it against the cart
    pub async fn select_coupon(&self, user: i64, code: &str) -> Result<CheckoutInfoResponse> {
        use crate::schema::checkout_sessions::dsl::*;

        {
            let conn = &mut self.get_db_conn().await?;
            let now = Utc::now().naive_utc();

            let (subtotal, cart_empty) = cart_subtotal(conn, user, now).await?;
            if cart_empty {
                return Err(ApiError::CartEmpty);
            }

            let coupon = find_coupon_by_code(conn, code)
                .await?
                .ok_or(ApiError::CouponNotFound)?;
            validate_coupon(&coupon, subtotal, now)?;

            diesel::insert_into(checkout_sessions)
                .values(NewCheckoutSession {
                    user_id: user,
                    applied_coupon_id: Some(coupon.id),
                    used_points: 0,
                    updated_at: now,
                })
                .on_conflict(user_id)
                .do_update()
                .set((applied_coupon_id.eq(Some(coupon.id)), updated_at.eq(now)))
                .execute(conn)
                .await?;
            info!("User {} applied coupon {}", user, code);
        }

        self.get_checkout_info(user).await
    }

    pub async fn clear_coupon(&self, user: i64) -> Result<CheckoutInfoResponse> {
        use crate::schema::checkout_sessions::dsl::*;

        {
            let conn = &mut self.get_db_conn().await?;
            diesel::update(checkout_sessions.filter(user_id.eq(user)))
                .set((
                    applied_coupon_id.eq(None::<i64>),
                    updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .await?;
            info!("User {} cleared the applied coupon", user);
        }

        self.get_checkout_info(user).await
    }

    /// Reserves points for the checkout, zero releases them
    pub async fn use_points(&self, user: i64, points: i64) -> Result<CheckoutInfoResponse> {
        use crate::schema::checkout_sessions::dsl::*;

        // Balances are i32, anything wider can never be covered
        let points = i32::try_from(points).map_err(|_| ApiError::InsufficientPoints)?;
        {
            let conn = &mut self.get_db_conn().await?;
            if points > user_available_points(conn, user).await? {
                return Err(ApiError::InsufficientPoints);
            }

            let now = Utc::now().naive_utc();
            diesel::insert_into(checkout_sessions)
                .values(NewCheckoutSession {
                    user_id: user,
                    applied_coupon_id: None,
                    used_points: points,
                    updated_at: now,
                })
                .on_conflict(user_id)
                .do_update()
                .set((used_points.eq(points), updated_at.eq(now)))
                .execute(conn)
                .await?;
            info!("User {} reserved {} points", user, points);
        }

        self.get_checkout_info(user).await
    }
}
