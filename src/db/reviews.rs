use crate::db::models::{
    AnswerInfo, PaginationInfo, QaInfo, QaListResponse, QaRow, QuestionInfo, ReviewInfo,
    ReviewListResponse, ReviewRow, ReviewSummary,
};
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::services::misc::{format_jp_date, page_offset, total_pages};
use crate::validation::{QaSort, ReviewSort};
use crate::Result;
use diesel::sql_types::{BigInt, Int4, Nullable, Text};
use diesel::{sql_query, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;
use tracing::{error, info};

const APPROVED: &str = "approved";

fn review_order(sort: ReviewSort) -> &'static str {
    match sort {
        ReviewSort::Newest => "r.created_at DESC, r.id DESC",
        ReviewSort::Oldest => "r.created_at ASC, r.id ASC",
        ReviewSort::HighestRating => "r.rating DESC, r.created_at DESC, r.id DESC",
        ReviewSort::LowestRating => "r.rating ASC, r.created_at DESC, r.id DESC",
        ReviewSort::MostHelpful => "helpful_count DESC, r.created_at DESC, r.id DESC",
    }
}

fn qa_order(sort: QaSort) -> &'static str {
    match sort {
        QaSort::Newest => "q.created_at DESC, q.id DESC, a.id ASC",
        QaSort::Oldest => "q.created_at ASC, q.id ASC, a.id ASC",
        QaSort::MostHelpful => "helpful_count DESC, q.created_at DESC, a.id ASC",
    }
}

/// Id of the live product carrying a product code
async fn product_id_by_code(conn: &mut AsyncPgConnection, code: &str) -> Result<String> {
    use crate::schema::products::dsl::*;

    products
        .filter(product_code.eq(code))
        .filter(deleted_at.is_null())
        .select(id)
        .first::<String>(conn)
        .await
        .optional()?
        .ok_or(ApiError::ProductNotFound)
}

/// DbClient helper functions for the review and Q&A lists
impl DbClient {
    pub async fn get_user_reviews(
        &self,
        code: &str,
        page: i64,
        limit: i64,
        rating_filter: Option<i32>,
        sort: ReviewSort,
    ) -> Result<ReviewListResponse> {
        let conn = &mut self.get_db_conn().await?;
        let product = product_id_by_code(conn, code).await?;

        info!("Fetching reviews of {} (page {}, limit {})", code, page, limit);

        let total_count = {
            use crate::schema::product_reviews::dsl::*;

            let mut count_query = product_reviews
                .filter(product_id.eq(&product))
                .filter(status.eq(APPROVED))
                .into_boxed();
            if let Some(stars) = rating_filter {
                count_query = count_query.filter(rating.eq(stars));
            }
            count_query.count().get_result::<i64>(conn).await?
        };

        let rows = sql_query(format!(
            "SELECT r.id, r.nickname, r.rating, r.title, r.comment, r.created_at,
                    (SELECT COUNT(*) FROM user_review_helpful_votes v
                      WHERE v.review_id = r.id) AS helpful_count
             FROM product_reviews r
             WHERE r.product_id = $1 AND r.status = '{APPROVED}'
               AND ($2::INT4 IS NULL OR r.rating = $2)
             ORDER BY {}
             LIMIT $3 OFFSET $4",
            review_order(sort)
        ))
        .bind::<Text, _>(&product)
        .bind::<Nullable<Int4>, _>(rating_filter)
        .bind::<BigInt, _>(limit)
        .bind::<BigInt, _>(page_offset(page, limit))
        .load::<ReviewRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch reviews: {}", e);
            ApiError::from(e)
        })?;

        let mut images = self
            .review_image_urls(conn, rows.iter().map(|r| r.id).collect())
            .await?;

        let summary = {
            use crate::schema::review_summaries::dsl::*;

            review_summaries
                .filter(product_id.eq(&product))
                .select(ReviewSummary::as_select())
                .first(conn)
                .await
                .optional()?
        };

        let reviews = rows
            .into_iter()
            .map(|row| ReviewInfo {
                image_urls: images.remove(&row.id).unwrap_or_default(),
                created_at_formatted: format_jp_date(&row.created_at),
                id: row.id,
                nickname: row.nickname,
                rating: row.rating,
                title: row.title,
                comment: row.comment,
                helpful_count: row.helpful_count,
            })
            .collect();

        Ok(ReviewListResponse {
            summary: summary.map(Into::into),
            reviews,
            pagination: PaginationInfo {
                current_page: page,
                limit,
                total_count,
                total_pages: total_pages(total_count, limit),
            },
        })
    }

    async fn review_image_urls(
        &self,
        conn: &mut AsyncPgConnection,
        review_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<String>>> {
        use crate::schema::review_images::dsl::*;

        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = review_images
            .filter(review_id.eq_any(review_ids))
            .order(id.asc())
            .select((review_id, image_url))
            .load::<(i64, String)>(conn)
            .await?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for (review, url) in rows {
            grouped.entry(review).or_default().push(url);
        }
        Ok(grouped)
    }

    /// Approved questions paired with their approved answers
    pub async fn get_user_qandas(
        &self,
        code: &str,
        page: i64,
        limit: i64,
        sort: QaSort,
    ) -> Result<QaListResponse> {
        use crate::schema::{product_questions, question_answers};

        let conn = &mut self.get_db_conn().await?;
        let product = product_id_by_code(conn, code).await?;

        info!("Fetching Q&A of {} (page {}, limit {})", code, page, limit);

        let total_count = product_questions::table
            .inner_join(question_answers::table)
            .filter(product_questions::product_id.eq(&product))
            .filter(product_questions::status.eq(APPROVED))
            .filter(question_answers::status.eq(APPROVED))
            .count()
            .get_result::<i64>(conn)
            .await?;

        let rows = sql_query(format!(
            "SELECT q.id AS question_id, q.question_text, q.created_at AS question_created_at,
                    a.id AS answer_id, a.answerer_name, a.answer_text,
                    a.created_at AS answer_created_at,
                    (SELECT COUNT(*) FROM user_answer_helpful_votes v
                      WHERE v.answer_id = a.id) AS helpful_count
             FROM product_questions q
             JOIN question_answers a ON a.question_id = q.id AND a.status = '{APPROVED}'
             WHERE q.product_id = $1 AND q.status = '{APPROVED}'
             ORDER BY {}
             LIMIT $2 OFFSET $3",
            qa_order(sort)
        ))
        .bind::<Text, _>(&product)
        .bind::<BigInt, _>(limit)
        .bind::<BigInt, _>(page_offset(page, limit))
        .load::<QaRow>(conn)
        .await
        .map_err(|e| {
            error!("Failed to fetch Q&A: {}", e);
            ApiError::from(e)
        })?;

        let qa_list = rows
            .into_iter()
            .map(|row| QaInfo {
                question: QuestionInfo {
                    id: row.question_id,
                    question_text: row.question_text,
                    created_at_formatted: format_jp_date(&row.question_created_at),
                },
                answer: AnswerInfo {
                    id: row.answer_id,
                    answerer_name: row.answerer_name,
                    answer_text: row.answer_text,
                    helpful_count: row.helpful_count,
                    created_at_formatted: format_jp_date(&row.answer_created_at),
                },
            })
            .collect();

        Ok(QaListResponse {
            qa_list,
            pagination: PaginationInfo {
                current_page: page,
                limit,
                total_count,
                total_pages: total_pages(total_count, limit),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{seed_product, test_client};

    #[test]
    fn test_rating_sorts_break_ties_by_newest() {
        assert!(review_order(ReviewSort::HighestRating).ends_with("r.created_at DESC, r.id DESC"));
        assert!(review_order(ReviewSort::LowestRating).starts_with("r.rating ASC"));
        assert!(review_order(ReviewSort::MostHelpful).starts_with("helpful_count DESC"));
    }

    #[test]
    fn test_qa_orders() {
        assert!(qa_order(QaSort::Oldest).starts_with("q.created_at ASC"));
        assert!(qa_order(QaSort::MostHelpful).starts_with("helpful_count DESC"));
    }

    async fn seed_review(conn: &mut AsyncPgConnection, product: &str, stars: i32, state: &str) {
        use crate::schema::product_reviews::dsl::*;

        diesel::insert_into(product_reviews)
            .values((
                product_id.eq(product),
                nickname.eq("テスター"),
                rating.eq(stars),
                comment.eq("サイズ感がちょうど良いです"),
                status.eq(state),
            ))
            .execute(conn)
            .await
            .unwrap();
    }

    async fn seed_question(conn: &mut AsyncPgConnection, product: &str, state: &str) -> i64 {
        use crate::schema::product_questions::dsl::*;

        diesel::insert_into(product_questions)
            .values((
                product_id.eq(product),
                question_text.eq("洗濯機で洗えますか？"),
                status.eq(state),
            ))
            .returning(id)
            .get_result(conn)
            .await
            .unwrap()
    }

    async fn seed_answer(conn: &mut AsyncPgConnection, question: i64, state: &str) {
        use crate::schema::question_answers::dsl::*;

        diesel::insert_into(question_answers)
            .values((
                question_id.eq(question),
                answerer_name.eq("スタッフ"),
                answer_text.eq("ネットに入れて洗えます"),
                status.eq(state),
            ))
            .execute(conn)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rating_filter_applies_to_total_count() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;
        for (stars, state) in [(5, APPROVED), (5, APPROVED), (4, APPROVED), (5, "pending")] {
            seed_review(conn, &product.product_id, stars, state).await;
        }

        let five_stars = client
            .get_user_reviews(&product.product_code, 1, 1, Some(5), ReviewSort::Newest)
            .await
            .unwrap();
        assert_eq!(five_stars.reviews.len(), 1);
        assert_eq!(five_stars.pagination.total_count, 2);
        assert_eq!(five_stars.pagination.total_pages, 2);

        let all = client
            .get_user_reviews(&product.product_code, 1, 10, None, ReviewSort::LowestRating)
            .await
            .unwrap();
        assert_eq!(all.pagination.total_count, 3);
        assert_eq!(all.reviews[0].rating, 4);

        let past_end = client
            .get_user_reviews(&product.product_code, i64::MAX, 10, None, ReviewSort::Newest)
            .await
            .unwrap();
        assert!(past_end.reviews.is_empty());
        assert_eq!(past_end.pagination.total_count, 3);
    }

    #[tokio::test]
    async fn test_qa_counts_approved_question_answer_pairs() {
        let Some(client) = test_client() else {
            return;
        };
        let conn = &mut client.get_db_conn().await.unwrap();
        let product = seed_product(conn).await;

        let answered = seed_question(conn, &product.product_id, APPROVED).await;
        seed_answer(conn, answered, APPROVED).await;
        seed_answer(conn, answered, APPROVED).await;
        seed_answer(conn, answered, "pending").await;

        seed_question(conn, &product.product_id, APPROVED).await;

        let hidden = seed_question(conn, &product.product_id, "pending").await;
        seed_answer(conn, hidden, APPROVED).await;

        let qa = client
            .get_user_qandas(&product.product_code, 1, 10, QaSort::Oldest)
            .await
            .unwrap();
        assert_eq!(qa.pagination.total_count, 2);
        assert_eq!(qa.qa_list.len(), 2);
        assert!(qa.qa_list.iter().all(|pair| pair.question.id == answered));
        assert!(qa.qa_list[0].answer.id < qa.qa_list[1].answer.id);
    }

    #[tokio::test]
    async fn test_unknown_product_code() {
        let Some(client) = test_client() else {
            return;
        };
        assert!(matches!(
            client
                .get_user_reviews("NO-SUCH-CODE", 1, 10, None, ReviewSort::Newest)
                .await,
            Err(ApiError::ProductNotFound)
        ));
    }
}
