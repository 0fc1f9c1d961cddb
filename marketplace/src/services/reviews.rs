// marketplace/src/services/reviews.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Actor, Review};
use crate::store::{Store, StoreTx};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
  pub rating: i32,
  #[serde(default)]
  pub comment: String,
}

fn check_rating(rating: i32) -> AppResult<()> {
  if !(1..=5).contains(&rating) {
    return Err(AppError::Validation("Rating must be between 1 and 5.".to_string()));
  }
  Ok(())
}

/// Mean rating rounded to one decimal; 0.0 without reviews.
pub fn average_rating(ratings: &[i32]) -> f64 {
  if ratings.is_empty() {
    return 0.0;
  }
  let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
  let mean = sum as f64 / ratings.len() as f64;
  (mean * 10.0).round() / 10.0
}

async fn refresh_product_rating(tx: &mut dyn StoreTx, product_id: Uuid) -> AppResult<()> {
  let ratings: Vec<i32> = tx.reviews_for_product(product_id).await?.iter().map(|r| r.rating).collect();
  tx.update_product_rating(product_id, average_rating(&ratings), ratings.len() as i64)
    .await
}

#[instrument(name = "reviews::create", skip(store, input), fields(actor = %actor.user_id), err)]
pub async fn create(store: &dyn Store, actor: &Actor, product_id: Uuid, input: ReviewInput) -> AppResult<Review> {
  check_rating(input.rating)?;
  let mut tx = store.begin().await?;
  if tx.get_product(product_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  if tx.review_by(product_id, actor.user_id).await?.is_some() {
    return Err(AppError::Validation("You have already reviewed this product.".to_string()));
  }

  let now = Utc::now();
  let review = Review {
    id: Uuid::new_v4(),
    product_id,
    user_id: actor.user_id,
    rating: input.rating,
    comment: input.comment,
    created_at: now,
    updated_at: now,
  };
  tx.insert_review(&review).await?;
  refresh_product_rating(tx.as_mut(), product_id).await?;
  tx.commit().await?;
  info!(review_id = %review.id, "Review created.");
  Ok(review)
}

#[instrument(name = "reviews::update", skip(store, input), fields(actor = %actor.user_id), err)]
pub async fn update(store: &dyn Store, actor: &Actor, review_id: Uuid, input: ReviewInput) -> AppResult<Review> {
  check_rating(input.rating)?;
  let mut tx = store.begin().await?;
  let mut review = tx
    .get_review(review_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review with ID {} not found.", review_id)))?;
  if review.user_id != actor.user_id {
    return Err(AppError::Permission("Only the author can edit a review.".to_string()));
  }
  review.rating = input.rating;
  review.comment = input.comment;
  review.updated_at = Utc::now();
  tx.update_review(&review).await?;
  refresh_product_rating(tx.as_mut(), review.product_id).await?;
  tx.commit().await?;
  Ok(review)
}

#[instrument(name = "reviews::delete", skip(store), fields(actor = %actor.user_id), err)]
pub async fn delete(store: &dyn Store, actor: &Actor, review_id: Uuid) -> AppResult<()> {
  let mut tx = store.begin().await?;
  let review = tx
    .get_review(review_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review with ID {} not found.", review_id)))?;
  if review.user_id != actor.user_id && !actor.is_admin() {
    return Err(AppError::Permission("Only the author or an admin can delete a review.".to_string()));
  }
  tx.delete_review(review.id).await?;
  refresh_product_rating(tx.as_mut(), review.product_id).await?;
  tx.commit().await?;
  info!(%review_id, "Review deleted.");
  Ok(())
}

pub async fn list_for_product(store: &dyn Store, product_id: Uuid) -> AppResult<Vec<Review>> {
  let mut tx = store.begin().await?;
  if tx.get_product(product_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  tx.reviews_for_product(product_id).await
}
