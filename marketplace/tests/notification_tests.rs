// marketplace/tests/notification_tests.rs

mod common;

use common::world;
use marketplace::errors::AppError;
use marketplace::models::Role;
use marketplace::services::notifications::{self, Broadcast};
use uuid::Uuid;

fn to_user(user_id: Uuid, title: &str) -> Broadcast {
  Broadcast {
    recipient_user_id: Some(user_id),
    recipient_role: None,
    title: title.to_string(),
    message: "hello".to_string(),
    link: None,
  }
}

#[tokio::test]
async fn newest_notification_comes_first() {
  let w = world().await;
  notifications::broadcast(w.store(), &w.admin, to_user(w.customer.user_id, "first")).await.unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  notifications::broadcast(w.store(), &w.admin, to_user(w.customer.user_id, "second")).await.unwrap();

  let list = notifications::list_for(w.store(), &w.customer).await.unwrap();
  let titles: Vec<&str> = list.iter().map(|n| n.title.as_str()).collect();
  assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn role_notifications_reach_everyone_with_the_role() {
  let w = world().await;
  let note = notifications::broadcast(
    w.store(),
    &w.admin,
    Broadcast {
      recipient_user_id: None,
      recipient_role: Some(Role::Seller),
      title: "Fee change".into(),
      message: "Fees drop next month.".into(),
      link: None,
    },
  )
  .await
  .unwrap();

  for seller in [&w.seller_a, &w.seller_b] {
    let list = notifications::list_for(w.store(), seller).await.unwrap();
    assert!(list.iter().any(|n| n.id == note.id));
  }
  let list = notifications::list_for(w.store(), &w.customer).await.unwrap();
  assert!(list.iter().all(|n| n.id != note.id));
}

#[tokio::test]
async fn only_recipients_can_mark_read() {
  let w = world().await;
  let note = notifications::broadcast(w.store(), &w.admin, to_user(w.customer.user_id, "ping")).await.unwrap();
  assert!(!note.is_read);

  let err = notifications::mark_read(w.store(), &w.seller_a, note.id).await.unwrap_err();
  assert!(matches!(err, AppError::Permission(_)), "got {:?}", err);

  let read = notifications::mark_read(w.store(), &w.customer, note.id).await.unwrap();
  assert!(read.is_read);
  let again = notifications::mark_read(w.store(), &w.customer, note.id).await.unwrap();
  assert!(again.is_read);

  let err = notifications::mark_read(w.store(), &w.customer, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn broadcast_is_admin_only_and_needs_one_recipient() {
  let w = world().await;
  let err = notifications::broadcast(w.store(), &w.seller_a, to_user(w.customer.user_id, "x")).await.unwrap_err();
  assert!(matches!(err, AppError::Permission(_)));

  let mut neither = to_user(w.customer.user_id, "x");
  neither.recipient_user_id = None;
  let err = notifications::broadcast(w.store(), &w.admin, neither).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let mut both = to_user(w.customer.user_id, "x");
  both.recipient_role = Some(Role::Customer);
  let err = notifications::broadcast(w.store(), &w.admin, both).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let err = notifications::broadcast(w.store(), &w.admin, to_user(Uuid::new_v4(), "x")).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}
