// marketplace/src/web/routes.rs

use crate::web::handlers::{
  account_handlers, cart_handlers, checkout_handlers, notification_handlers, order_handlers, product_handlers,
  review_handlers, webhook_handlers,
};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/sellers", web::post().to(account_handlers::register_seller_handler))
      // Catalog
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}/approval", web::post().to(product_handlers::review_product_handler))
          .route("/{product_id}/reviews", web::get().to(review_handlers::list_reviews_handler))
          .route("/{product_id}/reviews", web::post().to(review_handlers::create_review_handler)),
      )
      .service(
        web::scope("/reviews")
          .route("/{review_id}", web::put().to(review_handlers::update_review_handler))
          .route("/{review_id}", web::delete().to(review_handlers::delete_review_handler)),
      )
      // Seller back office
      .service(
        web::scope("/seller")
          .route("/products", web::get().to(product_handlers::seller_products_handler))
          .route("/orders", web::get().to(order_handlers::seller_orders_handler)),
      )
      // Cart
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/items/{item_id}", web::patch().to(cart_handlers::set_quantity_handler))
          .route("/items/{item_id}", web::delete().to(cart_handlers::remove_item_handler))
          .route("/checkout", web::post().to(checkout_handlers::checkout_cart_handler)),
      )
      .route("/checkout", web::post().to(checkout_handlers::start_checkout_handler))
      // Orders
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::customer_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::order_detail_handler))
          .route("/{order_id}/status", web::patch().to(order_handlers::update_status_handler)),
      )
      // Notifications
      .service(
        web::scope("/notifications")
          .route("", web::get().to(notification_handlers::list_notifications_handler))
          .route("", web::post().to(notification_handlers::broadcast_handler))
          .route("/{notification_id}/read", web::post().to(notification_handlers::mark_read_handler)),
      )
      // Payment gateway callbacks, e.g. /webhooks/stripe
      .service(
        web::scope("/webhooks").route("/{source}", web::post().to(webhook_handlers::payment_webhook_handler)),
      ),
  );
}
