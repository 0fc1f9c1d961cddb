// marketplace/src/models/mod.rs

//! Data structures representing stored entities.

pub mod cart;
pub mod notification;
pub mod order;
pub mod order_item;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItem};
pub use notification::{Notification, Recipient};
pub use order::{Order, OrderStatus, ShippingMethod};
pub use order_item::OrderItem;
pub use product::{ApprovalStatus, Product};
pub use review::Review;
pub use user::{Actor, Role, Seller, User};
