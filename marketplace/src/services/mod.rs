// marketplace/src/services/mod.rs

//! Domain operations. Functions taking `&mut dyn StoreTx` are building blocks
//! that run inside a caller's transaction; functions taking `&dyn Store` are
//! complete operations that open and commit their own.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod fulfillment;
pub mod notifications;
pub mod order_splitter;
pub mod orders;
pub mod payment;
pub mod reviews;
pub mod seed;
