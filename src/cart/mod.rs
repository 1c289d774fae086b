//! # Cart Module
//!
//! This module handles the shopping cart:
//! - Per-user line items with per-product quantity aggregation
//! - The login-time merge of client-held carts
//! - Revision-checked writes against concurrent mutation

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use routes::cart_routes;
