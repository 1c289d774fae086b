//! # Products Module
//!
//! This module handles the product catalog:
//! - Public listing with search, category/brand filters and pagination
//! - Permission-gated create/update/delete

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::products_routes;
