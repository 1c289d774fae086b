//! # Contact Module
//!
//! This module handles contact-page content:
//! - Contact settings (one active record shown on the frontend)
//! - Contact-form messages with a new/read/archived lifecycle

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::{contact_settings_routes, messages_routes};
