// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., P_K7NP3X for products)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Product (P_)
    Product,
    /// Shopping cart (C_)
    Cart,
    /// Order (O_)
    Order,
    /// Story (S_)
    Story,
    /// Contact settings record (T_) - T for contacT
    ContactSetting,
    /// Contact-form message (M_)
    Message,
    /// Admin profile (A_)
    AdminProfile,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Product => "P",
            EntityPrefix::Cart => "C",
            EntityPrefix::Order => "O",
            EntityPrefix::Story => "S",
            EntityPrefix::ContactSetting => "T",
            EntityPrefix::Message => "M",
            EntityPrefix::AdminProfile => "A",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID for the given entity type
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_product_id() -> String {
    generate_id(EntityPrefix::Product)
}

pub fn generate_cart_id() -> String {
    generate_id(EntityPrefix::Cart)
}

pub fn generate_order_id() -> String {
    generate_id(EntityPrefix::Order)
}

pub fn generate_story_id() -> String {
    generate_id(EntityPrefix::Story)
}

pub fn generate_contact_setting_id() -> String {
    generate_id(EntityPrefix::ContactSetting)
}

pub fn generate_message_id() -> String {
    generate_id(EntityPrefix::Message)
}

pub fn generate_admin_profile_id() -> String {
    generate_id(EntityPrefix::AdminProfile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_has_prefix_and_length() {
        let id = generate_product_id();
        assert!(id.starts_with("P_"));
        assert_eq!(id.len(), 8);
    }

    #[test]
    fn test_id_uses_crockford_alphabet() {
        let id = generate_user_id();
        let body = id.strip_prefix("U_").unwrap();
        for c in body.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "unexpected character {} in {}",
                c,
                id
            );
        }
    }

    #[test]
    fn test_ids_are_unique_enough() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert_ne!(a, b);
    }
}
