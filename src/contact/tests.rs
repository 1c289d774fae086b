//! Tests for the contact module

#[cfg(test)]
mod tests {
    use super::super::models::*;

    #[test]
    fn test_message_statuses_closed_set() {
        assert!(MESSAGE_STATUSES.contains(&"new"));
        assert!(MESSAGE_STATUSES.contains(&"read"));
        assert!(MESSAGE_STATUSES.contains(&"archived"));
        assert!(!MESSAGE_STATUSES.contains(&"deleted"));
    }

    #[test]
    fn test_contact_setting_serializes_without_nulls_lost() {
        let setting = ContactSetting {
            id: "T_000001".to_string(),
            headline: "Get in touch".to_string(),
            subheading: None,
            address: Some("12 Bazaar Road".to_string()),
            phone: Some("+91 98765 43210".to_string()),
            email: Some("hello@example.com".to_string()),
            hours: None,
            map_embed: None,
            is_active: 1,
            created_at: None,
            updated_at: None,
        };

        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value["headline"], "Get in touch");
        assert_eq!(value["address"], "12 Bazaar Road");
        assert!(value["subheading"].is_null());
    }

    #[test]
    fn test_create_message_request_decodes_minimal_payload() {
        let payload: CreateMessageRequest =
            serde_json::from_str(r#"{"name":"Asha","body":"Where is my order?"}"#).unwrap();
        assert_eq!(payload.name, "Asha");
        assert_eq!(payload.body, "Where is my order?");
        assert!(payload.email.is_none());
        assert!(payload.subject.is_none());
    }
}
