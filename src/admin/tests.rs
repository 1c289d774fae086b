//! Tests for the admin module

#[cfg(test)]
mod tests {
    use super::super::models::*;

    #[test]
    fn test_permission_entries_decode() {
        let profile = AdminProfile {
            id: "A_000001".to_string(),
            user_id: "U_000001".to_string(),
            is_active: 1,
            permissions: r#"[{"module":"PRODUCTS","rights":["VIEW","CREATE"]}]"#.to_string(),
            created_at: None,
            updated_at: None,
        };

        let entries = profile.permission_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module, "PRODUCTS");
        assert_eq!(entries[0].rights, vec!["VIEW", "CREATE"]);
    }

    #[test]
    fn test_malformed_permissions_read_as_empty() {
        let profile = AdminProfile {
            id: "A_000002".to_string(),
            user_id: "U_000002".to_string(),
            is_active: 1,
            permissions: "not json".to_string(),
            created_at: None,
            updated_at: None,
        };

        assert!(profile.permission_entries().is_empty());
    }

    #[test]
    fn test_normalize_permissions_uppercases() {
        let entries = vec![PermissionEntry {
            module: " products ".to_string(),
            rights: vec!["create".to_string(), " Update".to_string()],
        }];

        let normalized = normalize_permissions(&entries);
        assert_eq!(normalized[0].module, "PRODUCTS");
        assert_eq!(normalized[0].rights, vec!["CREATE", "UPDATE"]);
    }

    #[test]
    fn test_permission_entry_round_trip() {
        let entry = PermissionEntry {
            module: "CMS".to_string(),
            rights: vec!["READ".to_string(), "UPDATE".to_string()],
        };
        let json = serde_json::to_string(&vec![entry.clone()]).unwrap();
        let decoded: Vec<PermissionEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, vec![entry]);
    }
}
