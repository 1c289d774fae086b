//! Tests for the stories module

#[cfg(test)]
mod tests {
    use super::super::models::CreateStoryRequest;
    use crate::common::Validator;

    fn request(title: &str, content: &str) -> CreateStoryRequest {
        CreateStoryRequest {
            title: title.to_string(),
            content: content.to_string(),
            date: None,
            image: None,
        }
    }

    #[test]
    fn test_valid_story_passes() {
        let req = request("Weaving the old way", "A long enough story body.");
        assert!(req.validate(&req).is_valid);
    }

    #[test]
    fn test_title_length_bounds() {
        let req = request("x", "A long enough story body.");
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "title"));

        let req = request(&"t".repeat(181), "A long enough story body.");
        assert!(!req.validate(&req).is_valid);
    }

    #[test]
    fn test_content_minimum_length() {
        let req = request("A fine title", "too short");
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "content"));
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let req = request("  ", "");
        let result = req.validate(&req);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
    }
}
