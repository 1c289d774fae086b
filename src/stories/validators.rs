use super::models::CreateStoryRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateStoryRequest> for CreateStoryRequest {
    fn validate(&self, data: &CreateStoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let title = data.title.trim();
        if title.is_empty() {
            result.add_error("title", "Title is required");
        } else if title.len() < 2 || title.len() > 180 {
            result.add_error("title", "Title must be between 2 and 180 characters");
        }

        let content = data.content.trim();
        if content.is_empty() {
            result.add_error("content", "Content is required");
        } else if content.len() < 10 {
            result.add_error("content", "Content must be at least 10 characters");
        }

        result
    }
}
