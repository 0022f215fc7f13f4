use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoriesPayload {
    #[validate(length(min = 1, message = "At least one category name is required"))]
    pub names: Vec<String>,
}
