use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body for `POST /api/tests` and `PUT /api/tests/{id}`. The backend treats
/// `content` as an opaque string; see `crate::content` for its encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SaveTestPayload {
    #[validate(length(min = 1, max = 255, message = "Test name must be 1-255 characters"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub category_ids: Vec<Uuid>,

    #[validate(nested)]
    pub settings: TestSettings,

    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TestSettings {
    #[validate(range(min = 0, max = 100, message = "Passing score must be between 0 and 100"))]
    pub passing_score: u32,

    #[validate(range(min = 1, message = "Time limit must be at least 1 minute"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResponse {
    pub id: Uuid,
    pub name: String,

    // Backends deployed before descriptions became optional send "".
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,

    #[serde(default)]
    pub category_ids: Vec<Uuid>,

    pub settings: TestSettings,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
