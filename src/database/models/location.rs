use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference data: shifts point at a location, nothing here writes to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub post_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: impl Into<String>, address: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address,
            post_code: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_post_code(mut self, post_code: impl Into<String>) -> Self {
        self.post_code = Some(post_code.into());
        self
    }
}
