use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: Uuid,
    pub title: String,
    pub raw_text: String,
    /// Parsed `JobData` as JSON.
    pub parsed: Value,
    pub created_at: DateTime<Utc>,
}
