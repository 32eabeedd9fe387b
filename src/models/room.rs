use serde::{Deserialize, Serialize};

/// A meeting room as listed by `GET /rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RoomRecord {
    /// Rooms without an `is_active` flag are treated as active.
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}
