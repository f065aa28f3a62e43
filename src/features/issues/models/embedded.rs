//! Child records stored inline on an issue (JSONB columns)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Image or video already hosted elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Secondary NGO attached through an accepted collaboration request.
///
/// Both fields default to empty so rows written by older code still load;
/// entries missing either are dropped on the next write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Collaborator {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Collaborator {
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Yes,
    No,
}

/// One user's verdict on a completed issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Feedback {
    pub user_id: String,
    pub resolved: Resolution,
    /// 1..=10
    pub satisfaction: i32,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub issue_problem: Option<String>,
    pub created_at: DateTime<Utc>,
}
