use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::issues::models::{
    Collaborator, Feedback, Issue, IssueStatus, IssueView, MediaItem, Resolution,
};
use crate::features::notifications::dtos::FanOutReport;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_SATISFACTION, MIN_SATISFACTION};
use crate::shared::types::PaginationQuery;
use crate::shared::volunteer_roster::{NewVolunteerPosition, VolunteerPosition};

/// Response DTO for issue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueResponseDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub location: String,
    pub reported_by: String,
    pub status: IssueStatus,
    pub assigned_to: Option<String>,
    /// Display name of the assigned NGO, resolved when read
    pub assigned_ngo_name: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub upvotes: usize,
    pub downvotes: usize,
    pub upvoters: Vec<String>,
    pub downvoters: Vec<String>,
    pub is_flagged: bool,
    pub volunteer_positions: Vec<VolunteerPosition>,
    pub collaborators: Vec<Collaborator>,
    pub feedback_count: usize,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssueResponseDto {
    pub fn with_ngo_name(issue: Issue, assigned_ngo_name: Option<String>) -> Self {
        Self {
            id: issue.id,
            slug: issue.slug,
            title: issue.title,
            tags: issue.tags,
            content: issue.content,
            media: issue.media.0,
            location: issue.location,
            reported_by: issue.reported_by,
            status: issue.status,
            assigned_to: issue.assigned_to,
            assigned_ngo_name,
            deadline: issue.deadline,
            upvotes: issue.upvoters.len(),
            downvotes: issue.downvoters.len(),
            upvoters: issue.upvoters,
            downvoters: issue.downvoters,
            is_flagged: issue.is_flagged,
            volunteer_positions: issue.volunteer_positions.0,
            collaborators: issue.collaborators.0,
            feedback_count: issue.feedback.0.len(),
            completed_at: issue.completed_at,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

impl From<IssueView> for IssueResponseDto {
    fn from(view: IssueView) -> Self {
        Self::with_ngo_name(view.issue, view.assigned_ngo_name)
    }
}

/// Request DTO for reporting an issue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateIssueDto {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10, message = "Provide 1-10 tags"))]
    pub tags: Vec<String>,

    #[validate(length(min = 1, max = 20000, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 media items"))]
    pub media: Vec<MediaItem>,

    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
}

/// Query parameters for listing issues
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct IssueListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub status: Option<IssueStatus>,
    pub tag: Option<String>,
    /// Case-insensitive substring match
    pub location: Option<String>,
    pub flagged: Option<bool>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl IssueListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Request DTO for claiming an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AssignIssueDto {
    /// Target completion date
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignIssueResponseDto {
    pub issue: IssueResponseDto,
    /// Outcome of notifying the reporter and upvoters
    pub notifications: FanOutReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddPositionsDto {
    pub positions: Vec<NewVolunteerPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterVolunteerDto {
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawResponseDto {
    pub position: String,
    pub issue: IssueResponseDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownvoteResponseDto {
    /// Whether the caller now downvotes the issue
    pub downvoted: bool,
    pub issue: IssueResponseDto,
}

/// Request DTO for feedback on a completed issue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitFeedbackDto {
    pub resolved: Resolution,

    #[validate(range(
        min = MIN_SATISFACTION,
        max = MAX_SATISFACTION,
        message = "Satisfaction must be between 1 and 10"
    ))]
    pub satisfaction: i32,

    #[validate(length(max = 2000, message = "Suggestions must not exceed 2000 characters"))]
    pub suggestions: Option<String>,

    #[validate(length(max = 2000, message = "Issue problem must not exceed 2000 characters"))]
    pub issue_problem: Option<String>,
}

impl SubmitFeedbackDto {
    pub fn into_feedback(self, user_id: &str, now: DateTime<Utc>) -> Feedback {
        Feedback {
            user_id: user_id.to_string(),
            resolved: self.resolved,
            satisfaction: self.satisfaction,
            suggestions: self.suggestions.filter(|s| !s.trim().is_empty()),
            issue_problem: self.issue_problem.filter(|s| !s.trim().is_empty()),
            created_at: now,
        }
    }
}
