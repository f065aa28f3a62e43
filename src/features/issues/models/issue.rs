use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Collaborator, Feedback, MediaItem};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{FLAG_DOWNVOTE_THRESHOLD, MAX_SATISFACTION, MIN_SATISFACTION};
use crate::shared::volunteer_roster::{self, NewVolunteerPosition, VolunteerPosition};

/// Issue status enum matching database enum
///
/// ```text
/// Open --assign--> Assigned --complete--> Completed
/// Assigned --disclaim--> Open
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Assigned,
    Completed,
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueStatus::Open => write!(f, "open"),
            IssueStatus::Assigned => write!(f, "assigned"),
            IssueStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Database model for issue.
///
/// All state changes go through the methods below; the service loads the
/// row `FOR UPDATE`, applies one method and writes the row back.
#[derive(Debug, Clone, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub media: Json<Vec<MediaItem>>,
    pub location: String,
    pub reported_by: String,
    pub status: IssueStatus,
    /// User id of the responsible NGO
    pub assigned_to: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub upvoters: Vec<String>,
    pub downvoters: Vec<String>,
    pub is_flagged: bool,
    pub volunteer_positions: Json<Vec<VolunteerPosition>>,
    pub collaborators: Json<Vec<Collaborator>>,
    pub feedback: Json<Vec<Feedback>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issue row joined with the assigned NGO's display name
#[derive(Debug, Clone, FromRow)]
pub struct IssueView {
    #[sqlx(flatten)]
    pub issue: Issue,
    pub assigned_ngo_name: Option<String>,
}

/// Data for creating a new issue
#[derive(Debug, Clone)]
pub struct CreateIssue {
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub location: String,
    pub reported_by: String,
}

impl Issue {
    /// Fresh open issue, upvoted by its reporter
    pub fn new(id: Uuid, slug: String, data: CreateIssue, now: DateTime<Utc>) -> Self {
        Self {
            id,
            slug,
            title: data.title,
            tags: data.tags,
            content: data.content,
            media: Json(data.media),
            location: data.location,
            upvoters: vec![data.reported_by.clone()],
            reported_by: data.reported_by,
            status: IssueStatus::Open,
            assigned_to: None,
            deadline: None,
            downvoters: Vec::new(),
            is_flagged: false,
            volunteer_positions: Json(Vec::new()),
            collaborators: Json(Vec::new()),
            feedback: Json(Vec::new()),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    pub fn assign(&mut self, ngo_id: &str, deadline: Option<DateTime<Utc>>) -> Result<()> {
        if self.status != IssueStatus::Open {
            return Err(AppError::InvalidState(format!(
                "Issue is {} and cannot be assigned",
                self.status
            )));
        }

        self.status = IssueStatus::Assigned;
        self.assigned_to = Some(ngo_id.to_string());
        self.deadline = deadline;
        Ok(())
    }

    /// Back to Open. Outstanding registrations and the previous NGO's
    /// collaborators are discarded. Calling this on an open issue is accepted
    /// and leaves it reset.
    pub fn disclaim(&mut self) -> Result<()> {
        if self.status == IssueStatus::Completed {
            return Err(AppError::InvalidState(
                "Completed issues cannot be disclaimed".to_string(),
            ));
        }

        self.status = IssueStatus::Open;
        self.assigned_to = None;
        self.deadline = None;
        self.volunteer_positions.0.clear();
        self.collaborators.0.clear();
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != IssueStatus::Assigned {
            return Err(AppError::InvalidState(format!(
                "Issue is {} and cannot be completed",
                self.status
            )));
        }

        self.status = IssueStatus::Completed;
        self.completed_at = Some(now);
        self.volunteer_positions.0.clear();
        Ok(())
    }

    // =========================================================================
    // VOLUNTEERS
    // =========================================================================

    pub fn add_volunteer_positions(&mut self, positions: Vec<NewVolunteerPosition>) -> Result<()> {
        if self.status != IssueStatus::Assigned {
            return Err(AppError::InvalidState(
                "Volunteer positions can only be added to an assigned issue".to_string(),
            ));
        }
        volunteer_roster::append_positions(&mut self.volunteer_positions.0, positions)
    }

    pub fn register_volunteer(&mut self, user_id: &str, position: &str) -> Result<()> {
        volunteer_roster::register(&mut self.volunteer_positions.0, user_id, position)
    }

    pub fn withdraw_volunteer(&mut self, user_id: &str) -> Result<String> {
        volunteer_roster::withdraw(&mut self.volunteer_positions.0, user_id)
    }

    // =========================================================================
    // VOTES
    // =========================================================================

    /// Add an upvote, dropping any downvote by the same user
    pub fn upvote(&mut self, user_id: &str) -> Result<()> {
        if self.upvoters.iter().any(|u| u == user_id) {
            return Err(AppError::Conflict("Issue already upvoted".to_string()));
        }

        self.downvoters.retain(|u| u != user_id);
        self.upvoters.push(user_id.to_string());
        self.recompute_flag();
        Ok(())
    }

    /// Toggle a downvote. Returns whether the user now downvotes the issue.
    pub fn downvote(&mut self, user_id: &str) -> bool {
        let downvoted = if self.downvoters.iter().any(|u| u == user_id) {
            self.downvoters.retain(|u| u != user_id);
            false
        } else {
            self.upvoters.retain(|u| u != user_id);
            self.downvoters.push(user_id.to_string());
            true
        };

        self.recompute_flag();
        downvoted
    }

    fn recompute_flag(&mut self) {
        self.is_flagged = self.downvoters.len() >= FLAG_DOWNVOTE_THRESHOLD;
    }

    // =========================================================================
    // FEEDBACK
    // =========================================================================

    pub fn submit_feedback(&mut self, feedback: Feedback) -> Result<()> {
        if self.status != IssueStatus::Completed {
            return Err(AppError::InvalidState(
                "Feedback is accepted only for completed issues".to_string(),
            ));
        }

        if !(MIN_SATISFACTION..=MAX_SATISFACTION).contains(&feedback.satisfaction) {
            return Err(AppError::Validation(format!(
                "satisfaction: must be between {} and {}",
                MIN_SATISFACTION, MAX_SATISFACTION
            )));
        }

        if self.feedback.0.iter().any(|f| f.user_id == feedback.user_id) {
            return Err(AppError::Conflict(
                "Feedback already submitted for this issue".to_string(),
            ));
        }

        self.feedback.0.push(feedback);
        Ok(())
    }

    // =========================================================================
    // COLLABORATORS
    // =========================================================================

    /// Attach a collaborator unless already present. Malformed and duplicate
    /// entries already on the issue are dropped first. Returns whether the
    /// list changed.
    pub fn add_collaborator(&mut self, collaborator: Collaborator) -> bool {
        let before = self.collaborators.0.clone();

        let mut cleaned: Vec<Collaborator> = Vec::with_capacity(before.len() + 1);
        for c in before.iter().filter(|c| c.is_well_formed()) {
            if !cleaned.iter().any(|existing| existing.id == c.id) {
                cleaned.push(c.clone());
            }
        }

        if collaborator.is_well_formed() && !cleaned.iter().any(|c| c.id == collaborator.id) {
            cleaned.push(collaborator);
        }

        let changed = cleaned != before;
        self.collaborators.0 = cleaned;
        changed
    }

    /// Accepted collaboration request. Only an assigned issue takes new
    /// collaborators.
    pub fn admit_collaborator(&mut self, collaborator: Collaborator) -> Result<bool> {
        if self.status != IssueStatus::Assigned {
            return Err(AppError::InvalidState(format!(
                "Issue is {}; collaborators can only join assigned issues",
                self.status
            )));
        }
        Ok(self.add_collaborator(collaborator))
    }

    pub fn is_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.0.iter().any(|c| c.id == user_id)
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_to.as_deref() == Some(user_id)
    }

    /// Assigned NGO or admin
    pub fn ensure_manager(&self, user: &AuthenticatedUser) -> Result<()> {
        if user.is_admin() || self.is_assigned_to(&user.sub) {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Only the assigned NGO can manage this issue".to_string(),
        ))
    }

    /// Assigned NGO, collaborator or admin
    pub fn ensure_staff(&self, user: &AuthenticatedUser) -> Result<()> {
        if self.is_collaborator(&user.sub) {
            return Ok(());
        }
        self.ensure_manager(user).map_err(|_| {
            AppError::Forbidden(
                "Only the assigned NGO or its collaborators can staff this issue".to_string(),
            )
        })
    }

    /// Reporter plus every upvoter, each once, reporter first
    pub fn notification_recipients(&self) -> Vec<String> {
        let mut recipients = vec![self.reported_by.clone()];
        for voter in &self.upvoters {
            if !recipients.contains(voter) {
                recipients.push(voter.clone());
            }
        }
        recipients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::Resolution;
    use crate::shared::constants::{ROLE_ADMIN, ROLE_NGO};
    use crate::shared::test_helpers::create_user;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn open_issue() -> Issue {
        let title: String = Sentence(3..6).fake();
        Issue::new(
            Uuid::new_v4(),
            "issue".to_string(),
            CreateIssue {
                title,
                tags: vec!["water".to_string()],
                content: "Pipe burst".to_string(),
                media: Vec::new(),
                location: "Pune".to_string(),
                reported_by: "reporter".to_string(),
            },
            Utc::now(),
        )
    }

    fn assigned_issue() -> Issue {
        let mut issue = open_issue();
        issue.assign("ngo-1", None).unwrap();
        issue
    }

    fn position(name: &str, slots: i64) -> NewVolunteerPosition {
        NewVolunteerPosition {
            position: name.to_string(),
            slots,
        }
    }

    fn feedback(user: &str, satisfaction: i32) -> Feedback {
        Feedback {
            user_id: user.to_string(),
            resolved: Resolution::Yes,
            satisfaction,
            suggestions: None,
            issue_problem: None,
            created_at: Utc::now(),
        }
    }

    fn assert_exclusive_votes(issue: &Issue) {
        for u in &issue.upvoters {
            assert!(!issue.downvoters.contains(u), "{} in both vote sets", u);
        }
    }

    #[test]
    fn test_new_issue_is_open_and_upvoted_by_reporter() {
        let issue = open_issue();
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.upvoters, vec!["reporter".to_string()]);
        assert!(issue.assigned_to.is_none());
    }

    #[test]
    fn test_assign_only_from_open() {
        let mut issue = assigned_issue();
        assert_eq!(issue.status, IssueStatus::Assigned);
        assert!(issue.is_assigned_to("ngo-1"));

        let err = issue.assign("ngo-2", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(issue.is_assigned_to("ngo-1"));
    }

    #[test]
    fn test_disclaim_resets_and_discards_registrations() {
        let mut issue = assigned_issue();
        issue
            .add_volunteer_positions(vec![position("Cleanup", 2)])
            .unwrap();
        issue.register_volunteer("v1", "Cleanup").unwrap();

        issue.disclaim().unwrap();
        assert_eq!(issue.status, IssueStatus::Open);
        assert!(issue.assigned_to.is_none());
        assert!(issue.volunteer_positions.0.is_empty());
    }

    #[test]
    fn test_disclaim_on_open_issue_is_accepted() {
        let mut issue = open_issue();
        tokio_test::assert_ok!(issue.disclaim());
        assert_eq!(issue.status, IssueStatus::Open);
        assert!(issue.assigned_to.is_none());
        assert!(issue.volunteer_positions.0.is_empty());
    }

    #[test]
    fn test_complete_requires_assigned() {
        let mut issue = open_issue();
        tokio_test::assert_err!(issue.complete(Utc::now()));

        let mut issue = assigned_issue();
        issue
            .add_volunteer_positions(vec![position("Cleanup", 2)])
            .unwrap();
        issue.complete(Utc::now()).unwrap();
        assert_eq!(issue.status, IssueStatus::Completed);
        assert!(issue.completed_at.is_some());
        assert!(issue.volunteer_positions.0.is_empty());

        assert!(matches!(issue.disclaim(), Err(AppError::InvalidState(_))));
        assert!(matches!(
            issue.assign("ngo-2", None),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_positions_need_assigned_issue() {
        let mut issue = open_issue();
        let err = issue
            .add_volunteer_positions(vec![position("Cleanup", 1)])
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_single_slot_goes_to_first_registrant() {
        let mut issue = assigned_issue();
        issue
            .add_volunteer_positions(vec![position("Driver", 1)])
            .unwrap();

        issue.register_volunteer("a", "Driver").unwrap();
        let err = issue.register_volunteer("b", "Driver").unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
        assert_eq!(
            issue.volunteer_positions.0[0].registered_volunteers,
            vec!["a".to_string()]
        );
    }

    #[test]
    fn test_upvote_twice_conflicts() {
        let mut issue = open_issue();
        issue.upvote("u1").unwrap();
        let err = issue.upvote("u1").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(issue.upvoters.iter().filter(|u| *u == "u1").count(), 1);
    }

    #[test]
    fn test_votes_stay_exclusive() {
        let mut issue = open_issue();
        issue.upvote("u1").unwrap();
        assert!(issue.downvote("u1"));
        assert_exclusive_votes(&issue);
        assert!(!issue.upvoters.contains(&"u1".to_string()));

        issue.upvote("u1").unwrap();
        assert_exclusive_votes(&issue);
        assert!(!issue.downvoters.contains(&"u1".to_string()));

        assert!(issue.downvote("reporter"));
        assert_exclusive_votes(&issue);
    }

    #[test]
    fn test_flag_recomputed_on_every_vote() {
        let mut issue = open_issue();
        assert!(issue.downvote("d1"));
        assert!(!issue.is_flagged);

        assert!(issue.downvote("d2"));
        assert!(issue.is_flagged);

        // Toggling one downvote off drops below the threshold again
        assert!(!issue.downvote("d1"));
        assert!(!issue.is_flagged);

        issue.downvote("d3");
        assert!(issue.is_flagged);
        issue.upvote("d3").unwrap();
        assert!(!issue.is_flagged);
    }

    #[test]
    fn test_feedback_only_once_per_user() {
        let mut issue = assigned_issue();
        issue.complete(Utc::now()).unwrap();

        issue.submit_feedback(feedback("u1", 8)).unwrap();
        let err = issue.submit_feedback(feedback("u1", 3)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(issue.feedback.0.len(), 1);
    }

    #[test]
    fn test_feedback_rules() {
        let mut issue = assigned_issue();
        let err = issue.submit_feedback(feedback("u1", 5)).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        issue.complete(Utc::now()).unwrap();
        for bad in [0, 11] {
            let err = issue.submit_feedback(feedback("u1", bad)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(issue.feedback.0.is_empty());
    }

    #[test]
    fn test_add_collaborator_is_idempotent_and_repairs_list() {
        let mut issue = assigned_issue();
        issue.collaborators.0 = vec![
            Collaborator {
                id: "ngo-2".into(),
                name: "River Watch".into(),
            },
            Collaborator {
                id: "".into(),
                name: "ghost".into(),
            },
            Collaborator {
                id: "ngo-2".into(),
                name: "River Watch".into(),
            },
        ];

        let changed = issue.add_collaborator(Collaborator {
            id: "ngo-3".into(),
            name: "Food Bank".into(),
        });
        assert!(changed);
        let ids: Vec<&str> = issue.collaborators.0.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ngo-2", "ngo-3"]);

        let changed = issue.add_collaborator(Collaborator {
            id: "ngo-3".into(),
            name: "Food Bank".into(),
        });
        assert!(!changed);
        assert_eq!(issue.collaborators.0.len(), 2);
    }

    #[test]
    fn test_recipients_are_reporter_then_other_upvoters() {
        let mut issue = open_issue();
        issue.upvote("u1").unwrap();
        issue.upvote("u2").unwrap();

        assert_eq!(
            issue.notification_recipients(),
            vec!["reporter".to_string(), "u1".to_string(), "u2".to_string()]
        );

        // Reporter withdrew their upvote; still notified exactly once
        issue.downvote("reporter");
        assert_eq!(issue.notification_recipients().len(), 3);
    }

    #[test]
    fn test_manager_and_staff_access() {
        let mut issue = assigned_issue();
        issue.add_collaborator(Collaborator {
            id: "ngo-2".into(),
            name: "River Watch".into(),
        });

        let owner = create_user("ngo-1", ROLE_NGO);
        let collaborator = create_user("ngo-2", ROLE_NGO);
        let stranger = create_user("ngo-9", ROLE_NGO);
        let admin = create_user("root", ROLE_ADMIN);

        assert!(issue.ensure_manager(&owner).is_ok());
        assert!(issue.ensure_manager(&admin).is_ok());
        assert!(matches!(
            issue.ensure_manager(&collaborator),
            Err(AppError::Forbidden(_))
        ));

        assert!(issue.ensure_staff(&collaborator).is_ok());
        assert!(matches!(
            issue.ensure_staff(&stranger),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_collaborators_do_not_survive_reassignment() {
        let mut issue = open_issue();
        issue.assign("ngo-a", None).unwrap();
        issue
            .admit_collaborator(Collaborator {
                id: "ngo-a-friend".into(),
                name: "Friends of A".into(),
            })
            .unwrap();
        let friend = create_user("ngo-a-friend", ROLE_NGO);
        assert!(issue.ensure_staff(&friend).is_ok());

        issue.disclaim().unwrap();
        assert!(issue.collaborators.0.is_empty());

        issue.assign("ngo-b", None).unwrap();
        assert!(issue.collaborators.0.is_empty());
        assert!(matches!(
            issue.ensure_staff(&friend),
            Err(AppError::Forbidden(_))
        ));
        assert!(issue.ensure_staff(&create_user("ngo-b", ROLE_NGO)).is_ok());
    }

    #[test]
    fn test_admit_collaborator_requires_assigned() {
        let friend = || Collaborator {
            id: "ngo-2".into(),
            name: "River Watch".into(),
        };

        let mut open = open_issue();
        assert!(matches!(
            open.admit_collaborator(friend()),
            Err(AppError::InvalidState(_))
        ));
        assert!(open.collaborators.0.is_empty());

        let mut completed = assigned_issue();
        completed.complete(Utc::now()).unwrap();
        assert!(matches!(
            completed.admit_collaborator(friend()),
            Err(AppError::InvalidState(_))
        ));
        assert!(completed.collaborators.0.is_empty());

        let mut assigned = assigned_issue();
        assert!(assigned.admit_collaborator(friend()).unwrap());
        assert!(!assigned.admit_collaborator(friend()).unwrap());
        assert!(assigned.is_collaborator("ngo-2"));
    }
}
