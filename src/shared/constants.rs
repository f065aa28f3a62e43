/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Platform administrator - moderation and maintenance endpoints
pub const ROLE_ADMIN: &str = "admin";

/// NGO - can claim issues, organise events and receive donations
pub const ROLE_NGO: &str = "ngo";

/// Volunteer - registers for positions and carries out jobs
pub const ROLE_VOLUNTEER: &str = "volunteer";

/// Citizen - reports and votes on issues
pub const ROLE_CITIZEN: &str = "citizen";

// =============================================================================
// ISSUE RULES
// =============================================================================

/// Distinct downvoters at which an issue is flagged for review
pub const FLAG_DOWNVOTE_THRESHOLD: usize = 2;

/// Lowest and highest satisfaction score accepted in feedback
pub const MIN_SATISFACTION: i32 = 1;
pub const MAX_SATISFACTION: i32 = 10;

// =============================================================================
// CHAT
// =============================================================================

/// Longest chat message accepted, in characters
pub const MAX_CHAT_MESSAGE_LEN: usize = 2000;

/// Age after which chat messages are archived when no value is given
pub const DEFAULT_CHAT_ARCHIVE_DAYS: i64 = 30;

/// Chat messages per page when no limit is given
pub const DEFAULT_CHAT_PAGE_SIZE: i64 = 50;
