//! Issue lifecycle.
//!
//! An issue moves `open -> assigned -> completed`, with `disclaim` resetting an
//! assigned issue back to open. Volunteer positions, collaborators and
//! feedback are stored inline on the issue row and changed under a row lock.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/issues` | Report an issue |
//! | GET | `/api/issues` | List issues (status, tag, location, flagged) |
//! | GET | `/api/issues/{id}` | Issue by id |
//! | GET | `/api/issues/slug/{slug}` | Issue by slug |
//! | POST | `/api/issues/{id}/upvote` | Upvote |
//! | POST | `/api/issues/{id}/downvote` | Toggle downvote |
//! | POST | `/api/issues/{id}/assign` | Claim for the calling NGO |
//! | POST | `/api/issues/{id}/disclaim` | Release back to open |
//! | POST | `/api/issues/{id}/complete` | Mark completed |
//! | POST | `/api/issues/{id}/positions` | Add volunteer positions |
//! | POST | `/api/issues/{id}/register` | Register for a position |
//! | POST | `/api/issues/{id}/withdraw` | Leave a position |
//! | POST | `/api/issues/{id}/feedback` | Submit feedback |
//! | GET | `/api/issues/{id}/feedback` | List feedback |
//! | DELETE | `/api/admin/issues/{id}` | Delete (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::IssueService;
