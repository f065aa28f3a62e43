//! Collaboration requests between NGOs.
//!
//! The NGO handling an assigned issue invites another NGO. Accepting adds the
//! invited NGO to the issue's collaborators, which lets it staff the issue.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/collaboration/request` | Invite an NGO onto an issue |
//! | PATCH | `/api/collaboration/request/{id}/respond` | Accept or reject |
//! | GET | `/api/collaboration/requests/incoming` | Requests addressed to me |
//! | GET | `/api/collaboration/requests/outgoing` | Requests I sent |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CollaborationService;
