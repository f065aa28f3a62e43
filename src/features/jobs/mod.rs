//! Volunteer jobs.
//!
//! The NGO managing an assigned issue hands concrete tasks to volunteers.
//! A job moves `assigned -> proof_submitted -> completed | rejected`; a
//! rejected job takes new proof.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/jobs` | Create a job and notify the volunteer |
//! | GET | `/api/jobs/mine` | Caller's jobs |
//! | GET | `/api/jobs/{id}` | Job by id |
//! | POST | `/api/jobs/{id}/proof` | Submit proof (assignee) |
//! | POST | `/api/jobs/{id}/review` | Approve or reject proof (issue NGO) |
//! | GET | `/api/issues/{id}/jobs` | Jobs of an issue |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::JobService;
