//! Per-issue chat rooms.
//!
//! Messages are stored, then pushed live to the `issue:<id>` room. A
//! background worker archives old messages; history hides archived ones
//! unless `include_archived` is set.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/chat/{issue_id}` | Paginated history, newest first |
//! | POST | `/api/chat/{issue_id}` | Send a message |
//! | POST | `/api/admin/chat/archive` | Archive old messages (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::ChatService;
pub use workers::ChatArchiveWorker;
