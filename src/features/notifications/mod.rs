//! Notifications and live push.
//!
//! Notifications are stored first and then pushed to the owner's live room
//! (`user:<id>`). The push is best effort; the stored record is what a client
//! reads after reconnecting.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/notifications` | Caller's notifications (paginated, `unread`) |
//! | GET | `/api/notifications/unread-count` | Unread count |
//! | PATCH | `/api/notifications/{id}/read` | Mark one read |
//! | PATCH | `/api/notifications/read-all` | Mark all read |
//! | DELETE | `/api/notifications/{id}` | Delete |
//! | GET | `/api/ws?token=` | Live push websocket |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::{NotificationDispatcher, NotificationService};
pub use workers::JobReminderWorker;
