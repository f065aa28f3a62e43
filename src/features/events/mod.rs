//! NGO-organised events with volunteer rosters.
//!
//! Status moves `upcoming -> ongoing -> completed`, and either of the first
//! two may be cancelled. Completed and cancelled events no longer accept
//! roster changes.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/events` | Create (NGO) |
//! | GET | `/api/events` | List, optionally by status |
//! | GET | `/api/events/{slug}` | Event by slug |
//! | PATCH | `/api/events/{id}/status` | Change status (organizer) |
//! | POST | `/api/events/{id}/positions` | Add volunteer positions (organizer) |
//! | POST | `/api/events/{id}/register` | Register for a position |
//! | POST | `/api/events/{id}/withdraw` | Leave a position |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::EventService;
