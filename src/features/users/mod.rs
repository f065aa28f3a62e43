//! User profiles.
//!
//! Identity comes from the access token; this feature stores the profile
//! other features need (display name, email, role, location, donation total).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Caller's profile |
//! | PUT | `/api/users/me` | Create or update the caller's profile |
//! | GET | `/api/users/{id}` | Profile by id |
//! | GET | `/api/ngos` | NGO directory |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
