//! Donations.
//!
//! The payment processor is external; this feature records the outcome it
//! reports. A completed donation raises the NGO's `total_donations` in the
//! same transaction as the insert.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/donations` | Record a processor-confirmed donation |
//! | GET | `/api/donations/mine` | Caller's donations |
//! | GET | `/api/donations/received` | Donations received (NGO) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::DonationService;
