//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the in-process live push hub and the transactional email client.

pub mod email;
pub mod live;
