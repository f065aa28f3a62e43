pub mod auth;
pub mod chat;
pub mod collaborations;
pub mod donations;
pub mod events;
pub mod issues;
pub mod jobs;
pub mod notifications;
pub mod users;
