mod collaboration_service;

pub use collaboration_service::CollaborationService;
