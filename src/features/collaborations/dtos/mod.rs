mod collaboration_dto;

pub use collaboration_dto::*;
