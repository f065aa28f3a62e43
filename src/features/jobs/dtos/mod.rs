mod job_dto;

pub use job_dto::*;
