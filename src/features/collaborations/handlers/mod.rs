mod collaboration_handler;

pub use collaboration_handler::*;
