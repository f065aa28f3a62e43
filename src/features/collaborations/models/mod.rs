mod collaboration;

pub use collaboration::*;
