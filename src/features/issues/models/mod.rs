mod embedded;
mod issue;

pub use embedded::*;
pub use issue::*;
