pub mod constants;
pub mod templates;
pub mod test_helpers;
pub mod types;
pub mod validation;
pub mod volunteer_roster;
