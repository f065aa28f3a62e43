//! Capacity ledger for volunteer positions.
//!
//! Issues and events both embed a list of named positions, each with a fixed
//! number of slots. The functions here are the only code that mutates that
//! list, so the invariants hold for both owners:
//!
//! - `registered_volunteers.len() <= slots` for every position
//! - a user id appears in at most one position of the same owner

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

/// A named, capacity-bounded slot group embedded in an issue or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VolunteerPosition {
    pub position: String,
    pub slots: i32,
    #[serde(default)]
    pub registered_volunteers: Vec<String>,
}

impl VolunteerPosition {
    pub fn is_full(&self) -> bool {
        self.registered_volunteers.len() >= self.slots.max(0) as usize
    }

    pub fn remaining(&self) -> i32 {
        (self.slots - self.registered_volunteers.len() as i32).max(0)
    }
}

/// Position as submitted by a client, before validation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewVolunteerPosition {
    pub position: String,
    pub slots: i64,
}

/// Check every submitted position and report all problems at once.
pub fn validate_new_positions(
    existing: &[VolunteerPosition],
    positions: &[NewVolunteerPosition],
) -> Vec<String> {
    let mut errors = Vec::new();

    if positions.is_empty() {
        errors.push("At least one volunteer position is required".to_string());
        return errors;
    }

    let mut seen: Vec<String> = existing.iter().map(|p| p.position.to_lowercase()).collect();

    for (index, p) in positions.iter().enumerate() {
        let name = p.position.trim();
        if name.is_empty() {
            errors.push(format!("Position #{}: name is required", index + 1));
        } else {
            let key = name.to_lowercase();
            if seen.contains(&key) {
                errors.push(format!(
                    "Position #{}: '{}' already exists",
                    index + 1,
                    name
                ));
            }
            seen.push(key);
        }

        if p.slots < 1 || p.slots > i32::MAX as i64 {
            errors.push(format!(
                "Position #{}: slots must be a whole number of at least 1",
                index + 1
            ));
        }
    }

    errors
}

/// Validate and append new positions; existing positions are kept.
pub fn append_positions(
    existing: &mut Vec<VolunteerPosition>,
    positions: Vec<NewVolunteerPosition>,
) -> Result<()> {
    let errors = validate_new_positions(existing, &positions);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    existing.extend(positions.into_iter().map(|p| VolunteerPosition {
        position: p.position.trim().to_string(),
        slots: p.slots as i32,
        registered_volunteers: Vec::new(),
    }));

    Ok(())
}

/// Allocate one slot of `position_name` to `user_id`.
pub fn register(
    positions: &mut [VolunteerPosition],
    user_id: &str,
    position_name: &str,
) -> Result<()> {
    let target = positions
        .iter()
        .position(|p| p.position == position_name)
        .ok_or_else(|| {
            AppError::NotFound(format!("Volunteer position '{}' not found", position_name))
        })?;

    if positions[target]
        .registered_volunteers
        .iter()
        .any(|id| id == user_id)
    {
        return Err(AppError::Conflict(format!(
            "Already registered for '{}'",
            position_name
        )));
    }

    if let Some(other) = positions
        .iter()
        .find(|p| p.registered_volunteers.iter().any(|id| id == user_id))
    {
        return Err(AppError::Conflict(format!(
            "Already registered for '{}'",
            other.position
        )));
    }

    let slot = &mut positions[target];
    if slot.is_full() {
        return Err(AppError::CapacityExceeded(format!(
            "No slots left for '{}'",
            position_name
        )));
    }

    slot.registered_volunteers.push(user_id.to_string());
    Ok(())
}

/// Release the slot held by `user_id`, returning the position name.
pub fn withdraw(positions: &mut [VolunteerPosition], user_id: &str) -> Result<String> {
    let slot = positions
        .iter_mut()
        .find(|p| p.registered_volunteers.iter().any(|id| id == user_id))
        .ok_or_else(|| AppError::NotFound("Not registered for any position".to_string()))?;

    slot.registered_volunteers.retain(|id| id != user_id);
    Ok(slot.position.clone())
}

/// Every user id holding a slot, in position order
pub fn registered_users(positions: &[VolunteerPosition]) -> Vec<String> {
    positions
        .iter()
        .flat_map(|p| p.registered_volunteers.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::FirstName;
    use fake::Fake;

    fn new_position(name: &str, slots: i64) -> NewVolunteerPosition {
        NewVolunteerPosition {
            position: name.to_string(),
            slots,
        }
    }

    fn roster() -> Vec<VolunteerPosition> {
        let mut positions = Vec::new();
        append_positions(
            &mut positions,
            vec![new_position("Cleanup", 2), new_position("Driver", 1)],
        )
        .unwrap();
        positions
    }

    #[test]
    fn test_append_keeps_existing_positions() {
        let mut positions = roster();
        append_positions(&mut positions, vec![new_position("Cook", 3)]).unwrap();

        let names: Vec<&str> = positions.iter().map(|p| p.position.as_str()).collect();
        assert_eq!(names, vec!["Cleanup", "Driver", "Cook"]);
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut positions = roster();
        let err = append_positions(
            &mut positions,
            vec![
                new_position("", 2),
                new_position("Medic", 0),
                new_position("driver", 1),
            ],
        )
        .unwrap_err();

        match err {
            AppError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("name is required"));
                assert!(errors[1].contains("slots"));
                assert!(errors[2].contains("already exists"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(positions.len(), 2, "nothing appended on failure");
    }

    #[test]
    fn test_empty_submission_is_rejected() {
        let errors = validate_new_positions(&[], &[]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_register_unknown_position() {
        let mut positions = roster();
        let err = register(&mut positions, "u1", "Pilot").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_register_twice_same_position_conflicts() {
        let mut positions = roster();
        register(&mut positions, "u1", "Cleanup").unwrap();
        let err = register(&mut positions, "u1", "Cleanup").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(positions[0].registered_volunteers.len(), 1);
    }

    #[test]
    fn test_user_holds_at_most_one_position() {
        let mut positions = roster();
        register(&mut positions, "u1", "Cleanup").unwrap();
        let err = register(&mut positions, "u1", "Driver").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(positions[1].registered_volunteers.is_empty());
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut positions = roster();
        let mut accepted = 0;
        for _ in 0..10 {
            let user: String = FirstName().fake();
            let user = format!("{}-{}", user, uuid::Uuid::new_v4());
            if register(&mut positions, &user, "Cleanup").is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 2);
        for p in &positions {
            assert!(p.registered_volunteers.len() <= p.slots as usize);
        }
    }

    #[test]
    fn test_full_position_reports_capacity_error() {
        let mut positions = roster();
        register(&mut positions, "u1", "Driver").unwrap();
        let err = register(&mut positions, "u2", "Driver").unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn test_withdraw_releases_slot() {
        let mut positions = roster();
        register(&mut positions, "u1", "Driver").unwrap();
        assert!(positions[1].is_full());

        let released = withdraw(&mut positions, "u1").unwrap();
        assert_eq!(released, "Driver");
        assert_eq!(positions[1].remaining(), 1);

        register(&mut positions, "u2", "Driver").unwrap();
        assert_eq!(registered_users(&positions), vec!["u2".to_string()]);
    }

    #[test]
    fn test_withdraw_without_registration() {
        let mut positions = roster();
        let err = withdraw(&mut positions, "ghost").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
