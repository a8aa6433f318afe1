//! Input validation utilities

use std::collections::BTreeMap;

use validator::ValidationError;

use crate::models::AdminActionType;

/// Validate that an action type is one of the recognized ledger values
pub fn validate_action_type(action_type: &str) -> Result<(), ValidationError> {
    action_type
        .parse::<AdminActionType>()
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("invalid_action_type");
            err.message = Some(format!("'{}' is not a valid action type", action_type).into());
            err
        })
}

/// Validate a permission grant map: keys must be non-empty identifiers
pub fn validate_permission_keys(grants: &BTreeMap<String, bool>) -> Result<(), ValidationError> {
    for key in grants.keys() {
        if !is_permission_key(key) {
            let mut err = ValidationError::new("invalid_permission_key");
            err.message = Some(format!("'{}' is not a valid permission key", key).into());
            return Err(err);
        }
    }
    Ok(())
}

fn is_permission_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key.starts_with(|c: char| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validate that every id in a bulk request is a positive row id
pub fn validate_positive_ids(ids: &[i64]) -> Result<(), ValidationError> {
    if ids.iter().any(|id| *id <= 0) {
        return Err(ValidationError::new("non_positive_id"));
    }
    Ok(())
}
