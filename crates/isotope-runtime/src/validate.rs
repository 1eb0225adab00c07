#![forbid(unsafe_code)]

//! Initial-state validation.
//!
//! A state cell observes containers only: the root has to be a map or a
//! sequence so that there is something to intercept mutations on.

use serde_json::Value;

use crate::error::StateError;

/// Check that `value` can be the root of a state cell.
///
/// # Errors
///
/// [`StateError::InvalidInitialState`] naming the type found.
pub fn validate_initial_state(value: &Value) -> Result<(), StateError> {
    let found = match value {
        Value::Object(_) | Value::Array(_) => return Ok(()),
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    };
    Err(StateError::InvalidInitialState(format!(
        "expected an object or an array, found {found}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn containers_pass() {
        assert!(validate_initial_state(&json!({})).is_ok());
        assert!(validate_initial_state(&json!([1, 2])).is_ok());
    }

    #[test]
    fn scalars_fail_with_type_name() {
        let err = validate_initial_state(&json!(42)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid initial state: expected an object or an array, found number"
        );
        assert!(validate_initial_state(&Value::Null).is_err());
        assert!(validate_initial_state(&json!("s")).is_err());
        assert!(validate_initial_state(&json!(true)).is_err());
    }
}
